use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate};
/// Represents an entity responsible for providing the wall clock across the application. Check-ins
/// and reminders are keyed by the local date, so everything that needs "today" asks the clock.
/// This allows it to be replaced during testing.
#[async_trait]
pub trait Clock: Sync + Send + 'static {
    fn time(&self) -> DateTime<Local>;

    async fn sleep(&self, duration: Duration);

    /// Local calendar date of [Clock::time].
    fn today(&self) -> NaiveDate {
        self.time().date_naive()
    }
}

pub struct DefaultClock;

#[async_trait]
impl Clock for DefaultClock {
    fn time(&self) -> DateTime<Local> {
        Local::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
pub mod testing {
    use std::{sync::Mutex, time::Duration};

    use async_trait::async_trait;
    use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
    use tokio::time::Instant;

    use super::Clock;

    /// Builds a local time for tests. Dates used in tests avoid DST transitions.
    pub fn local(date: NaiveDate, time: NaiveTime) -> DateTime<Local> {
        Local
            .from_local_datetime(&NaiveDateTime::new(date, time))
            .unwrap()
    }

    /// Clock that stays where it was put until moved with [FixedClock::set].
    pub struct FixedClock {
        now: Mutex<DateTime<Local>>,
    }

    impl FixedClock {
        pub fn at(now: DateTime<Local>) -> Self {
            Self {
                now: Mutex::new(now),
            }
        }

        pub fn on(date: NaiveDate) -> Self {
            Self::at(local(date, NaiveTime::from_hms_opt(12, 0, 0).unwrap()))
        }

        pub fn set(&self, now: DateTime<Local>) {
            *self.now.lock().unwrap() = now;
        }
    }

    #[async_trait]
    impl Clock for FixedClock {
        fn time(&self) -> DateTime<Local> {
            *self.now.lock().unwrap()
        }

        async fn sleep(&self, duration: Duration) {
            tokio::time::sleep(duration).await;
        }
    }

    /// Clock that follows tokio time. With a paused runtime it moves exactly as far as the timers
    /// that were awaited.
    #[derive(Clone)]
    pub struct TestClock {
        pub start_time: DateTime<Local>,
        pub reference: Instant,
    }

    impl TestClock {
        pub fn starting_at(start_time: DateTime<Local>) -> Self {
            Self {
                start_time,
                reference: Instant::now(),
            }
        }
    }

    #[async_trait]
    impl Clock for TestClock {
        fn time(&self) -> DateTime<Local> {
            self.start_time + chrono::Duration::from_std(self.reference.elapsed()).unwrap()
        }

        async fn sleep(&self, duration: Duration) {
            tokio::time::sleep(duration).await;
        }
    }
}
