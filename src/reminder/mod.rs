//! Background task that reminds about a missed check-in. Once per day at the configured alert time
//! it looks at today's check-in, and if there is none a [sender::Reminder] goes out through a
//! [sender::ReminderSender]. The handled day is persisted in [state::ReminderState], so restarting
//! the process can skip a reminder but never repeat one.

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use sender::{Reminder, ReminderSender};
use state::ReminderState;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::{
    tracker::service::CheckinService,
    utils::{
        clock::Clock,
        time::{format_date, next_occurrence},
    },
};

pub mod sender;
pub mod state;

/// What happened when the alert time was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderDecision {
    /// A reminder for this day already went out earlier.
    AlreadyHandled,
    CheckedIn,
    Sent,
    /// Sending failed. The day still counts as handled.
    DeliveryFailed,
    /// Check-ins couldn't be read, nothing was sent.
    Unavailable,
}

pub struct ReminderModule {
    service: Arc<CheckinService>,
    sender: Box<dyn ReminderSender>,
    state: ReminderState,
    alert_time: NaiveTime,
    recipient: String,
    shutdown: CancellationToken,
    clock: Arc<dyn Clock>,
}

impl ReminderModule {
    pub fn new(
        service: Arc<CheckinService>,
        sender: Box<dyn ReminderSender>,
        state: ReminderState,
        alert_time: NaiveTime,
        recipient: String,
        shutdown: CancellationToken,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            service,
            sender,
            state,
            alert_time,
            recipient,
            shutdown,
            clock,
        }
    }

    /// Executes the reminder loop until shutdown. Individual failures are logged and never stop
    /// the loop.
    pub async fn run(self) -> Result<()> {
        loop {
            let now = self.clock.time();
            let next = next_occurrence(now, self.alert_time);
            let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
            info!(
                "Next missed check-in check at {} (in {} seconds)",
                next.format("%Y-%m-%d %H:%M:%S"),
                wait.as_secs()
            );

            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("Reminder task stopped");
                    return Ok(())
                }
                _ = self.clock.sleep(wait) => ()
            }

            let today = self.clock.today();
            let decision = self.check_day(today).await;
            debug!("Reminder check for {today} finished with {decision:?}");
        }
    }

    /// Decides whether `today` needs a reminder and sends it.
    pub async fn check_day(&self, today: NaiveDate) -> ReminderDecision {
        if self.state.last_sent().await == Some(today) {
            return ReminderDecision::AlreadyHandled;
        }

        match self.service.is_checked_in(today).await {
            Ok(true) => {
                info!("Checked in for {today}, no reminder needed");
                return ReminderDecision::CheckedIn;
            }
            Ok(false) => {}
            Err(e) => {
                error!("Couldn't read check-ins for {today} {e:?}");
                return ReminderDecision::Unavailable;
            }
        }

        info!("Missed check-in detected for {today}");
        let decision = match self.sender.send(&self.reminder_for(today)).await {
            Ok(()) => ReminderDecision::Sent,
            Err(e) => {
                error!("Failed to deliver reminder for {today} {e:?}");
                ReminderDecision::DeliveryFailed
            }
        };

        if let Err(e) = self.state.mark_sent(today).await {
            error!("Failed to persist reminder state for {today} {e:?}");
        }
        decision
    }

    fn reminder_for(&self, today: NaiveDate) -> Reminder {
        Reminder {
            subject: format!("No check-in yet for {}", format_date(today)),
            body: format!(
                "There was no check-in for {} by {}.\n\nOpen Are You Alive and check in to keep your streak going.",
                format_date(today),
                self.alert_time.format("%H:%M"),
            ),
            recipient: self.recipient.clone(),
        }
    }
}
