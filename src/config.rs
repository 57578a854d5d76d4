//! Startup configuration. Everything the server and the reminder task need is resolved once into
//! [AppConfig] and handed to them explicitly.

use std::{net::SocketAddr, path::PathBuf};

use anyhow::{anyhow, Result};
use chrono::NaiveTime;

use crate::tracker::service::{DEFAULT_RETENTION_DAYS, DEFAULT_WINDOW_DAYS};

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_ALERT_TIME: &str = "10:00";
pub const MAX_WINDOW_DAYS: usize = 366;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderConfig {
    pub alert_time: NaiveTime,
    pub recipient: String,
    /// Without smtp settings reminders are only logged.
    pub smtp: Option<SmtpConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub address: SocketAddr,
    pub retention_days: u32,
    pub window_days: usize,
    /// `None` disables the reminder task.
    pub reminder: Option<ReminderConfig>,
}

impl AppConfig {
    pub fn new(data_dir: PathBuf, address: SocketAddr) -> Self {
        Self {
            data_dir,
            address,
            retention_days: DEFAULT_RETENTION_DAYS,
            window_days: DEFAULT_WINDOW_DAYS,
            reminder: None,
        }
    }
}

/// Parses `HH:MM` (or `HH:MM:SS`) as used by `--alert-time`.
pub fn parse_alert_time(value: &str) -> Result<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| anyhow!("Can't parse {value} into a time of day, expected HH:MM"))
}

/// Used by `?days=` and `--days`.
pub fn validate_window_days(days: usize) -> Result<usize> {
    if (1..=MAX_WINDOW_DAYS).contains(&days) {
        Ok(days)
    } else {
        Err(anyhow!(
            "Window should be between 1 and {MAX_WINDOW_DAYS} days, got {days}"
        ))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;

    use super::{parse_alert_time, validate_window_days};

    #[test]
    fn test_parse_alert_time() {
        assert_eq!(
            parse_alert_time("10:00").unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap()
        );
        assert_eq!(
            parse_alert_time(" 7:05 ").unwrap(),
            NaiveTime::from_hms_opt(7, 5, 0).unwrap()
        );
        assert_eq!(
            parse_alert_time("21:30:15").unwrap(),
            NaiveTime::from_hms_opt(21, 30, 15).unwrap()
        );
        assert!(parse_alert_time("25:00").is_err());
        assert!(parse_alert_time("noon").is_err());
    }

    #[test]
    fn test_validate_window_days() {
        assert_eq!(validate_window_days(30).unwrap(), 30);
        assert_eq!(validate_window_days(1).unwrap(), 1);
        assert!(validate_window_days(0).is_err());
        assert!(validate_window_days(367).is_err());
    }
}
