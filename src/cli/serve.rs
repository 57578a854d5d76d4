use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
};

use anyhow::Result;
use chrono::NaiveTime;
use clap::Parser;

use crate::{
    config::{
        parse_alert_time, validate_window_days, AppConfig, ReminderConfig, SmtpConfig,
        DEFAULT_ALERT_TIME, DEFAULT_PORT, DEFAULT_SMTP_PORT,
    },
    tracker::service::{DEFAULT_RETENTION_DAYS, DEFAULT_WINDOW_DAYS},
};

const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

#[derive(Debug, Parser)]
pub struct ServeCommand {
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT, help = "Port of the http api")]
    pub port: u16,
    #[arg(long, default_value_t = DEFAULT_HOST, help = "Address the http api listens on")]
    pub host: IpAddr,
    #[arg(
        long,
        env = "ALERT_TIME",
        default_value = DEFAULT_ALERT_TIME,
        value_parser = parse_alert_time,
        help = "Local time of day (HH:MM) when a missing check-in triggers a reminder"
    )]
    pub alert_time: NaiveTime,
    #[arg(long, help = "Don't run the reminder task")]
    pub no_reminders: bool,
    #[arg(
        long,
        default_value_t = DEFAULT_RETENTION_DAYS,
        help = "Check-ins older than this many days are dropped on the next check-in"
    )]
    pub retention_days: u32,
    #[arg(
        long,
        default_value_t = DEFAULT_WINDOW_DAYS,
        value_parser = parse_window_days,
        help = "Default size of the dashboard window"
    )]
    pub window_days: usize,
    #[command(flatten)]
    pub smtp: SmtpArgs,
}

#[derive(Debug, Clone, clap::Args)]
pub struct SmtpArgs {
    #[arg(long, env = "SMTP_HOST", help = "Smtp relay. Without it reminders are only logged")]
    pub smtp_host: Option<String>,
    #[arg(long, env = "SMTP_PORT", default_value_t = DEFAULT_SMTP_PORT)]
    pub smtp_port: u16,
    #[arg(long, env = "SMTP_USERNAME")]
    pub smtp_username: Option<String>,
    #[arg(long, env = "SMTP_PASSWORD", hide_env_values = true)]
    pub smtp_password: Option<String>,
    #[arg(long, env = "SMTP_FROM", help = "Sender address. Defaults to the username")]
    pub smtp_from: Option<String>,
    #[arg(long, env = "ALERT_EMAIL", help = "Recipient of reminders")]
    pub alert_email: Option<String>,
}

pub fn parse_window_days(value: &str) -> Result<usize> {
    validate_window_days(value.trim().parse()?)
}

impl ServeCommand {
    pub fn into_config(self, data_dir: PathBuf) -> AppConfig {
        let mut config = AppConfig::new(data_dir, SocketAddr::new(self.host, self.port));
        config.retention_days = self.retention_days;
        config.window_days = self.window_days;
        if !self.no_reminders {
            let recipient = self.smtp.alert_email.clone().unwrap_or_default();
            config.reminder = Some(ReminderConfig {
                alert_time: self.alert_time,
                smtp: self.smtp.into_config(&recipient),
                recipient,
            });
        }
        config
    }
}

impl SmtpArgs {
    /// Smtp delivery needs both a relay and somebody to deliver to.
    fn into_config(self, recipient: &str) -> Option<SmtpConfig> {
        let host = self.smtp_host?;
        if recipient.is_empty() {
            return None;
        }
        let from = self
            .smtp_from
            .or_else(|| self.smtp_username.clone())
            .unwrap_or_else(|| recipient.to_string());
        Some(SmtpConfig {
            host,
            port: self.smtp_port,
            username: self.smtp_username,
            password: self.smtp_password,
            from,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use chrono::NaiveTime;
    use clap::Parser;

    use super::{parse_window_days, ServeCommand};

    fn parse(args: &[&str]) -> ServeCommand {
        ServeCommand::try_parse_from(std::iter::once("serve").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_full_config() {
        let command = parse(&[
            "--port",
            "8080",
            "--host",
            "127.0.0.1",
            "--alert-time",
            "21:30",
            "--retention-days",
            "60",
            "--window-days",
            "14",
            "--smtp-host",
            "smtp.example.com",
            "--smtp-username",
            "bot@example.com",
            "--smtp-password",
            "secret",
            "--alert-email",
            "me@example.com",
        ]);
        let config = command.into_config(PathBuf::from("/data"));

        assert_eq!(config.address.to_string(), "127.0.0.1:8080");
        assert_eq!(config.retention_days, 60);
        assert_eq!(config.window_days, 14);
        let reminder = config.reminder.unwrap();
        assert_eq!(reminder.alert_time, NaiveTime::from_hms_opt(21, 30, 0).unwrap());
        assert_eq!(reminder.recipient, "me@example.com");
        let smtp = reminder.smtp.unwrap();
        assert_eq!(smtp.host, "smtp.example.com");
        assert_eq!(smtp.from, "bot@example.com");
        assert_eq!(smtp.password.as_deref(), Some("secret"));
    }

    #[test]
    fn test_smtp_requires_recipient() {
        let command = parse(&["--port", "8080", "--smtp-host", "smtp.example.com"]);
        let reminder = command.into_config(PathBuf::from("/data")).reminder.unwrap();
        assert!(reminder.smtp.is_none());
    }

    #[test]
    fn test_reminders_can_be_disabled() {
        let command = parse(&["--port", "8080", "--no-reminders"]);
        assert!(command.into_config(PathBuf::from("/data")).reminder.is_none());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(ServeCommand::try_parse_from(["serve", "--alert-time", "25:00"]).is_err());
        assert!(ServeCommand::try_parse_from(["serve", "--window-days", "0"]).is_err());
        assert!(parse_window_days("abc").is_err());
        assert_eq!(parse_window_days("7").unwrap(), 7);
    }
}
