use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::{info, warn};

use crate::config::SmtpConfig;

/// Message sent when the day passed the alert time without a check-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub subject: String,
    pub body: String,
    pub recipient: String,
}

/// Outbound channel for reminders. Each delivery channel implements this trait.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReminderSender: Send + Sync {
    async fn send(&self, reminder: &Reminder) -> Result<()>;
}

/// Used when no mail server is configured. The reminder only shows up in the logs.
pub struct LogReminderSender;

#[async_trait]
impl ReminderSender for LogReminderSender {
    async fn send(&self, reminder: &Reminder) -> Result<()> {
        warn!(
            "Missed check-in detected, no mail server configured. Would send {:?} to {}",
            reminder.subject, reminder.recipient
        );
        Ok(())
    }
}

/// Delivers reminders as plain text emails through an SMTP relay.
pub struct SmtpReminderSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpReminderSender {
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .with_context(|| format!("Invalid smtp relay {}", config.host))?
            .port(config.port);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        let from = config
            .from
            .parse::<Mailbox>()
            .with_context(|| format!("Invalid sender address {}", config.from))?;

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl ReminderSender for SmtpReminderSender {
    async fn send(&self, reminder: &Reminder) -> Result<()> {
        let to = reminder
            .recipient
            .parse::<Mailbox>()
            .with_context(|| format!("Invalid recipient address {}", reminder.recipient))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(reminder.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(reminder.body.clone())?;

        let response = self
            .transport
            .send(message)
            .await
            .context("Smtp delivery failed")?;

        info!(
            "Reminder delivered to {} with code {}",
            reminder.recipient,
            response.code()
        );
        Ok(())
    }
}
