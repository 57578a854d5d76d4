use std::sync::Arc;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::{
    config::{AppConfig, ReminderConfig},
    reminder::{
        sender::{LogReminderSender, ReminderSender, SmtpReminderSender},
        state::ReminderState,
        ReminderModule,
    },
    server::{self, shutdown, AppState},
    tracker::{service::CheckinService, store::JsonFileStore},
    utils::clock::{Clock, DefaultClock},
};

/// Represents the starting point for the server. Runs the http api and, when configured, the
/// reminder task until the process is asked to stop.
pub async fn start_server(config: AppConfig) -> Result<()> {
    let shutdown_token = CancellationToken::new();

    let (_, result) = tokio::join!(
        shutdown::detect_shutdown(shutdown_token.clone()),
        run_with(config, Arc::new(DefaultClock), shutdown_token.clone()),
    );
    result
}

async fn run_with(
    config: AppConfig,
    clock: Arc<dyn Clock>,
    shutdown_token: CancellationToken,
) -> Result<()> {
    let service = Arc::new(create_service(&config, clock.clone()));

    let reminder = match &config.reminder {
        Some(reminder_config) => Some(create_reminder(
            &config,
            reminder_config,
            service.clone(),
            clock,
            &shutdown_token,
        )?),
        None => {
            info!("Reminders are disabled");
            None
        }
    };

    let state = Arc::new(AppState::new(service, config));

    let (server_result, reminder_result) = tokio::join!(
        async {
            let result = server::serve(state, shutdown_token.clone()).await;
            // The reminder task has nothing to do once the api is gone.
            shutdown_token.cancel();
            result
        },
        async {
            match reminder {
                Some(reminder) => reminder.run().await,
                None => Ok(()),
            }
        },
    );

    if let Err(reminder_result) = &reminder_result {
        error!("Reminder module got an error {:?}", reminder_result);
    }

    if let Err(server_result) = &server_result {
        error!("Http server got an error {:?}", server_result);
    }

    server_result
}

pub fn create_service(config: &AppConfig, clock: Arc<dyn Clock>) -> CheckinService {
    CheckinService::new(
        Box::new(JsonFileStore::in_dir(&config.data_dir)),
        clock,
        config.retention_days,
    )
}

fn create_reminder(
    config: &AppConfig,
    reminder_config: &ReminderConfig,
    service: Arc<CheckinService>,
    clock: Arc<dyn Clock>,
    shutdown_token: &CancellationToken,
) -> Result<ReminderModule> {
    let sender: Box<dyn ReminderSender> = match &reminder_config.smtp {
        Some(smtp) => {
            info!("Reminders go to {} through {}", reminder_config.recipient, smtp.host);
            Box::new(SmtpReminderSender::new(smtp)?)
        }
        None => {
            info!("No smtp server configured, reminders are only logged");
            Box::new(LogReminderSender)
        }
    };

    Ok(ReminderModule::new(
        service,
        sender,
        ReminderState::in_dir(&config.data_dir),
        reminder_config.alert_time,
        reminder_config.recipient.clone(),
        shutdown_token.clone(),
        clock,
    ))
}
