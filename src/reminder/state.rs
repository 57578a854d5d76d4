use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::fs::operations::{read_locked, replace_atomically};

pub const REMINDER_STATE_FILE: &str = "reminder.json";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderStateEntity {
    /// Last day a reminder went out for. Survives restarts, so a day is never reminded twice.
    pub last_sent: Option<NaiveDate>,
}

/// File backed record of which day was already handled by the reminder task.
pub struct ReminderState {
    path: PathBuf,
}

impl ReminderState {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(REMINDER_STATE_FILE))
    }

    /// A missing or unreadable state means nothing was sent yet.
    pub async fn last_sent(&self) -> Option<NaiveDate> {
        match self.read().await {
            Ok(state) => state.last_sent,
            Err(e) => {
                warn!("Ignoring reminder state at {:?}: {e:?}", self.path);
                None
            }
        }
    }

    pub async fn mark_sent(&self, date: NaiveDate) -> Result<()> {
        let content = serde_json::to_vec(&ReminderStateEntity {
            last_sent: Some(date),
        })?;
        replace_atomically(&self.path, &content).await
    }

    async fn read(&self) -> Result<ReminderStateEntity> {
        match read_locked(&self.path).await? {
            Some(content) => serde_json::from_slice(&content)
                .with_context(|| format!("Reminder state {:?} is not valid json", self.path)),
            None => Ok(ReminderStateEntity::default()),
        }
    }
}
