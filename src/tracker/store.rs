use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::fs::operations::{read_locked, replace_atomically};

use super::entities::CheckinRecord;

pub const CHECKINS_FILE: &str = "checkins.json";

/// Interface for abstracting storage of check-ins. Loading hands back the raw entries as they were
/// stored, normalization is left to the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CheckinStore: Send + Sync {
    /// Returns every stored entry. A store that was never written is empty.
    async fn load_raw(&self) -> Result<Vec<Value>>;

    /// Replaces the stored collection with `records`.
    async fn save(&self, records: &[CheckinRecord]) -> Result<()>;
}

/// The main realization of [CheckinStore]. The whole collection lives in a single json document.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store located at the default file name inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(CHECKINS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CheckinStore for JsonFileStore {
    async fn load_raw(&self) -> Result<Vec<Value>> {
        let Some(content) = read_locked(&self.path).await? else {
            debug!("No check-in file at {:?} yet", self.path);
            return Ok(vec![]);
        };

        if content.iter().all(u8::is_ascii_whitespace) {
            warn!("Check-in file {:?} is empty", self.path);
            return Ok(vec![]);
        }

        let document: Value = serde_json::from_slice(&content)
            .with_context(|| format!("Check-in file {:?} is not valid json", self.path))?;

        match document {
            Value::Array(entries) => Ok(entries),
            other => Err(anyhow!(
                "Check-in file {:?} should hold a list, found {}",
                self.path,
                json_kind(&other)
            )),
        }
    }

    async fn save(&self, records: &[CheckinRecord]) -> Result<()> {
        let content = serde_json::to_vec(records)?;
        replace_atomically(&self.path, &content).await
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
