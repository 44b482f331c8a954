use std::path::Path;
use std::time::Duration;

use persist_lock::{CoordinatorConfig, RetryPolicy};
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Folder used when none is configured.
pub const DEFAULT_FOLDER_NAME: &str = "gcr-persist";

/// Construction-time options for a [`KeyedObjectStore`](crate::KeyedObjectStore).
///
/// Durations are kept in milliseconds so a TOML file reads the same as the
/// options callers already know:
///
/// ```toml
/// bucket_name = "team-state"
/// folder_name = "gcr-persist"
/// max_lock_time_ms = 7200000
/// wait_time_ms = 2000
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Credentials scope for the backend. Opaque here.
    pub project_id: Option<String>,
    pub bucket_name: String,
    /// Prefix for every blob path.
    pub folder_name: String,
    /// Foreign locks older than this are reclaimed by `fetch`.
    pub max_lock_time_ms: u64,
    /// Wait between existence checks of a contended lock.
    pub wait_time_ms: u64,
    /// Existence checks before giving up, including the first.
    pub max_attempts: u32,
    /// Re-judge staleness on every retry instead of only at first sighting.
    pub recheck_staleness: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            bucket_name: String::new(),
            folder_name: DEFAULT_FOLDER_NAME.to_string(),
            max_lock_time_ms: 2 * 60 * 60 * 1000,
            wait_time_ms: 2 * 1000,
            max_attempts: 3,
            recheck_staleness: false,
        }
    }
}

impl StoreConfig {
    /// Defaults for everything but the bucket.
    pub fn new(bucket_name: impl Into<String>) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            ..Default::default()
        }
    }

    pub fn with_folder(mut self, folder_name: impl Into<String>) -> Self {
        self.folder_name = folder_name.into();
        self
    }

    pub fn with_max_lock_time(mut self, max_lock_time: Duration) -> Self {
        self.max_lock_time_ms = duration_ms(max_lock_time);
        self
    }

    pub fn with_wait_time(mut self, wait_time: Duration) -> Self {
        self.wait_time_ms = duration_ms(wait_time);
        self
    }

    pub fn max_lock_time(&self) -> Duration {
        Duration::from_millis(self.max_lock_time_ms)
    }

    pub fn wait_time(&self) -> Duration {
        Duration::from_millis(self.wait_time_ms)
    }

    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> StoreResult<Self> {
        let config: Self =
            toml::from_str(s).map_err(|e| StoreError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            StoreError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> StoreResult<String> {
        toml::to_string(self).map_err(|e| StoreError::InvalidConfig(e.to_string()))
    }

    pub fn validate(&self) -> StoreResult<()> {
        if self.bucket_name.is_empty() {
            return Err(StoreError::InvalidConfig("bucket_name must be set".into()));
        }
        if self.folder_name.is_empty() {
            return Err(StoreError::InvalidConfig(
                "folder_name must not be empty".into(),
            ));
        }
        if self.folder_name.starts_with('/') || self.folder_name.ends_with('/') {
            return Err(StoreError::InvalidConfig(format!(
                "folder_name {:?} must not start or end with '/'",
                self.folder_name
            )));
        }
        if self.max_attempts == 0 {
            return Err(StoreError::InvalidConfig(
                "max_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Fixed-interval retry schedule from `wait_time_ms` and `max_attempts`.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(self.max_attempts, self.wait_time())
    }

    pub fn coordinator_config(&self) -> CoordinatorConfig {
        CoordinatorConfig {
            max_lock_time: self.max_lock_time(),
            retry: self.retry_policy(),
            recheck_staleness: self.recheck_staleness,
        }
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
