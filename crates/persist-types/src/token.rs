//! The textual content of a `.lock` blob.
//!
//! A token is `"<owner>:<acquired_at_ms>"`. Content that does not split into
//! exactly two `:`-delimited parts is corrupted. Content whose second part is
//! not an integer is still well-formed, it just cannot be aged.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::owner::OwnerId;

/// Separator between the owner and the timestamp.
pub const SEPARATOR: char = ':';

/// Reasons a lock blob's content is not a valid token.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("expected 2 ':'-delimited parts, found {0}")]
    PartCount(usize),

    #[error("timestamp {0:?} is not an integer millisecond value")]
    Timestamp(String),
}

/// Owner identity plus acquisition time, as stored in a lock blob.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LockToken {
    /// Owner recorded in the blob. Foreign owners are kept verbatim.
    pub owner: String,
    /// Wall-clock milliseconds since UNIX epoch at acquisition.
    pub acquired_at_ms: i64,
}

impl LockToken {
    /// A token claiming the lock for `owner` at `now_ms`.
    pub fn new(owner: &OwnerId, now_ms: i64) -> Self {
        Self {
            owner: owner.as_str().to_string(),
            acquired_at_ms: now_ms,
        }
    }

    /// Split content into `(owner, timestamp)` without parsing the timestamp.
    pub fn split_parts(content: &str) -> Result<(&str, &str), TokenError> {
        let parts: Vec<&str> = content.split(SEPARATOR).collect();
        match parts.as_slice() {
            [owner, ts] => Ok((*owner, *ts)),
            _ => Err(TokenError::PartCount(parts.len())),
        }
    }

    /// Parse lock blob content.
    pub fn decode(content: &str) -> Result<Self, TokenError> {
        let (owner, ts) = Self::split_parts(content)?;
        let acquired_at_ms = ts
            .parse::<i64>()
            .map_err(|_| TokenError::Timestamp(ts.to_string()))?;
        Ok(Self {
            owner: owner.to_string(),
            acquired_at_ms,
        })
    }

    /// Render as lock blob content.
    pub fn encode(&self) -> String {
        format!("{}{SEPARATOR}{}", self.owner, self.acquired_at_ms)
    }

    pub fn is_owned_by(&self, owner: &OwnerId) -> bool {
        self.owner == owner.as_str()
    }

    /// Milliseconds elapsed between acquisition and `now_ms`.
    ///
    /// Negative when the writer's clock ran ahead of ours.
    pub fn age_at(&self, now_ms: i64) -> i64 {
        now_ms.saturating_sub(self.acquired_at_ms)
    }

    /// Stale once strictly more than `max_lock_time` has elapsed.
    pub fn is_stale_at(&self, now_ms: i64, max_lock_time: Duration) -> bool {
        let max_ms = i64::try_from(max_lock_time.as_millis()).unwrap_or(i64::MAX);
        self.age_at(now_ms) > max_ms
    }
}

impl fmt::Display for LockToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
