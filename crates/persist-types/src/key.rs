//! Record key validation.
//!
//! Valid keys:
//! - Must be non-empty
//! - Must not contain control characters or `\`
//! - Must not contain `//`, or a `.` or `..` path component
//! - Must not start or end with `/`

use std::fmt;

use crate::error::TypeError;

/// Suffix of the blob carrying a record's lock token.
pub const LOCK_SUFFIX: &str = ".lock";

/// Suffix of the blob carrying a record's JSON value.
pub const DATA_SUFFIX: &str = ".json";

/// A validated key naming one lockable record.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey(String);

impl RecordKey {
    pub fn parse(key: &str) -> Result<Self, TypeError> {
        let invalid = |reason: &str| TypeError::InvalidKey {
            key: key.to_string(),
            reason: reason.to_string(),
        };

        if key.is_empty() {
            return Err(invalid("key must not be empty"));
        }
        if key.chars().any(|c| c.is_control() || c == '\\') {
            return Err(invalid("contains a control character or '\\'"));
        }
        if key.split('/').any(|part| part == "." || part == "..") {
            return Err(invalid("must not contain a '.' or '..' component"));
        }
        if key.contains("//") {
            return Err(invalid("must not contain '//'"));
        }
        if key.starts_with('/') || key.ends_with('/') {
            return Err(invalid("must not start or end with '/'"));
        }
        Ok(Self(key.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `<folder>/<key>.lock`
    pub fn lock_path(&self, folder: &str) -> String {
        format!("{folder}/{}{LOCK_SUFFIX}", self.0)
    }

    /// `<folder>/<key>.json`
    pub fn data_path(&self, folder: &str) -> String {
        format!("{folder}/{}{DATA_SUFFIX}", self.0)
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
