use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TypeError;

/// Identity of a lock holder.
///
/// Written as the first half of every [`LockToken`](crate::LockToken) and
/// compared on later reads to recognize locks this holder left behind. The
/// `:` separator of the token format is forbidden inside an owner id.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OwnerId(String);

static PROCESS_OWNER: OnceLock<OwnerId> = OnceLock::new();

impl OwnerId {
    /// Validate a caller-supplied identity.
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into();
        let reason = if id.is_empty() {
            Some("owner id must not be empty")
        } else if id.contains(':') {
            Some("owner id must not contain ':'")
        } else if id.chars().any(|c| c.is_whitespace() || c.is_control()) {
            Some("owner id must not contain whitespace or control characters")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(TypeError::InvalidOwnerId {
                id,
                reason: reason.into(),
            }),
            None => Ok(Self(id)),
        }
    }

    /// Create a fresh random identity (UUID v4).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The identity shared by every caller in this process.
    ///
    /// Generated on first use and constant for the lifetime of the process.
    pub fn process() -> &'static OwnerId {
        PROCESS_OWNER.get_or_init(Self::generate)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for OwnerId {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<OwnerId> for String {
    fn from(owner: OwnerId) -> Self {
        owner.0
    }
}

impl fmt::Debug for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OwnerId({})", self.0)
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
