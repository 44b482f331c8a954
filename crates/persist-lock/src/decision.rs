//! Lock resolution as pure functions.
//!
//! The coordinator observes the lock blob (absent, or present with some
//! content) and asks these functions what to do next. Nothing here touches
//! storage or time, so every branch of the protocol is testable directly.
//!
//! ```text
//! read:   absent ──────────────────────────────► Proceed
//!         corrupted | self-owned | stale ──────► Reclaim(reason)
//!         live foreign ────────────────────────► WaitAndRetry
//!
//! write:  absent | self-owned ─────────────────► Proceed
//!         not two parts ───────────────────────► Fail(Corrupted)
//!         foreign ─────────────────────────────► WaitAndRetry
//!
//! retry:  gone ────────────────────────────────► Proceed
//!         present, checks < max_attempts ──────► WaitAndRetry
//!         present, checks >= max_attempts ─────► Fail(Locked)
//! ```

use std::fmt;
use std::time::Duration;

use persist_types::{LockToken, OwnerId};

use crate::retry::RetryPolicy;

/// Why a lock blob may be deleted and taken over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReclaimReason {
    /// Content does not split into exactly two parts.
    Corrupted,
    /// Older than the maximum lock time.
    Stale,
    /// Left behind by this same owner.
    SelfOwned,
}

/// Why resolution gave up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailReason {
    Corrupted,
    Locked,
}

/// Next step of lock resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Nothing blocks the caller.
    Proceed,
    /// Delete the lock blob, then proceed.
    Reclaim(ReclaimReason),
    /// Wait one backoff interval and re-check existence.
    WaitAndRetry,
    Fail(FailReason),
}

impl fmt::Display for ReclaimReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReclaimReason::Corrupted => f.write_str("corrupted"),
            ReclaimReason::Stale => f.write_str("stale"),
            ReclaimReason::SelfOwned => f.write_str("self-owned"),
        }
    }
}

/// Resolve a lock ahead of a read.
///
/// `content` is `None` when the lock blob does not exist.
pub fn decide_read(
    content: Option<&str>,
    owner: &OwnerId,
    now_ms: i64,
    max_lock_time: Duration,
) -> Decision {
    let Some(content) = content else {
        return Decision::Proceed;
    };
    let Ok((holder, _)) = LockToken::split_parts(content) else {
        return Decision::Reclaim(ReclaimReason::Corrupted);
    };
    if holder == owner.as_str() {
        return Decision::Reclaim(ReclaimReason::SelfOwned);
    }
    // A timestamp that does not parse cannot be aged, so the lock never goes stale.
    match LockToken::decode(content) {
        Ok(token) if token.is_stale_at(now_ms, max_lock_time) => {
            Decision::Reclaim(ReclaimReason::Stale)
        }
        _ => Decision::WaitAndRetry,
    }
}

/// Resolve a lock ahead of a write.
///
/// Never reclaims and never looks at the timestamp.
pub fn decide_write(content: Option<&str>, owner: &OwnerId) -> Decision {
    let Some(content) = content else {
        return Decision::Proceed;
    };
    match LockToken::split_parts(content) {
        Err(_) => Decision::Fail(FailReason::Corrupted),
        Ok((holder, _)) if holder == owner.as_str() => Decision::Proceed,
        Ok(_) => Decision::WaitAndRetry,
    }
}

/// Decide after an existence check.
///
/// `checks` counts every existence check made so far, including the first
/// sighting of the lock.
pub fn decide_retry(still_present: bool, checks: u32, policy: &RetryPolicy) -> Decision {
    if !still_present {
        Decision::Proceed
    } else if checks >= policy.max_attempts() {
        Decision::Fail(FailReason::Locked)
    } else {
        Decision::WaitAndRetry
    }
}
