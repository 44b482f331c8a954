//! Advisory, time-boxed locks over a blob store without compare-and-swap.
//!
//! A lock is an ordinary blob whose content is a
//! [`LockToken`](persist_types::LockToken). Holders are recognized by owner
//! id, staleness is judged from the timestamp inside the token, and
//! contention is handled by re-checking existence on a bounded schedule.
//!
//! # Modules
//!
//! - [`decision`] — Pure state machine: blob observations in, [`Decision`] out
//! - [`retry`] — [`RetryPolicy`] and pluggable [`Backoff`] strategies
//! - [`coordinator`] — [`LockCoordinator`] executing decisions against a
//!   [`BlobStore`](persist_blob::BlobStore)
//! - [`error`] — [`LockError`]
//!
//! # Guarantees
//!
//! None beyond best effort. Two processes that both observe "no lock" will
//! both write one, and neither will notice.

pub mod coordinator;
pub mod decision;
pub mod error;
pub mod retry;

pub use coordinator::{CoordinatorConfig, LockCoordinator, Resolution};
pub use decision::{decide_read, decide_retry, decide_write, Decision, FailReason, ReclaimReason};
pub use error::{LockError, LockResult};
pub use retry::{Backoff, ExponentialBackoff, FixedBackoff, RetryPolicy};
