//! Foundation types for gcr-persist.
//!
//! Every other crate in the workspace depends on `persist-types`. The types
//! here carry no I/O: they describe *who* holds a lock, *when* it was taken,
//! and *which* record it guards.
//!
//! # Key Types
//!
//! - [`OwnerId`] — Identity stamped into every lock this process writes
//! - [`LockToken`] — The `"<owner>:<millis>"` content of a `.lock` blob
//! - [`RecordKey`] — Validated key naming a `.lock`/`.json` blob pair
//! - [`Clock`] — Wall-clock source used for staleness decisions

pub mod clock;
pub mod error;
pub mod key;
pub mod owner;
pub mod token;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::TypeError;
pub use key::RecordKey;
pub use owner::OwnerId;
pub use token::{LockToken, TokenError};
