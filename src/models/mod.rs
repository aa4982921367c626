//! Data models for faildigest.
//!
//! Raw runs as delivered by a run source, the failure records and groups the
//! digest pipeline derives from them, and the project identity they belong to.

mod failure;
mod identity;
mod run;

pub use failure::{FailureGroup, FailureRecord, GroupKey, UNKNOWN};
pub use identity::ProjectIdentity;
pub use run::{RawRun, RunType};
