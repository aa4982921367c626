//! Business logic services.
//!
//! [`DigestService`] turns runs into learnings; [`RunFetcher`] gets the runs
//! from a source without ever blocking the caller past its budget.

pub mod digest;
pub mod fetch;

pub use digest::{DigestReport, DigestService, RankedGroup};
pub use fetch::RunFetcher;
