//! Run configuration
//!
//! All settings are collected from the command line once at startup,
//! validated, and then read-only for the rest of the run.

pub mod types;
pub mod validation;

pub use types::{DelayBounds, ListingKind, RunConfig, Transport};
pub use validation::validate;
