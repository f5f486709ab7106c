#![doc = include_str!("../README.md")]

/// Runs the per-role fetch, compare, report, and persist pipeline.
pub mod comparator;

/// Structural comparison of two source bundles.
pub mod compare;

/// Handles all app configuration.
pub mod config;

/// Error types shared across the crate.
pub mod error;

/// Client for Etherscan-compatible block explorers.
pub mod explorer;

/// Writes differing sources to disk for manual inspection.
pub mod persist;

/// Console output of a run.
pub mod report;

/// The contract roles compared between the two deployments.
pub mod role;

/// Decoding of the `SourceCode` field returned by explorers.
pub mod source;

/// Handles logs and tracing.
pub mod telemetry;

pub use comparator::{Comparator, RoleOutcome, RunSummary};
pub use compare::{FileComparison, FileStatus, RoleComparison};
pub use error::{Error, ExplorerError};
pub use explorer::{ExplorerClient, Side};
pub use role::ContractRole;
pub use source::SourceCode;
