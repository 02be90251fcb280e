//! Error types for the subscription pipeline

use std::time::Duration;
use thiserror::Error;

/// Result type alias for pipeline runs
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Failure to produce a complete device snapshot
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// Acquisition did not finish within the configured window
    #[error("discovery timed out after {0:?}")]
    Timeout(Duration),

    #[error("mDNS error: {0}")]
    Mdns(String),

    /// A device was found but its channel inventory could not be read
    #[error("inventory error for {device}: {reason}")]
    Inventory { device: String, reason: String },

    #[error("snapshot parse error: {0}")]
    Parse(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("discovery error: {0}")]
    Other(String),
}

/// Failure of a single apply operation.
///
/// Never escapes the pipeline; it is attached to the outcome of the request
/// that produced it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApplyError {
    /// The device refused the subscription
    #[error("rejected by device: {0}")]
    Rejected(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("apply timed out after {0:?}")]
    Timeout(Duration),

    /// Never dispatched because the run was cancelled
    #[error("cancelled before dispatch")]
    Cancelled,

    #[error("apply panicked: {0}")]
    Panicked(String),

    #[error("{0}")]
    Other(String),
}

/// Run-level failure
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("snapshot acquisition failed: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("run cancelled during snapshot acquisition")]
    Cancelled,
}
