//! Discovery error types
//!
//! Snapshot providers report through the core's [`DiscoveryError`] so a
//! failed acquisition reaches the pipeline unchanged.

pub use netpatch_core::DiscoveryError;

pub type Result<T> = std::result::Result<T, DiscoveryError>;
