//! netpatch Core
//!
//! Resolves a declarative list of audio subscriptions against a snapshot of
//! discovered devices and applies every resolvable one.
//!
//! This crate provides:
//! - The device/channel inventory model ([`Device`], [`Channel`], [`Snapshot`])
//! - Name indices built once per snapshot ([`SnapshotIndex`])
//! - Per-request resolution ([`Resolver`])
//! - The collaborator seams ([`SnapshotProvider`], [`Applier`])
//! - The pipeline driver and its ordered result ([`Pipeline`], [`Report`])

pub mod error;
pub mod index;
pub mod model;
pub mod outcome;
pub mod pipeline;
pub mod request;
pub mod resolve;
pub mod traits;

pub use error::{ApplyError, DiscoveryError, PipelineError, Result};
pub use index::SnapshotIndex;
pub use model::{Channel, Device, Snapshot};
pub use outcome::{Outcome, OutcomeKind, Report, Route, Summary};
pub use pipeline::{Pipeline, PipelineConfig};
pub use request::SubscriptionRequest;
pub use resolve::{ResolvedSubscription, Resolver, Side, Unresolved};
pub use traits::{Applier, SnapshotProvider};

pub use tokio_util::sync::CancellationToken;

/// Default time allowed for acquiring a device snapshot
pub const DEFAULT_DISCOVERY_TIMEOUT: std::time::Duration = std::time::Duration::from_millis(1500);
