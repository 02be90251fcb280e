//! Collaborator seams
//!
//! Discovery and the device-control protocol live outside this crate. The
//! pipeline reaches them only through these traits.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{ApplyError, DiscoveryError};
use crate::model::{Channel, Device, Snapshot};

/// Source of device snapshots
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    /// Acquire a complete snapshot within `timeout`.
    ///
    /// Every returned device must already carry both channel inventories.
    /// Implementations fail instead of returning a partial snapshot.
    async fn acquire(&self, timeout: Duration) -> Result<Snapshot, DiscoveryError>;
}

/// Device-control operation that establishes one subscription
#[async_trait]
pub trait Applier: Send + Sync {
    /// Subscribe `rx_channel` on `rx_device` to `tx_channel` on `tx_device`
    async fn apply(
        &self,
        rx_device: &Device,
        rx_channel: &Channel,
        tx_channel: &Channel,
        tx_device: &Device,
    ) -> Result<(), ApplyError>;
}

#[async_trait]
impl<T: SnapshotProvider + ?Sized> SnapshotProvider for Arc<T> {
    async fn acquire(&self, timeout: Duration) -> Result<Snapshot, DiscoveryError> {
        (**self).acquire(timeout).await
    }
}

#[async_trait]
impl<T: Applier + ?Sized> Applier for Arc<T> {
    async fn apply(
        &self,
        rx_device: &Device,
        rx_channel: &Channel,
        tx_channel: &Channel,
        tx_device: &Device,
    ) -> Result<(), ApplyError> {
        (**self)
            .apply(rx_device, rx_channel, tx_channel, tx_device)
            .await
    }
}
