//! Channel inventory population
//!
//! Reading a device's channel lists needs the device-control protocol, which
//! is supplied from outside through [`InventoryClient`].

use async_trait::async_trait;
use futures::future::try_join_all;
use netpatch_core::{Channel, Snapshot};
use tracing::debug;

use crate::{DiscoveredDevice, DiscoveryError, Result};

/// Receive and transmit channel lists of one device, in device order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelInventory {
    pub rx: Vec<Channel>,
    pub tx: Vec<Channel>,
}

/// Reads channel inventories from devices
#[async_trait]
pub trait InventoryClient: Send + Sync {
    async fn fetch_channels(&self, device: &DiscoveredDevice) -> Result<ChannelInventory>;
}

/// Fetch every device's inventory concurrently and build a snapshot.
///
/// All or nothing: the first failing device fails the whole call. Devices
/// are placed in the snapshot ordered by identifier.
pub async fn populate<C>(client: &C, mut devices: Vec<DiscoveredDevice>) -> Result<Snapshot>
where
    C: InventoryClient + ?Sized,
{
    devices.sort_by(|a, b| a.id.cmp(&b.id));

    let inventories = try_join_all(devices.iter().map(|device| async move {
        debug!(device = %device.name, "Fetching channel inventory");
        client
            .fetch_channels(device)
            .await
            .map_err(|e| match e {
                e @ DiscoveryError::Inventory { .. } => e,
                other => DiscoveryError::Inventory {
                    device: device.name.clone(),
                    reason: other.to_string(),
                },
            })
    }))
    .await?;

    Ok(Snapshot::from_devices(
        devices
            .into_iter()
            .zip(inventories)
            .map(|(device, inventory)| device.into_device(inventory)),
    ))
}
