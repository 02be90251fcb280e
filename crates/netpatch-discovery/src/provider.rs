//! Network snapshot provider: mDNS browse followed by inventory population

use async_trait::async_trait;
use netpatch_core::{Snapshot, SnapshotProvider};
use std::time::Duration;
use tracing::info;

use crate::inventory::{populate, InventoryClient};
use crate::{Browser, DiscoveryConfig, Result};

/// Browses the network, then reads every device's inventory through `C`
pub struct MdnsSnapshotProvider<C> {
    config: DiscoveryConfig,
    client: C,
}

impl<C: InventoryClient> MdnsSnapshotProvider<C> {
    pub fn new(client: C) -> Self {
        Self::with_config(DiscoveryConfig::default(), client)
    }

    pub fn with_config(config: DiscoveryConfig, client: C) -> Self {
        Self { config, client }
    }
}

#[async_trait]
impl<C: InventoryClient> SnapshotProvider for MdnsSnapshotProvider<C> {
    async fn acquire(&self, timeout: Duration) -> Result<Snapshot> {
        // The browse window must leave room for inventory reads.
        let mut config = self.config.clone();
        config.browse_window = config.browse_window.min(timeout / 2);

        let found = Browser::with_config(config).browse().await?;
        info!("Reading channel inventories of {} device(s)", found.len());
        populate(&self.client, found).await
    }
}
