//! netpatch Discovery
//!
//! Snapshot providers for the subscription pipeline:
//! - mDNS/Bonjour browsing of audio devices on the LAN
//! - Inventory population through a device-control client
//! - Inventory files (saved snapshots)
//! - Manual registration

pub mod error;
pub mod file;
pub mod inventory;
pub mod record;

#[cfg(feature = "mdns")]
pub mod mdns;

pub mod provider;

pub use error::{DiscoveryError, Result};
pub use file::{parse_inventory, render_inventory, InventoryFileProvider, InventoryFormat};
pub use inventory::{populate, ChannelInventory, InventoryClient};
pub use record::DiscoveredDevice;

pub use provider::MdnsSnapshotProvider;

use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Discovery event
#[derive(Debug, Clone)]
pub enum DiscoveryEvent {
    /// Device discovered
    Found(DiscoveredDevice),
    /// Device removed/lost
    Lost(String), // Device ID
    /// Error during discovery
    Error(String),
}

/// Discovery configuration
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Enable mDNS discovery
    pub mdns: bool,
    /// mDNS service type to browse
    pub service_type: String,
    /// How long to collect announcements
    pub browse_window: Duration,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            mdns: cfg!(feature = "mdns"),
            service_type: DEFAULT_SERVICE_TYPE.to_string(),
            browse_window: netpatch_core::DEFAULT_DISCOVERY_TIMEOUT,
        }
    }
}

/// Service type browsed by default
pub const DEFAULT_SERVICE_TYPE: &str = "_netaudio-arc._udp.local.";

/// Collects devices for one browse window
pub struct Browser {
    config: DiscoveryConfig,
    devices: HashMap<String, DiscoveredDevice>,
}

impl Browser {
    pub fn new() -> Self {
        Self::with_config(DiscoveryConfig::default())
    }

    pub fn with_config(config: DiscoveryConfig) -> Self {
        Self {
            config,
            devices: HashMap::new(),
        }
    }

    /// Browse for the configured window and return every known device,
    /// sorted by identifier.
    ///
    /// Manually added devices are included. Devices announced as lost during
    /// the window are dropped.
    pub async fn browse(&mut self) -> Result<Vec<DiscoveredDevice>> {
        let (tx, mut rx) = mpsc::channel(100);
        let stop = CancellationToken::new();
        #[allow(unused_mut)]
        let mut tasks: Vec<tokio::task::JoinHandle<Result<()>>> = Vec::new();

        #[cfg(feature = "mdns")]
        if self.config.mdns {
            let tx_clone = tx.clone();
            let service_type = self.config.service_type.clone();
            let stop_clone = stop.clone();
            tasks.push(tokio::spawn(async move {
                mdns::discover(&service_type, tx_clone, stop_clone).await
            }));
        }

        let deadline = tokio::time::Instant::now() + self.config.browse_window;
        drop(tx); // Close sender so rx completes when all spawned tasks finish

        loop {
            tokio::select! {
                event = rx.recv() => {
                    match event {
                        Some(DiscoveryEvent::Found(device)) => {
                            self.devices.insert(device.id.clone(), device);
                        }
                        Some(DiscoveryEvent::Lost(id)) => {
                            self.devices.remove(&id);
                        }
                        Some(DiscoveryEvent::Error(e)) => {
                            warn!("Discovery error: {}", e);
                        }
                        None => break,
                    }
                }
                _ = tokio::time::sleep_until(deadline) => {
                    debug!("Browse window elapsed");
                    break;
                }
            }
        }

        stop.cancel();
        for task in tasks {
            task.await
                .map_err(|e| DiscoveryError::Other(format!("discovery task failed: {}", e)))??;
        }

        let mut found: Vec<DiscoveredDevice> = self.devices.values().cloned().collect();
        found.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(found)
    }

    /// Get currently known devices
    pub fn devices(&self) -> impl Iterator<Item = &DiscoveredDevice> {
        self.devices.values()
    }

    /// Get a device by ID
    pub fn get(&self, id: &str) -> Option<&DiscoveredDevice> {
        self.devices.get(id)
    }

    /// Manually add a device
    pub fn add(&mut self, device: DiscoveredDevice) {
        self.devices.insert(device.id.clone(), device);
    }

    /// Remove a device
    pub fn remove(&mut self, id: &str) -> Option<DiscoveredDevice> {
        self.devices.remove(id)
    }
}

impl Default for Browser {
    fn default() -> Self {
        Self::new()
    }
}
