//! Inventory files
//!
//! A saved snapshot: device identifier -> device with its channel lists, as
//! JSON or TOML.
//!
//! ```toml
//! [devices.mixer]
//! name = "Mixer"
//! rx_channels = [{ id = 1, name = "In 1" }]
//!
//! [devices.stage]
//! name = "Stage"
//! tx_channels = [{ id = 1, name = "Out 1", alias = "Vocal" }]
//! ```

use async_trait::async_trait;
use netpatch_core::{Channel, Device, Snapshot, SnapshotProvider};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::{DiscoveryError, Result};

/// Inventory file encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InventoryFormat {
    Json,
    Toml,
}

impl InventoryFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Self::Json),
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(Self::Toml),
            _ => Err(DiscoveryError::Parse(format!(
                "unsupported inventory file extension: {}",
                path.display()
            ))),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct InventoryDocument {
    #[serde(default)]
    devices: BTreeMap<String, DeviceEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct DeviceEntry {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    address: Option<String>,
    #[serde(default)]
    rx_channels: Vec<Channel>,
    #[serde(default)]
    tx_channels: Vec<Channel>,
}

/// Parse an inventory document into a snapshot ordered by device identifier
pub fn parse_inventory(text: &str, format: InventoryFormat) -> Result<Snapshot> {
    let document: InventoryDocument = match format {
        InventoryFormat::Json => {
            serde_json::from_str(text).map_err(|e| DiscoveryError::Parse(e.to_string()))?
        }
        InventoryFormat::Toml => {
            toml::from_str(text).map_err(|e| DiscoveryError::Parse(e.to_string()))?
        }
    };

    Ok(Snapshot::from_map(document.devices.into_iter().map(
        |(id, entry)| {
            let device = Device {
                id: id.clone(),
                name: entry.name,
                address: entry.address,
                rx_channels: entry.rx_channels,
                tx_channels: entry.tx_channels,
            };
            (id, device)
        },
    )))
}

/// Serialize a snapshot as an inventory document
pub fn render_inventory(snapshot: &Snapshot, format: InventoryFormat) -> Result<String> {
    let document = InventoryDocument {
        devices: snapshot
            .devices()
            .iter()
            .map(|d| {
                (
                    d.id.clone(),
                    DeviceEntry {
                        name: d.name.clone(),
                        address: d.address.clone(),
                        rx_channels: d.rx_channels.clone(),
                        tx_channels: d.tx_channels.clone(),
                    },
                )
            })
            .collect(),
    };

    match format {
        InventoryFormat::Json => serde_json::to_string_pretty(&document)
            .map_err(|e| DiscoveryError::Parse(e.to_string())),
        InventoryFormat::Toml => {
            toml::to_string_pretty(&document).map_err(|e| DiscoveryError::Parse(e.to_string()))
        }
    }
}

/// Snapshot provider backed by an inventory file
#[derive(Debug, Clone)]
pub struct InventoryFileProvider {
    path: PathBuf,
}

impl InventoryFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SnapshotProvider for InventoryFileProvider {
    async fn acquire(&self, timeout: Duration) -> Result<Snapshot> {
        let format = InventoryFormat::from_path(&self.path)?;
        debug!("Loading inventory from {}", self.path.display());

        let text = tokio::time::timeout(timeout, tokio::fs::read_to_string(&self.path))
            .await
            .map_err(|_| DiscoveryError::Timeout(timeout))??;

        parse_inventory(&text, format)
    }
}
