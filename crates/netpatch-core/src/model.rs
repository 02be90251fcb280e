//! Device and channel inventory model

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A receive or transmit channel on a device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Channel number as reported by the device
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u16>,
    /// Primary channel name
    pub name: String,
    /// Friendly alias (transmit channels only, in practice)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl Channel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            alias: None,
        }
    }

    pub fn with_id(mut self, id: u16) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Names the channel answers to: the primary name, then the alias
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.alias.as_deref())
    }
}

/// A discovered device with populated channel inventories
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Provider-assigned identifier (mDNS full name, inventory key, ...)
    pub id: String,
    /// Human-readable name, used for matching
    pub name: String,
    /// Network address, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Receive inventory, in device order
    #[serde(default)]
    pub rx_channels: Vec<Channel>,
    /// Transmit inventory, in device order
    #[serde(default)]
    pub tx_channels: Vec<Channel>,
}

impl Device {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: None,
            rx_channels: Vec::new(),
            tx_channels: Vec::new(),
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_rx_channel(mut self, channel: Channel) -> Self {
        self.rx_channels.push(channel);
        self
    }

    pub fn with_tx_channel(mut self, channel: Channel) -> Self {
        self.tx_channels.push(channel);
        self
    }
}

/// Immutable view of every device known at acquisition time.
///
/// Devices keep insertion order. "First match" during resolution refers to
/// this order, so providers should insert deterministically; [`Snapshot::from_map`]
/// orders by device identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    devices: Vec<Device>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from devices in the given order
    pub fn from_devices(devices: impl IntoIterator<Item = Device>) -> Self {
        Self {
            devices: devices.into_iter().collect(),
        }
    }

    /// Build from an identifier -> device mapping, ordered by identifier.
    ///
    /// The map key overrides the device's own `id`.
    pub fn from_map(map: impl IntoIterator<Item = (String, Device)>) -> Self {
        let sorted: BTreeMap<String, Device> = map.into_iter().collect();
        Self {
            devices: sorted
                .into_iter()
                .map(|(id, mut device)| {
                    device.id = id;
                    device
                })
                .collect(),
        }
    }

    pub fn insert(&mut self, device: Device) {
        self.devices.push(device);
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    /// Look a device up by provider identifier
    pub fn get(&self, id: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.id == id)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
