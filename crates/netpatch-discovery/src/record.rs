//! Discovered device records

use netpatch_core::Device;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use crate::inventory::ChannelInventory;

/// A device seen on the network, before its inventory is read
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveredDevice {
    /// Unique identifier (mDNS full service name)
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Host name without the trailing dot
    pub hostname: String,
    /// Advertised addresses, sorted
    pub addresses: Vec<String>,
    /// Control port
    pub port: u16,
    /// TXT record properties
    #[serde(default)]
    pub meta: HashMap<String, String>,
}

impl DiscoveredDevice {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            hostname: String::new(),
            addresses: Vec::new(),
            port: 0,
            meta: HashMap::new(),
        }
    }

    pub fn with_address(mut self, address: impl Into<String>, port: u16) -> Self {
        self.addresses.push(address.into());
        self.addresses.sort();
        self.port = port;
        self
    }

    /// First address that parses as an IP, combined with the control port
    pub fn socket_addr(&self) -> Option<SocketAddr> {
        self.addresses
            .iter()
            .find_map(|a| a.parse::<IpAddr>().ok())
            .map(|ip| SocketAddr::new(ip, self.port))
    }

    /// Attach an inventory, producing a snapshot device
    pub fn into_device(self, inventory: ChannelInventory) -> Device {
        let mut device = Device::new(self.id, self.name);
        device.address = self
            .addresses
            .first()
            .map(|a| format!("{}:{}", a, self.port));
        device.rx_channels = inventory.rx;
        device.tx_channels = inventory.tx;
        device
    }
}
