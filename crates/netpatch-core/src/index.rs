//! Name indices over a snapshot
//!
//! Built once per snapshot so every lookup is a hash probe. Duplicate names
//! keep the entry inserted first, in snapshot order for devices and in
//! inventory order for channels.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::debug;

use crate::model::{Channel, Device, Snapshot};

/// Per-device channel indices
#[derive(Debug)]
struct DeviceIndex<'a> {
    device: &'a Device,
    /// Receive channels by primary name
    rx: HashMap<&'a str, &'a Channel>,
    /// Transmit channels by primary name and alias
    tx: HashMap<&'a str, &'a Channel>,
}

impl<'a> DeviceIndex<'a> {
    fn build(device: &'a Device) -> Self {
        let mut rx = HashMap::with_capacity(device.rx_channels.len());
        for channel in &device.rx_channels {
            rx.entry(channel.name.as_str()).or_insert(channel);
        }

        // Walk in inventory order and insert both keys of a channel before
        // moving on, so a key resolves to the first channel answering to it.
        let mut tx = HashMap::with_capacity(device.tx_channels.len() * 2);
        for channel in &device.tx_channels {
            for key in channel.names() {
                tx.entry(key).or_insert(channel);
            }
        }

        Self { device, rx, tx }
    }
}

/// Lookup tables for one snapshot
#[derive(Debug)]
pub struct SnapshotIndex<'a> {
    devices: HashMap<&'a str, DeviceIndex<'a>>,
}

impl<'a> SnapshotIndex<'a> {
    pub fn build(snapshot: &'a Snapshot) -> Self {
        let mut devices = HashMap::with_capacity(snapshot.len());
        for device in snapshot.devices() {
            match devices.entry(device.name.as_str()) {
                Entry::Occupied(_) => {
                    debug!(
                        device = %device.name,
                        id = %device.id,
                        "Duplicate device name, keeping first"
                    );
                }
                Entry::Vacant(slot) => {
                    slot.insert(DeviceIndex::build(device));
                }
            }
        }

        Self { devices }
    }

    /// Find a device by exact name
    pub fn device(&self, name: &str) -> Option<&'a Device> {
        self.devices.get(name).map(|idx| idx.device)
    }

    /// Find a receive channel on the named device, by primary name only
    pub fn rx_channel(&self, device: &str, channel: &str) -> Option<&'a Channel> {
        self.devices
            .get(device)
            .and_then(|idx| idx.rx.get(channel).copied())
    }

    /// Find a transmit channel on the named device, by primary name or alias
    pub fn tx_channel(&self, device: &str, channel: &str) -> Option<&'a Channel> {
        self.devices
            .get(device)
            .and_then(|idx| idx.tx.get(channel).copied())
    }

    /// Number of distinct device names
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> Snapshot {
        Snapshot::from_devices(vec![
            Device::new("1", "Mixer")
                .with_rx_channel(Channel::new("In 1").with_id(1))
                .with_rx_channel(Channel::new("In 1").with_id(2)),
            Device::new("2", "Stage")
                .with_tx_channel(Channel::new("Out 1").with_id(1).with_alias("Vocal"))
                .with_tx_channel(Channel::new("Vocal").with_id(2))
                .with_tx_channel(Channel::new("Out 3").with_id(3).with_alias("Out 1")),
            Device::new("3", "Mixer"),
        ])
    }

    #[test]
    fn test_duplicate_device_name_keeps_first() {
        let snapshot = snapshot();
        let index = SnapshotIndex::build(&snapshot);

        assert_eq!(index.len(), 2);
        assert_eq!(index.device("Mixer").map(|d| d.id.as_str()), Some("1"));
    }

    #[test]
    fn test_duplicate_rx_channel_keeps_first() {
        let snapshot = snapshot();
        let index = SnapshotIndex::build(&snapshot);

        assert_eq!(index.rx_channel("Mixer", "In 1").and_then(|c| c.id), Some(1));
    }

    #[test]
    fn test_tx_first_channel_answering_wins() {
        let snapshot = snapshot();
        let index = SnapshotIndex::build(&snapshot);

        // "Vocal" is channel 1's alias and channel 2's name; channel 1 comes first.
        assert_eq!(index.tx_channel("Stage", "Vocal").and_then(|c| c.id), Some(1));
        // "Out 1" is channel 1's name and channel 3's alias.
        assert_eq!(index.tx_channel("Stage", "Out 1").and_then(|c| c.id), Some(1));
        assert_eq!(index.tx_channel("Stage", "Out 3").and_then(|c| c.id), Some(3));
    }

    #[test]
    fn test_inventories_are_separate() {
        let snapshot = snapshot();
        let index = SnapshotIndex::build(&snapshot);

        assert!(index.tx_channel("Mixer", "In 1").is_none());
        assert!(index.rx_channel("Stage", "Out 1").is_none());
        assert!(index.rx_channel("Ghost", "In 1").is_none());
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let snapshot = snapshot();
        let index = SnapshotIndex::build(&snapshot);

        assert!(index.device("mixer").is_none());
        assert!(index.tx_channel("Stage", "vocal").is_none());
    }
}
