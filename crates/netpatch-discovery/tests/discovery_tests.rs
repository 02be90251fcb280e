//! Discovery Tests (netpatch-discovery)
//!
//! Tests for snapshot providers including:
//! - Browser manual registration and browse results
//! - Inventory file loading (JSON, TOML) and its failure modes
//! - Note: live mDNS browsing requires network access and is not exercised here

use netpatch_core::{Resolver, SnapshotProvider, SubscriptionRequest};
use netpatch_discovery::{
    Browser, ChannelInventory, DiscoveredDevice, DiscoveryConfig, DiscoveryError,
    InventoryClient, InventoryFileProvider, MdnsSnapshotProvider,
};
use std::io::Write;
use std::time::Duration;

fn offline_config() -> DiscoveryConfig {
    DiscoveryConfig {
        mdns: false,
        browse_window: Duration::from_millis(50),
        ..Default::default()
    }
}

// ============================================================================
// Browser Tests
// ============================================================================

#[tokio::test]
async fn test_browser_creation() {
    let browser = Browser::with_config(offline_config());
    assert_eq!(browser.devices().count(), 0, "New browser should have no devices");
}

#[tokio::test]
async fn test_browser_config_default() {
    let config = DiscoveryConfig::default();

    assert_eq!(config.service_type, "_netaudio-arc._udp.local.");
    assert_eq!(config.browse_window, Duration::from_millis(1500));
}

#[tokio::test]
async fn test_browse_returns_manual_devices_sorted() {
    let mut browser = Browser::with_config(offline_config());
    browser.add(DiscoveredDevice::new("stage-id", "Stage"));
    browser.add(DiscoveredDevice::new("mixer-id", "Mixer"));

    let found = browser.browse().await.unwrap();

    let ids: Vec<_> = found.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, ["mixer-id", "stage-id"]);
}

#[tokio::test]
async fn test_browser_manual_remove() {
    let mut browser = Browser::with_config(offline_config());
    browser.add(DiscoveredDevice::new("removable", "Removable"));

    let removed = browser.remove("removable");

    assert!(removed.is_some(), "Remove should return the device");
    assert!(browser.get("removable").is_none());
}

#[tokio::test]
async fn test_browser_overwrite_device() {
    let mut browser = Browser::with_config(offline_config());
    browser.add(DiscoveredDevice::new("same-id", "First"));
    browser.add(DiscoveredDevice::new("same-id", "Second"));

    assert_eq!(browser.devices().count(), 1);
    assert_eq!(browser.get("same-id").unwrap().name, "Second");
}

// ============================================================================
// Inventory File Tests
// ============================================================================

fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_json_inventory_file() {
    let file = write_temp(
        ".json",
        r#"{
            "devices": {
                "stage": {
                    "name": "Stage",
                    "tx_channels": [{"id": 1, "name": "Out 1", "alias": "Vocal"}]
                },
                "mixer": {
                    "name": "Mixer",
                    "rx_channels": [{"id": 1, "name": "In 1"}, {"id": 2, "name": "In 2"}]
                }
            }
        }"#,
    );

    let snapshot = InventoryFileProvider::new(file.path())
        .acquire(Duration::from_secs(1))
        .await
        .unwrap();

    assert_eq!(snapshot.len(), 2);
    let resolver = Resolver::new(&snapshot);
    let resolved = resolver
        .resolve(&SubscriptionRequest::new("Mixer", "In 2", "Stage", "Vocal"))
        .unwrap();
    assert_eq!(resolved.tx_channel.name, "Out 1");
}

#[tokio::test]
async fn test_toml_inventory_file() {
    let file = write_temp(
        ".toml",
        r#"
[devices.desk]
name = "Desk"
rx_channels = [{ name = "In 1" }]
tx_channels = [{ name = "Out 1" }]
"#,
    );

    let snapshot = InventoryFileProvider::new(file.path())
        .acquire(Duration::from_secs(1))
        .await
        .unwrap();

    assert_eq!(snapshot.get("desk").unwrap().name, "Desk");
}

#[tokio::test]
async fn test_missing_inventory_file() {
    let dir = tempfile::tempdir().unwrap();
    let provider = InventoryFileProvider::new(dir.path().join("absent.json"));

    let err = provider.acquire(Duration::from_secs(1)).await.unwrap_err();
    assert!(matches!(err, DiscoveryError::Io(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_malformed_inventory_file() {
    let file = write_temp(".json", r#"{"devices": {"x": "#);

    let err = InventoryFileProvider::new(file.path())
        .acquire(Duration::from_secs(1))
        .await
        .unwrap_err();
    assert!(matches!(err, DiscoveryError::Parse(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_unknown_inventory_extension() {
    let file = write_temp(".yaml", "devices: {}");

    let err = InventoryFileProvider::new(file.path())
        .acquire(Duration::from_secs(1))
        .await
        .unwrap_err();
    assert!(matches!(err, DiscoveryError::Parse(_)), "got {:?}", err);
}

// ============================================================================
// Network Provider Tests
// ============================================================================

struct UnreachableClient;

#[async_trait::async_trait]
impl InventoryClient for UnreachableClient {
    async fn fetch_channels(
        &self,
        device: &DiscoveredDevice,
    ) -> netpatch_discovery::Result<ChannelInventory> {
        Err(DiscoveryError::Other(format!("{} did not answer", device.name)))
    }
}

#[tokio::test]
async fn test_network_provider_with_nothing_announced() {
    let provider = MdnsSnapshotProvider::with_config(offline_config(), UnreachableClient);

    let snapshot = provider.acquire(Duration::from_secs(1)).await.unwrap();
    assert!(snapshot.is_empty());
}
