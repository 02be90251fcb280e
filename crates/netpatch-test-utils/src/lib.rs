//! Common test helpers for netpatch tests
//!
//! This crate provides:
//! - In-memory snapshot providers (static, failing, slow)
//! - A recording applier with per-channel failure, panic and delay injection
//! - Snapshot fixtures

use async_trait::async_trait;
use netpatch_core::{
    ApplyError, Applier, Channel, Device, DiscoveryError, Route, Snapshot, SnapshotProvider,
};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Fixtures
// ============================================================================

/// "Mixer" with two receive channels and "Stage" with an aliased transmit channel
pub fn mixer_stage_snapshot() -> Snapshot {
    Snapshot::from_devices(vec![
        Device::new("mixer._netaudio-arc._udp.local.", "Mixer")
            .with_rx_channel(Channel::new("In 1").with_id(1))
            .with_rx_channel(Channel::new("In 2").with_id(2)),
        Device::new("stage._netaudio-arc._udp.local.", "Stage")
            .with_tx_channel(Channel::new("Out 1").with_id(1).with_alias("Vocal")),
    ])
}

/// A device exposing `count` receive and `count` transmit channels named
/// "In N" and "Out N"
pub fn loopback_device(name: &str, count: u16) -> Device {
    (1..=count).fold(Device::new(name.to_lowercase(), name), |device, n| {
        device
            .with_rx_channel(Channel::new(format!("In {n}")).with_id(n))
            .with_tx_channel(Channel::new(format!("Out {n}")).with_id(n))
    })
}

// ============================================================================
// Providers
// ============================================================================

/// Returns a clone of a fixed snapshot and counts acquisitions
#[derive(Debug, Clone)]
pub struct StaticProvider {
    snapshot: Snapshot,
    delay: Option<Duration>,
    acquisitions: Arc<AtomicUsize>,
}

impl StaticProvider {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot,
            delay: None,
            acquisitions: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Sleep before returning the snapshot
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotProvider for StaticProvider {
    async fn acquire(&self, _timeout: Duration) -> Result<Snapshot, DiscoveryError> {
        self.acquisitions.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.snapshot.clone())
    }
}

/// Always fails acquisition
#[derive(Debug, Clone)]
pub struct FailingProvider {
    reason: String,
}

impl FailingProvider {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl SnapshotProvider for FailingProvider {
    async fn acquire(&self, _timeout: Duration) -> Result<Snapshot, DiscoveryError> {
        Err(DiscoveryError::Other(self.reason.clone()))
    }
}

// ============================================================================
// Applier
// ============================================================================

/// Applier that records every call in dispatch order.
///
/// Behaviour is keyed by receive channel name.
#[derive(Debug, Clone, Default)]
pub struct RecordingApplier {
    calls: Arc<Mutex<Vec<Route>>>,
    failures: Arc<Mutex<HashMap<String, ApplyError>>>,
    panics: Arc<Mutex<HashSet<String>>>,
    delays: Arc<Mutex<HashMap<String, Duration>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl RecordingApplier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail applies targeting `rx_channel` with `error`
    pub fn fail_on(self, rx_channel: &str, error: ApplyError) -> Self {
        self.failures.lock().insert(rx_channel.to_string(), error);
        self
    }

    /// Panic inside applies targeting `rx_channel`
    pub fn panic_on(self, rx_channel: &str) -> Self {
        self.panics.lock().insert(rx_channel.to_string());
        self
    }

    /// Sleep for `delay` inside applies targeting `rx_channel`
    pub fn delay_on(self, rx_channel: &str, delay: Duration) -> Self {
        self.delays.lock().insert(rx_channel.to_string(), delay);
        self
    }

    /// Routes passed to `apply`, in call order
    pub fn calls(&self) -> Vec<Route> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Highest number of applies observed running at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Applier for RecordingApplier {
    async fn apply(
        &self,
        rx_device: &Device,
        rx_channel: &Channel,
        tx_channel: &Channel,
        tx_device: &Device,
    ) -> Result<(), ApplyError> {
        self.calls.lock().push(Route {
            rx_device: rx_device.name.clone(),
            rx_channel: rx_channel.name.clone(),
            tx_device: tx_device.name.clone(),
            tx_channel: tx_channel.name.clone(),
        });

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlight(&self.in_flight);
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let delay = self.delays.lock().get(&rx_channel.name).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.panics.lock().contains(&rx_channel.name) {
            panic!("injected panic on {}", rx_channel.name);
        }

        match self.failures.lock().get(&rx_channel.name) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loopback_device() {
        let device = loopback_device("Bench", 3);
        assert_eq!(device.id, "bench");
        assert_eq!(device.rx_channels.len(), 3);
        assert_eq!(device.tx_channels[2].name, "Out 3");
        assert_eq!(device.tx_channels[2].id, Some(3));
    }

    #[tokio::test]
    async fn test_recording_applier_records_and_fails() {
        let snapshot = mixer_stage_snapshot();
        let mixer = &snapshot.devices()[0];
        let stage = &snapshot.devices()[1];
        let applier =
            RecordingApplier::new().fail_on("In 2", ApplyError::Rejected("busy".into()));

        let ok = applier
            .apply(mixer, &mixer.rx_channels[0], &stage.tx_channels[0], stage)
            .await;
        let err = applier
            .apply(mixer, &mixer.rx_channels[1], &stage.tx_channels[0], stage)
            .await;

        assert!(ok.is_ok());
        assert_eq!(err, Err(ApplyError::Rejected("busy".into())));
        assert_eq!(applier.call_count(), 2);
        assert_eq!(applier.calls()[1].rx_channel, "In 2");
        assert_eq!(applier.max_in_flight(), 1);
    }
}
