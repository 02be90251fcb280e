//! Applier used by `apply --dry-run`

use async_trait::async_trait;
use netpatch_core::{Applier, ApplyError, Channel, Device};
use tracing::info;

/// Logs each subscription instead of sending it to a device
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunApplier;

#[async_trait]
impl Applier for DryRunApplier {
    async fn apply(
        &self,
        rx_device: &Device,
        rx_channel: &Channel,
        tx_channel: &Channel,
        tx_device: &Device,
    ) -> Result<(), ApplyError> {
        info!(
            "[dry run] subscribe {}@{} ({}) <- {}@{}",
            rx_channel.name,
            rx_device.name,
            rx_device.address.as_deref().unwrap_or("no address"),
            tx_channel.name,
            tx_device.name
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dry_run_always_succeeds() {
        let rx = Device::new("mixer", "Mixer");
        let tx = Device::new("stage", "Stage");

        let result = DryRunApplier
            .apply(&rx, &Channel::new("In 1"), &Channel::new("Out 1"), &tx)
            .await;
        assert!(result.is_ok());
    }
}
