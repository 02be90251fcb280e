//! Subscription requests

use serde::{Deserialize, Serialize};
use std::fmt;

/// One desired subscription, by name.
///
/// All four fields are required when deserializing; a record missing any of
/// them is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionRequest {
    pub rx_device_name: String,
    pub rx_channel_name: String,
    pub tx_device_name: String,
    /// Primary name or alias of the transmit channel
    pub tx_channel_name: String,
}

impl SubscriptionRequest {
    pub fn new(
        rx_device_name: impl Into<String>,
        rx_channel_name: impl Into<String>,
        tx_device_name: impl Into<String>,
        tx_channel_name: impl Into<String>,
    ) -> Self {
        Self {
            rx_device_name: rx_device_name.into(),
            rx_channel_name: rx_channel_name.into(),
            tx_device_name: tx_device_name.into(),
            tx_channel_name: tx_channel_name.into(),
        }
    }
}

impl fmt::Display for SubscriptionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{} <- {}@{}",
            self.rx_channel_name, self.rx_device_name, self.tx_channel_name, self.tx_device_name
        )
    }
}
