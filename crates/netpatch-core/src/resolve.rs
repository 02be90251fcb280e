//! Request resolution
//!
//! Maps the four names of a [`SubscriptionRequest`] onto live entities in a
//! snapshot. Pure and synchronous; every request yields exactly one result.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::debug;

use crate::index::SnapshotIndex;
use crate::model::{Channel, Device, Snapshot};
use crate::outcome::Route;
use crate::request::SubscriptionRequest;

/// Which end of a subscription a name belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Receiving end (destination)
    Rx,
    /// Transmitting end (source)
    Tx,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Rx => f.write_str("RX"),
            Side::Tx => f.write_str("TX"),
        }
    }
}

/// Why a request could not be resolved
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Unresolved {
    #[error("{side} device '{name}' not found")]
    DeviceNotFound { side: Side, name: String },

    #[error("{side} channel '{name}' not found on {device}")]
    ChannelNotFound {
        side: Side,
        name: String,
        /// Device whose inventory was searched
        device: String,
    },
}

impl Unresolved {
    pub fn side(&self) -> Side {
        match self {
            Unresolved::DeviceNotFound { side, .. } | Unresolved::ChannelNotFound { side, .. } => {
                *side
            }
        }
    }
}

/// A request bound to entities of one snapshot
#[derive(Debug, Clone, Copy)]
pub struct ResolvedSubscription<'a> {
    pub rx_device: &'a Device,
    pub rx_channel: &'a Channel,
    pub tx_device: &'a Device,
    pub tx_channel: &'a Channel,
}

impl ResolvedSubscription<'_> {
    /// Owned copy of the resolved primary names
    pub fn route(&self) -> Route {
        Route {
            rx_device: self.rx_device.name.clone(),
            rx_channel: self.rx_channel.name.clone(),
            tx_device: self.tx_device.name.clone(),
            tx_channel: self.tx_channel.name.clone(),
        }
    }
}

/// Resolves requests against one snapshot
#[derive(Debug)]
pub struct Resolver<'a> {
    index: SnapshotIndex<'a>,
}

impl<'a> Resolver<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self {
            index: SnapshotIndex::build(snapshot),
        }
    }

    /// Resolve one request.
    ///
    /// Lookups run rx device, tx device, rx channel, tx channel; the first
    /// miss is reported and later lookups are skipped.
    pub fn resolve(
        &self,
        request: &SubscriptionRequest,
    ) -> std::result::Result<ResolvedSubscription<'a>, Unresolved> {
        let rx_device = self.index.device(&request.rx_device_name).ok_or_else(|| {
            Unresolved::DeviceNotFound {
                side: Side::Rx,
                name: request.rx_device_name.clone(),
            }
        })?;

        let tx_device = self.index.device(&request.tx_device_name).ok_or_else(|| {
            Unresolved::DeviceNotFound {
                side: Side::Tx,
                name: request.tx_device_name.clone(),
            }
        })?;

        let rx_channel = self
            .index
            .rx_channel(&request.rx_device_name, &request.rx_channel_name)
            .ok_or_else(|| Unresolved::ChannelNotFound {
                side: Side::Rx,
                name: request.rx_channel_name.clone(),
                device: rx_device.name.clone(),
            })?;

        let tx_channel = self
            .index
            .tx_channel(&request.tx_device_name, &request.tx_channel_name)
            .ok_or_else(|| Unresolved::ChannelNotFound {
                side: Side::Tx,
                name: request.tx_channel_name.clone(),
                device: tx_device.name.clone(),
            })?;

        Ok(ResolvedSubscription {
            rx_device,
            rx_channel,
            tx_device,
            tx_channel,
        })
    }

    /// Resolve every request, preserving order
    pub fn resolve_all(
        &self,
        requests: &[SubscriptionRequest],
    ) -> Vec<std::result::Result<ResolvedSubscription<'a>, Unresolved>> {
        requests
            .iter()
            .map(|request| {
                let result = self.resolve(request);
                if let Err(ref reason) = result {
                    debug!(%request, %reason, "Unresolved subscription");
                }
                result
            })
            .collect()
    }
}
