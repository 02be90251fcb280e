//! TOML and JSON subscription lists
//!
//! ```toml
//! [[subscription]]
//! rx_device = "Mixer"
//! rx_channel = "In 1"
//! tx_device = "Stage"
//! tx_channel = "Vocal"
//! ```
//!
//! JSON uses the same shape: `{"subscription": [{...}, ...]}`.

use netpatch_core::SubscriptionRequest;
use serde::Deserialize;

use crate::{PresetError, Result};

#[derive(Debug, Deserialize)]
struct RecordDocument {
    #[serde(default, alias = "subscriptions")]
    subscription: Vec<Record>,
}

/// Every field is required; serde rejects records missing one
#[derive(Debug, Deserialize)]
struct Record {
    rx_device: String,
    rx_channel: String,
    tx_device: String,
    tx_channel: String,
}

impl Record {
    fn into_request(self, index: usize) -> Result<SubscriptionRequest> {
        let fields = [
            ("rx_device", &self.rx_device),
            ("rx_channel", &self.rx_channel),
            ("tx_device", &self.tx_device),
            ("tx_channel", &self.tx_channel),
        ];
        if let Some(&(field, _)) = fields.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(PresetError::EmptyField { index, field });
        }

        Ok(SubscriptionRequest::new(
            self.rx_device,
            self.rx_channel,
            self.tx_device,
            self.tx_channel,
        ))
    }
}

fn into_requests(document: RecordDocument) -> Result<Vec<SubscriptionRequest>> {
    document
        .subscription
        .into_iter()
        .enumerate()
        .map(|(i, record)| record.into_request(i + 1))
        .collect()
}

pub fn parse_toml(text: &str) -> Result<Vec<SubscriptionRequest>> {
    let document: RecordDocument =
        toml::from_str(text).map_err(|e| PresetError::Toml(e.to_string()))?;
    into_requests(document)
}

pub fn parse_json(text: &str) -> Result<Vec<SubscriptionRequest>> {
    let document: RecordDocument =
        serde_json::from_str(text).map_err(|e| PresetError::Json(e.to_string()))?;
    into_requests(document)
}
