//! netpatch Preset
//!
//! Turns declarative preset documents into ordered
//! [`SubscriptionRequest`]s:
//! - Controller XML presets ([`xml`])
//! - TOML and JSON subscription lists ([`records`])
//!
//! Malformed documents and incomplete records are rejected as a whole.

pub mod error;
pub mod records;
pub mod xml;

pub use error::{PresetError, Result};
pub use records::{parse_json, parse_toml};
pub use xml::parse_xml;

use netpatch_core::SubscriptionRequest;
use std::path::Path;
use tracing::info;

/// Preset document encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetFormat {
    Xml,
    Toml,
    Json,
}

impl PresetFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("xml") => Ok(Self::Xml),
            Some("toml") => Ok(Self::Toml),
            Some("json") => Ok(Self::Json),
            _ => Err(PresetError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

impl std::str::FromStr for PresetFormat {
    type Err = PresetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "xml" => Ok(Self::Xml),
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            other => Err(PresetError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Parse a preset document of a known format
pub fn parse_preset(text: &str, format: PresetFormat) -> Result<Vec<SubscriptionRequest>> {
    match format {
        PresetFormat::Xml => parse_xml(text),
        PresetFormat::Toml => parse_toml(text),
        PresetFormat::Json => parse_json(text),
    }
}

/// Read and parse a preset file.
///
/// The format comes from `format`, or from the file extension when `None`.
pub async fn load_preset(
    path: &Path,
    format: Option<PresetFormat>,
) -> Result<Vec<SubscriptionRequest>> {
    let format = match format {
        Some(format) => format,
        None => PresetFormat::from_path(path)?,
    };

    let text = tokio::fs::read_to_string(path).await?;
    let requests = parse_preset(&text, format)?;
    info!(
        "Found {} subscription(s) in {}",
        requests.len(),
        path.display()
    );
    Ok(requests)
}
