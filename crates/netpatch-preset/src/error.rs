//! Preset error types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PresetError>;

/// Rejected preset input. Nothing from a rejected document reaches the
/// pipeline.
#[derive(Error, Debug)]
pub enum PresetError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse XML preset: {0}")]
    Xml(String),

    #[error("failed to parse TOML preset: {0}")]
    Toml(String),

    #[error("failed to parse JSON preset: {0}")]
    Json(String),

    #[error("unsupported preset format: {0}")]
    UnsupportedFormat(String),

    /// A `<device>` without a `<name>` that has subscribed channels
    #[error("device #{index} has no name")]
    UnnamedDevice { index: usize },

    /// A subscribed `<rxchannel>` without a `<name>`
    #[error("subscribed receive channel #{index} on {device} has no name")]
    UnnamedChannel { device: String, index: usize },

    /// A record field that is present but blank
    #[error("subscription #{index}: field '{field}' is empty")]
    EmptyField { index: usize, field: &'static str },
}
