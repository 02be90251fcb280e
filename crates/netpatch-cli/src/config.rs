//! CLI configuration file
//!
//! Optional TOML file; command-line flags override every value in it.
//!
//! ```toml
//! inventory = "/etc/netpatch/inventory.toml"
//! discovery_timeout = 1.5
//! apply_timeout = 5.0
//! concurrency = 4
//! log_level = "info"
//! ```

use anyhow::{anyhow, Context, Result};
use netpatch_core::PipelineConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Default inventory file
    pub inventory: Option<PathBuf>,
    /// Snapshot acquisition timeout, seconds
    pub discovery_timeout: Option<f64>,
    /// Per-apply timeout, seconds
    pub apply_timeout: Option<f64>,
    /// Concurrent apply operations
    pub concurrency: Option<usize>,
    /// Log level used when neither RUST_LOG nor --log-level is given
    pub log_level: Option<String>,
    /// File the values were read from
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// Get the default config file path
pub fn default_config_file() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("netpatch")
        .join("config.toml")
}

impl FileConfig {
    /// Load `path`, or the default location when `None`.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (default_config_file(), false),
        };

        if !required && !path.exists() {
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config = Self::parse(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        config.source = Some(path);
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Effective log filter directive
    pub fn log_level(&self, flag: Option<&str>, verbose: bool) -> String {
        match flag {
            Some(level) => level.to_string(),
            None if verbose => "debug".to_string(),
            None => self.log_level.clone().unwrap_or_else(|| "info".to_string()),
        }
    }

    /// Effective inventory path; one must be configured somewhere
    pub fn inventory(&self, flag: Option<PathBuf>) -> Result<PathBuf> {
        flag.or_else(|| self.inventory.clone()).ok_or_else(|| {
            anyhow!("no inventory file given; pass --inventory or set `inventory` in the config file")
        })
    }

    /// Pipeline configuration with flag overrides applied
    pub fn pipeline_config(&self, overrides: &Overrides) -> Result<PipelineConfig> {
        let mut config = PipelineConfig {
            verbose: overrides.verbose,
            ..Default::default()
        };

        if let Some(secs) = overrides.discovery_timeout.or(self.discovery_timeout) {
            config.discovery_timeout = seconds("discovery timeout", secs)?;
        }
        if let Some(secs) = overrides.apply_timeout.or(self.apply_timeout) {
            config.apply_timeout = Some(seconds("apply timeout", secs)?);
        }
        if let Some(n) = overrides.concurrency.or(self.concurrency) {
            if n == 0 {
                return Err(anyhow!("concurrency must be at least 1"));
            }
            config.concurrency = n;
        }

        Ok(config)
    }
}

/// Values given on the command line
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub discovery_timeout: Option<f64>,
    pub apply_timeout: Option<f64>,
    pub concurrency: Option<usize>,
    pub verbose: bool,
}

/// Convert a positive number of seconds into a duration
pub fn seconds(what: &str, secs: f64) -> Result<Duration> {
    if !(secs > 0.0) {
        return Err(anyhow!("{} must be a positive number of seconds, got {}", what, secs));
    }
    Duration::try_from_secs_f64(secs).with_context(|| format!("{} out of range: {}", what, secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let config = FileConfig::parse(
            r#"
inventory = "net.toml"
discovery_timeout = 3
apply_timeout = 0.5
concurrency = 4
"#,
        )
        .unwrap();

        let pipeline = config.pipeline_config(&Overrides::default()).unwrap();
        assert_eq!(pipeline.discovery_timeout, Duration::from_secs(3));
        assert_eq!(pipeline.apply_timeout, Some(Duration::from_millis(500)));
        assert_eq!(pipeline.concurrency, 4);
        assert_eq!(config.inventory(None).unwrap(), PathBuf::from("net.toml"));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(FileConfig::parse("retries = 3").is_err());
    }

    #[test]
    fn test_flags_override_file() {
        let config = FileConfig::parse("concurrency = 4\ninventory = \"a.json\"").unwrap();
        let overrides = Overrides {
            concurrency: Some(2),
            verbose: true,
            ..Default::default()
        };

        let pipeline = config.pipeline_config(&overrides).unwrap();
        assert_eq!(pipeline.concurrency, 2);
        assert!(pipeline.verbose);
        assert_eq!(
            config.inventory(Some(PathBuf::from("b.json"))).unwrap(),
            PathBuf::from("b.json")
        );
    }

    #[test]
    fn test_defaults_without_file() {
        let config = FileConfig::default();
        let pipeline = config.pipeline_config(&Overrides::default()).unwrap();

        assert_eq!(pipeline.discovery_timeout, Duration::from_millis(1500));
        assert!(config.inventory(None).is_err());
        assert_eq!(config.log_level(None, false), "info");
        assert_eq!(config.log_level(None, true), "debug");
        assert_eq!(config.log_level(Some("warn"), true), "warn");
    }

    #[test]
    fn test_invalid_values() {
        let config = FileConfig::default();
        for overrides in [
            Overrides {
                concurrency: Some(0),
                ..Default::default()
            },
            Overrides {
                discovery_timeout: Some(-1.0),
                ..Default::default()
            },
            Overrides {
                apply_timeout: Some(f64::NAN),
                ..Default::default()
            },
        ] {
            assert!(config.pipeline_config(&overrides).is_err(), "{:?}", overrides);
        }
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FileConfig::load(Some(&dir.path().join("none.toml"))).is_err());
    }

    #[test]
    fn test_load_records_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "concurrency = 2").unwrap();

        let config = FileConfig::load(Some(&path)).unwrap();
        assert_eq!(config.concurrency, Some(2));
        assert_eq!(config.source.as_deref(), Some(path.as_path()));
        assert!(FileConfig::default().source.is_none());
    }
}
