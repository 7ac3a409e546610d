//! Config file loading and merging.
//!
//! The bridge reads an optional config file, overlays the command-line flags
//! (which clap already merged with `CUE_*` environment variables) and
//! validates the result into a [`BridgeConfig`].
//!
//! # File formats
//!
//! TOML is the native format:
//!
//! ```toml
//! host = "192.168.1.20"
//! port = 50001
//! password = "stage"
//! osc_host = "192.168.1.30"
//! osc_port = 7000
//! group_a = ["/composition/layers/3/clips/1/video/source/blocktextgenerator/text/params/lines", "/composition/layers/3/clips/1/connect"]
//! group_b = ["/composition/layers/4/clips/1/video/source/blocktextgenerator/text/params/lines"]
//! next_text_delay_ms = 500
//! ```
//!
//! A file ending in `.json` is read as JSON.  The camelCase keys of older
//! `config.json` files (`resolumeIp`, `resolumeAddresses`, `delayedUpdate`,
//! `delyedSecondary`, ...) are accepted as aliases, so such a file loads
//! unchanged.
//!
//! Every field is optional here; required values are checked after merging
//! in [`FileConfig::into_bridge_config`].

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use cue_core::{AddressError, AddressGroup, OutputGroups};
use serde::Deserialize;
use thiserror::Error;

use crate::domain::config::{
    BridgeConfig, LogToggles, OscConfig, ScheduleDelays, StageDisplayConfig,
    DEFAULT_RECONNECT_INTERVAL, DEFAULT_STAGE_PATH,
};

/// Error type for loading and validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("I/O error reading config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// The JSON content could not be parsed.
    #[error("failed to parse config JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A required setting is absent from both the file and the command line.
    #[error("missing required setting `{0}`")]
    Missing(&'static str),

    /// An address group failed validation.
    #[error("invalid {group}: {source}")]
    InvalidGroup {
        group: &'static str,
        #[source]
        source: AddressError,
    },

    /// The local OSC bind address is not `ip:port`.
    #[error("invalid OSC bind address {0:?}")]
    InvalidBind(String),
}

/// Settings as they appear in a config file or on the command line.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub password: Option<String>,
    pub path: Option<String>,

    #[serde(alias = "resolumeIp")]
    pub osc_host: Option<String>,
    #[serde(alias = "resolumePort")]
    pub osc_port: Option<u16>,
    /// Local `ip:port` of the OSC socket.
    pub osc_bind: Option<String>,

    #[serde(alias = "resolumeAddresses")]
    pub group_a: Option<Vec<String>>,
    #[serde(alias = "resolumeAddresses2")]
    pub group_b: Option<Vec<String>>,

    #[serde(alias = "delayedUpdate")]
    pub next_text_delay_ms: Option<u64>,
    #[serde(alias = "delyedSecondary", alias = "delayedSecondary")]
    pub secondary_delay_ms: Option<u64>,
    pub reconnect_secs: Option<u64>,

    pub debug: Option<bool>,
    #[serde(alias = "debugRx")]
    pub debug_rx: Option<bool>,
    #[serde(alias = "debugTx")]
    pub debug_tx: Option<bool>,
}

/// Loads a config file, choosing the format from the extension.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read, or
/// [`ConfigError::Toml`] / [`ConfigError::Json`] if it is malformed.
pub fn load_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        Ok(serde_json::from_str(&content)?)
    } else {
        Ok(toml::from_str(&content)?)
    }
}

impl FileConfig {
    /// Returns `self` with every value set in `overrides` replaced.
    pub fn merge(self, overrides: FileConfig) -> FileConfig {
        FileConfig {
            host: overrides.host.or(self.host),
            port: overrides.port.or(self.port),
            password: overrides.password.or(self.password),
            path: overrides.path.or(self.path),
            osc_host: overrides.osc_host.or(self.osc_host),
            osc_port: overrides.osc_port.or(self.osc_port),
            osc_bind: overrides.osc_bind.or(self.osc_bind),
            group_a: overrides.group_a.or(self.group_a),
            group_b: overrides.group_b.or(self.group_b),
            next_text_delay_ms: overrides.next_text_delay_ms.or(self.next_text_delay_ms),
            secondary_delay_ms: overrides.secondary_delay_ms.or(self.secondary_delay_ms),
            reconnect_secs: overrides.reconnect_secs.or(self.reconnect_secs),
            debug: overrides.debug.or(self.debug),
            debug_rx: overrides.debug_rx.or(self.debug_rx),
            debug_tx: overrides.debug_tx.or(self.debug_tx),
        }
    }

    /// Validates the merged settings and applies defaults.
    ///
    /// An empty `group_b` is the same as no `group_b`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Missing`] for an absent required setting (an empty
    /// `group_a` counts as absent), [`ConfigError::InvalidGroup`] for an
    /// address not starting with `/`, [`ConfigError::InvalidBind`] for an
    /// unparsable bind address.
    pub fn into_bridge_config(self) -> Result<BridgeConfig, ConfigError> {
        let host = self.host.ok_or(ConfigError::Missing("host"))?;
        let port = self.port.ok_or(ConfigError::Missing("port"))?;
        let osc_host = self.osc_host.ok_or(ConfigError::Missing("osc_host"))?;
        let osc_port = self.osc_port.ok_or(ConfigError::Missing("osc_port"))?;

        let group_a = self
            .group_a
            .filter(|g| !g.is_empty())
            .ok_or(ConfigError::Missing("group_a"))?;
        let group_a = AddressGroup::new(group_a).map_err(|source| ConfigError::InvalidGroup {
            group: "group_a",
            source,
        })?;
        let groups = match self.group_b.filter(|g| !g.is_empty()) {
            Some(b) => {
                let group_b = AddressGroup::new(b).map_err(|source| ConfigError::InvalidGroup {
                    group: "group_b",
                    source,
                })?;
                OutputGroups::alternating(group_a, group_b)
            }
            None => OutputGroups::single(group_a),
        };

        let local_bind = match self.osc_bind {
            Some(bind) => bind
                .parse::<SocketAddr>()
                .map_err(|_| ConfigError::InvalidBind(bind))?,
            None => OscConfig::default_local_bind(),
        };

        Ok(BridgeConfig {
            stage: StageDisplayConfig {
                host,
                port,
                password: self.password.unwrap_or_default(),
                path: self.path.unwrap_or_else(|| DEFAULT_STAGE_PATH.to_string()),
            },
            osc: OscConfig {
                host: osc_host,
                port: osc_port,
                local_bind,
            },
            groups,
            delays: ScheduleDelays::from_millis(
                self.next_text_delay_ms.unwrap_or(0),
                self.secondary_delay_ms.unwrap_or(0),
            ),
            reconnect_interval: self
                .reconnect_secs
                .filter(|s| *s > 0)
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_RECONNECT_INTERVAL),
            logging: LogToggles {
                debug: self.debug.unwrap_or(false),
                debug_rx: self.debug_rx.unwrap_or(false),
                debug_tx: self.debug_tx.unwrap_or(false),
            },
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use cue_core::GroupSlot;

    fn minimal() -> FileConfig {
        FileConfig {
            host: Some("10.0.0.5".to_string()),
            port: Some(50001),
            osc_host: Some("10.0.0.6".to_string()),
            osc_port: Some(7000),
            group_a: Some(vec!["/a/1".to_string()]),
            ..FileConfig::default()
        }
    }

    fn write_temp(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("cue-bridge-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    // ── Parsing ───────────────────────────────────────────────────────────────

    #[test]
    fn test_toml_file_parses_native_keys() {
        // Arrange
        let path = write_temp(
            "native.toml",
            r#"
host = "stage.local"
port = 50001
osc_host = "127.0.0.1"
osc_port = 7000
group_a = ["/a/1", "/a/2"]
next_text_delay_ms = 500
debug_tx = true
"#,
        );

        // Act
        let cfg = load_file_config(&path).unwrap();

        // Assert
        assert_eq!(cfg.host.as_deref(), Some("stage.local"));
        assert_eq!(cfg.group_a, Some(vec!["/a/1".to_string(), "/a/2".to_string()]));
        assert_eq!(cfg.next_text_delay_ms, Some(500));
        assert_eq!(cfg.debug_tx, Some(true));
        assert_eq!(cfg.group_b, None);
    }

    #[test]
    fn test_legacy_json_file_loads_with_camel_case_keys() {
        // Arrange
        let path = write_temp(
            "config.json",
            r#"{
                "host": "192.168.1.20",
                "port": 50001,
                "password": "stage",
                "resolumeIp": "192.168.1.30",
                "resolumePort": 7000,
                "resolumeAddresses": ["/a/1", "/a/2"],
                "resolumeAddresses2": ["/b/1"],
                "delayedUpdate": 500,
                "delyedSecondary": 40,
                "debug": false,
                "debugRx": true,
                "debugTx": false
            }"#,
        );

        // Act
        let cfg = load_file_config(&path).unwrap().into_bridge_config().unwrap();

        // Assert
        assert_eq!(cfg.stage.url(), "ws://192.168.1.20:50001/stagedisplay");
        assert_eq!(cfg.stage.password, "stage");
        assert_eq!(cfg.osc.host, "192.168.1.30");
        assert_eq!(cfg.osc.port, 7000);
        assert!(cfg.groups.is_alternating());
        assert_eq!(cfg.groups.resolve(GroupSlot::B).primary(), "/b/1");
        assert_eq!(cfg.delays, ScheduleDelays::from_millis(500, 40));
        assert!(cfg.logging.debug_rx);
        assert!(!cfg.logging.debug_tx);
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let path = write_temp("broken.toml", "host = ");
        assert!(matches!(load_file_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = load_file_config(Path::new("/definitely/not/here/cue.toml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    // ── Merging ───────────────────────────────────────────────────────────────

    #[test]
    fn test_merge_prefers_override_values() {
        // Arrange
        let file = FileConfig {
            port: Some(1),
            password: Some("file".to_string()),
            ..minimal()
        };
        let cli = FileConfig {
            port: Some(2),
            ..FileConfig::default()
        };

        // Act
        let merged = file.merge(cli);

        // Assert
        assert_eq!(merged.port, Some(2));
        assert_eq!(merged.password.as_deref(), Some("file"));
        assert_eq!(merged.host.as_deref(), Some("10.0.0.5"));
    }

    // ── Validation ────────────────────────────────────────────────────────────

    #[test]
    fn test_minimal_config_gets_defaults() {
        let cfg = minimal().into_bridge_config().unwrap();
        assert_eq!(cfg.stage.path, "/stagedisplay");
        assert_eq!(cfg.stage.password, "");
        assert_eq!(cfg.osc.local_bind, OscConfig::default_local_bind());
        assert_eq!(cfg.reconnect_interval, Duration::from_secs(5));
        assert_eq!(cfg.delays, ScheduleDelays::default());
        assert!(!cfg.groups.is_alternating());
        assert_eq!(cfg.logging, LogToggles::default());
    }

    #[test]
    fn test_missing_required_values_are_reported_by_name() {
        for (field, cfg) in [
            ("host", FileConfig { host: None, ..minimal() }),
            ("port", FileConfig { port: None, ..minimal() }),
            ("osc_host", FileConfig { osc_host: None, ..minimal() }),
            ("osc_port", FileConfig { osc_port: None, ..minimal() }),
            ("group_a", FileConfig { group_a: None, ..minimal() }),
            ("group_a", FileConfig { group_a: Some(vec![]), ..minimal() }),
        ] {
            let err = cfg.into_bridge_config().unwrap_err();
            assert!(matches!(err, ConfigError::Missing(name) if name == field));
        }
    }

    #[test]
    fn test_empty_group_b_means_single_group() {
        let cfg = FileConfig {
            group_b: Some(vec![]),
            ..minimal()
        }
        .into_bridge_config()
        .unwrap();
        assert!(!cfg.groups.is_alternating());
    }

    #[test]
    fn test_address_without_slash_is_invalid_group() {
        let err = FileConfig {
            group_b: Some(vec!["layer".to_string()]),
            ..minimal()
        }
        .into_bridge_config()
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidGroup { group: "group_b", .. }));
    }

    #[test]
    fn test_bad_bind_address_is_rejected() {
        let err = FileConfig {
            osc_bind: Some("not-an-address".to_string()),
            ..minimal()
        }
        .into_bridge_config()
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBind(_)));
    }

    #[test]
    fn test_custom_bind_and_reconnect_interval_apply() {
        let cfg = FileConfig {
            osc_bind: Some("127.0.0.1:0".to_string()),
            reconnect_secs: Some(2),
            ..minimal()
        }
        .into_bridge_config()
        .unwrap();
        assert_eq!(cfg.osc.local_bind, "127.0.0.1:0".parse().unwrap());
        assert_eq!(cfg.reconnect_interval, Duration::from_secs(2));
    }
}
