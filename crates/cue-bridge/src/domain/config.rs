//! Bridge configuration types.
//!
//! [`BridgeConfig`] is the single source of truth for all runtime settings.
//! `main.rs` builds it by merging the optional config file with CLI flags and
//! environment variables; everything below that point only ever sees this
//! struct, never a file or an environment variable.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use cue_core::OutputGroups;

/// WebSocket path of the stage display endpoint.
pub const DEFAULT_STAGE_PATH: &str = "/stagedisplay";

/// Local UDP port the OSC socket binds to.
pub const DEFAULT_OSC_LOCAL_PORT: u16 = 57121;

/// How often the supervising timer checks whether the connection is down.
pub const DEFAULT_RECONNECT_INTERVAL: Duration = Duration::from_secs(5);

/// All runtime configuration for the bridge.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Where the presentation tool's stage display listens.
    pub stage: StageDisplayConfig,
    /// Where OSC datagrams go, and where they come from.
    pub osc: OscConfig,
    /// The one or two address groups routed text is published to.
    pub groups: OutputGroups,
    pub delays: ScheduleDelays,
    /// Fixed polling interval of the reconnect supervisor.
    pub reconnect_interval: Duration,
    pub logging: LogToggles,
}

/// Stage display connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageDisplayConfig {
    pub host: String,
    pub port: u16,
    /// Stage display password; may be empty when the tool has none set.
    pub password: String,
    pub path: String,
}

impl StageDisplayConfig {
    /// The `ws://` URL to connect to.
    ///
    /// IPv6 literals are bracketed so the port separator stays unambiguous.
    pub fn url(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("ws://[{}]:{}{}", self.host, self.port, self.path)
        } else {
            format!("ws://{}:{}{}", self.host, self.port, self.path)
        }
    }
}

/// OSC output settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OscConfig {
    /// Host name or IP of the receiving application.
    pub host: String,
    pub port: u16,
    /// Local address the UDP socket binds to.
    pub local_bind: SocketAddr,
}

impl OscConfig {
    /// Binds every interface on [`DEFAULT_OSC_LOCAL_PORT`].
    pub fn default_local_bind() -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_OSC_LOCAL_PORT))
    }
}

/// Optional delays of the output scheduler.  A zero duration disables the
/// corresponding behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleDelays {
    /// Delay before the upcoming slide's text is pre-loaded into the group
    /// that was *not* selected.
    pub next_text: Duration,
    /// Delay before secondary trigger pulses when the primary text changed.
    pub secondary: Duration,
}

impl ScheduleDelays {
    pub fn from_millis(next_text_ms: u64, secondary_ms: u64) -> Self {
        Self {
            next_text: Duration::from_millis(next_text_ms),
            secondary: Duration::from_millis(secondary_ms),
        }
    }

    /// The next-text delay, if enabled.
    pub fn next_text(&self) -> Option<Duration> {
        positive(self.next_text)
    }

    /// The secondary trigger delay, if enabled.
    pub fn secondary(&self) -> Option<Duration> {
        positive(self.secondary)
    }
}

fn positive(d: Duration) -> Option<Duration> {
    (!d.is_zero()).then_some(d)
}

/// Debug logging switches, translated into `tracing` filter directives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogToggles {
    /// Debug output of both crates.
    pub debug: bool,
    /// Every decoded inbound stage display message.
    pub debug_rx: bool,
    /// Every outbound request and OSC datagram.
    pub debug_tx: bool,
}

/// Log target of inbound stage display traffic.
pub const RX_TARGET: &str = "cue_bridge::rx";
/// Log target of outbound traffic.
pub const TX_TARGET: &str = "cue_bridge::tx";

impl LogToggles {
    /// `EnvFilter` directives to add on top of the base `info` level.
    ///
    /// Targets match by prefix, so `cue_bridge=debug` would also open the
    /// traffic targets; each one stays at `info` unless its own toggle is set.
    pub fn filter_directives(&self) -> Vec<String> {
        let mut directives = Vec::new();
        if self.debug {
            directives.push("cue_bridge=debug".to_string());
            directives.push("cue_core=debug".to_string());
        }
        for (target, on) in [(RX_TARGET, self.debug_rx), (TX_TARGET, self.debug_tx)] {
            if on {
                directives.push(format!("{target}=debug"));
            } else if self.debug {
                directives.push(format!("{target}=info"));
            }
        }
        directives
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn stage(host: &str) -> StageDisplayConfig {
        StageDisplayConfig {
            host: host.to_string(),
            port: 50001,
            password: String::new(),
            path: DEFAULT_STAGE_PATH.to_string(),
        }
    }

    #[test]
    fn test_stage_url_for_hostname() {
        assert_eq!(stage("mac-mini.local").url(), "ws://mac-mini.local:50001/stagedisplay");
    }

    #[test]
    fn test_stage_url_brackets_ipv6_literal() {
        assert_eq!(stage("::1").url(), "ws://[::1]:50001/stagedisplay");
    }

    #[test]
    fn test_default_local_bind_is_all_interfaces_on_57121() {
        let bind = OscConfig::default_local_bind();
        assert_eq!(bind.port(), 57121);
        assert!(bind.ip().is_unspecified());
    }

    #[test]
    fn test_default_reconnect_interval_is_5s() {
        assert_eq!(DEFAULT_RECONNECT_INTERVAL, Duration::from_secs(5));
    }

    #[test]
    fn test_zero_delays_are_disabled() {
        let delays = ScheduleDelays::default();
        assert_eq!(delays.next_text(), None);
        assert_eq!(delays.secondary(), None);
    }

    #[test]
    fn test_positive_delays_are_enabled() {
        let delays = ScheduleDelays::from_millis(500, 40);
        assert_eq!(delays.next_text(), Some(Duration::from_millis(500)));
        assert_eq!(delays.secondary(), Some(Duration::from_millis(40)));
    }

    #[test]
    fn test_no_toggles_add_no_directives() {
        assert!(LogToggles::default().filter_directives().is_empty());
    }

    #[test]
    fn test_rx_and_tx_toggles_add_their_targets() {
        let toggles = LogToggles {
            debug: false,
            debug_rx: true,
            debug_tx: true,
        };
        assert_eq!(
            toggles.filter_directives(),
            vec!["cue_bridge::rx=debug".to_string(), "cue_bridge::tx=debug".to_string()]
        );
    }

    #[test]
    fn test_debug_toggle_covers_both_crates() {
        let toggles = LogToggles {
            debug: true,
            ..LogToggles::default()
        };
        let directives = toggles.filter_directives();
        assert!(directives.contains(&"cue_bridge=debug".to_string()));
        assert!(directives.contains(&"cue_core=debug".to_string()));
    }

    #[test]
    fn test_debug_toggle_alone_keeps_traffic_targets_quiet() {
        // Arrange
        let toggles = LogToggles {
            debug: true,
            ..LogToggles::default()
        };

        // Act
        let directives = toggles.filter_directives();

        // Assert
        assert!(directives.contains(&"cue_bridge::rx=info".to_string()));
        assert!(directives.contains(&"cue_bridge::tx=info".to_string()));
        assert!(!directives.iter().any(|d| d.ends_with("::rx=debug") || d.ends_with("::tx=debug")));
    }

    #[test]
    fn test_debug_with_one_traffic_toggle_opens_only_that_target() {
        let toggles = LogToggles {
            debug: true,
            debug_rx: true,
            debug_tx: false,
        };

        let directives = toggles.filter_directives();

        assert!(directives.contains(&"cue_bridge::rx=debug".to_string()));
        assert!(directives.contains(&"cue_bridge::tx=info".to_string()));
        assert!(!directives.contains(&"cue_bridge::rx=info".to_string()));
    }
}
