//! TOML configuration for prompter frontends.
//!
//! Every field has a default, so a missing file, a missing table or a missing key all
//! fall back to working values. Example:
//!
//! ```toml
//! [parser]
//! default_duration_secs = 45
//! bullet_markers = ["- ", "• ", "* "]
//!
//! [playback]
//! tick_interval_ms = 100
//! auto_advance = true
//!
//! [logging]
//! log_level = "debug"
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::Result;
use crate::cache::DEFAULT_CACHE_DIR;
use crate::opts::{DEFAULT_DURATION_SECS, Opts};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PrompterConfig {
    #[serde(default)]
    pub parser: ParserConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ParserConfig {
    #[serde(default = "default_duration_secs")]
    pub default_duration_secs: u32,
    #[serde(default = "default_header_marker")]
    pub header_marker: String,
    #[serde(default = "default_bullet_markers")]
    pub bullet_markers: Vec<String>,
    #[serde(default = "default_heading_marker")]
    pub heading_marker: String,
    #[serde(default = "default_callout_prefix")]
    pub callout_prefix: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            default_duration_secs: default_duration_secs(),
            header_marker: default_header_marker(),
            bullet_markers: default_bullet_markers(),
            heading_marker: default_heading_marker(),
            callout_prefix: default_callout_prefix(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlaybackConfig {
    /// Period of the tick source driving the controller.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Move to the next segment and keep running when one completes.
    #[serde(default)]
    pub auto_advance: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        PlaybackConfig {
            tick_interval_ms: default_tick_interval_ms(),
            auto_advance: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_cache_dir")]
    pub dir: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            enabled: false,
            dir: default_cache_dir(),
        }
    }
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_filter_str())
    }
}

impl PrompterConfig {
    /// Parser options described by the `[parser]` table.
    pub fn opts(&self) -> Opts {
        Opts::default()
            .with_default_duration(self.parser.default_duration_secs)
            .with_header_marker(self.parser.header_marker.clone())
            .with_bullet_markers(self.parser.bullet_markers.clone())
            .with_heading_marker(self.parser.heading_marker.clone())
            .with_callout_prefix(self.parser.callout_prefix.clone())
    }

    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.playback.tick_interval_ms.max(1))
    }
}

pub fn parse_config(contents: &str) -> Result<PrompterConfig> {
    Ok(toml::from_str(contents)?)
}

pub fn serialize_config(config: &PrompterConfig) -> Result<String> {
    toml::to_string(config).map_err(|err| crate::Error::msg(format!("{err}")))
}

/// Load configuration from `path`, falling back to defaults when the file is missing or
/// invalid.
pub fn load_config(path: &Path) -> PrompterConfig {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "no config file; using defaults");
            return PrompterConfig::default();
        }
    };

    match parse_config(&contents) {
        Ok(config) => {
            info!(path = %path.display(), "loaded config");
            config
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "invalid config; using defaults");
            PrompterConfig::default()
        }
    }
}

fn default_duration_secs() -> u32 {
    DEFAULT_DURATION_SECS
}

fn default_header_marker() -> String {
    "## ".to_owned()
}

fn default_bullet_markers() -> Vec<String> {
    vec!["- ".to_owned(), "• ".to_owned()]
}

fn default_heading_marker() -> String {
    "### ".to_owned()
}

fn default_callout_prefix() -> String {
    "**Query".to_owned()
}

fn default_tick_interval_ms() -> u64 {
    100
}

fn default_cache_dir() -> String {
    DEFAULT_CACHE_DIR.to_owned()
}
