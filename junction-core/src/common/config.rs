/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

use std::path::Path;
use std::time::Duration;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::message::IdStrategy;

/// Configuration for the Junction messaging core.
///
/// Loaded from TOML files in XDG-compliant directories. Every section falls back to
/// its defaults, so a partial file only overrides the keys it names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JunctionConfig {
    /// Message identity configuration
    pub ids: IdConfig,
    /// Event broker configuration
    pub events: EventConfig,
    /// Entry filter configuration
    pub filters: FilterConfig,
    /// Tracing and logging configuration
    pub tracing: TracingConfig,
}

/// Message identity configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdConfig {
    /// Strategy used by the process-wide default id generator
    pub strategy: IdStrategy,
    /// Prefix prepended to ids produced by the sequential strategy
    pub sequential_prefix: String,
}

/// Event broker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    /// Bounded queue size per subscriber; events beyond it are dropped for that subscriber
    pub subscriber_queue_capacity: usize,
    /// How long `EventBroker::shutdown` waits for subscriber tasks to drain
    pub shutdown_timeout_ms: u64,
}

/// Entry filter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Separator used by the Ant path matcher
    pub path_separator: String,
    /// Whether pattern matching is case sensitive
    pub case_sensitive: bool,
    /// Whether pattern and path tokens are trimmed of whitespace
    pub trim_tokens: bool,
    /// Number of tokenized patterns cached before the cache is switched off
    pub pattern_cache_limit: usize,
    /// Default capacity of accept-once filters; `0` means unbounded
    pub accept_once_capacity: usize,
}

/// Tracing and logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TracingConfig {
    /// Filter directive used when `RUST_LOG` is not set
    pub level: String,
    /// Directory for log files
    pub log_directory: String,
    /// Log file name inside `log_directory`
    pub log_file: String,
}

impl Default for IdConfig {
    fn default() -> Self {
        Self {
            strategy: IdStrategy::Uuid,
            sequential_prefix: String::new(),
        }
    }
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            subscriber_queue_capacity: 256,
            shutdown_timeout_ms: 5_000,
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            path_separator: "/".to_string(),
            case_sensitive: true,
            trim_tokens: false,
            pattern_cache_limit: 65_536,
            accept_once_capacity: 0,
        }
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_directory: "~/.local/share/junction/logs".to_string(),
            log_file: "junction.log".to_string(),
        }
    }
}

impl EventConfig {
    /// Convert the shutdown timeout to a `Duration`
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}

impl JunctionConfig {
    /// Parse a configuration from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns the TOML error when the document is malformed or a value has the wrong type.
    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    /// Load configuration from an explicit file, falling back to defaults on any failure.
    pub fn load_from(path: &Path) -> Self {
        info!("Loading configuration from: {}", path.display());
        match std::fs::read_to_string(path) {
            Ok(config_str) => match Self::from_toml_str(&config_str) {
                Ok(config) => {
                    info!("Successfully loaded configuration");
                    config
                }
                Err(e) => {
                    error!("Failed to parse configuration file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                error!("Failed to read configuration file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Load configuration from XDG-compliant locations
    ///
    /// Looks for `junction/config.toml` under `$XDG_CONFIG_HOME` and then the XDG
    /// fallback directories. A missing file yields the defaults; a malformed one is
    /// logged and also yields the defaults.
    pub fn load() -> Self {
        let xdg_dirs = match xdg::BaseDirectories::with_prefix("junction") {
            Ok(dirs) => dirs,
            Err(e) => {
                error!("Failed to initialize XDG directories: {}", e);
                return Self::default();
            }
        };

        match xdg_dirs.find_config_file("config.toml") {
            Some(path) => Self::load_from(&path),
            None => {
                info!("No configuration file found, using defaults");
                Self::default()
            }
        }
    }
}

lazy_static! {
    /// Global configuration instance loaded from XDG-compliant locations
    pub static ref CONFIG: JunctionConfig = JunctionConfig::load();
}
