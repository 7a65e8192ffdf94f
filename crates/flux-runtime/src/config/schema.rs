//! Configuration schema definitions.

use std::path::PathBuf;

use flux_core::EngineOptions;
use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FluxConfig {
    /// Engine tunables.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Which extensions to load, by name.
    #[serde(default)]
    pub extensions: ExtensionsConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Engine tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Capacity of each of the three shared message buffers.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Capacity of each adapter's private inbound channel.
    #[serde(default = "default_adapter_channel_size")]
    pub adapter_channel_size: usize,

    /// The command trigger. Must be exactly one character; validated at
    /// startup.
    #[serde(default = "default_trigger")]
    pub trigger: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            buffer_size: default_buffer_size(),
            adapter_channel_size: default_adapter_channel_size(),
            trigger: default_trigger(),
        }
    }
}

impl EngineConfig {
    /// The trigger as a char. Falls back to `!` if the configured string is
    /// empty; [`validate_config`](super::validate_config) rejects that case
    /// before it can matter.
    pub fn trigger_char(&self) -> char {
        self.trigger.chars().next().unwrap_or('!')
    }

    /// Converts to core engine options.
    pub fn to_options(&self) -> EngineOptions {
        EngineOptions {
            buffer_size: self.buffer_size,
            adapter_channel_size: self.adapter_channel_size,
            trigger: self.trigger_char(),
        }
    }
}

fn default_buffer_size() -> usize {
    32
}

fn default_adapter_channel_size() -> usize {
    2
}

fn default_trigger() -> String {
    "!".to_string()
}

/// Which extensions to enable, by registered name.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExtensionsConfig {
    /// Plugin names resolved through the extension loader.
    #[serde(default)]
    pub plugins: Vec<String>,

    /// Adapter names resolved through the extension loader.
    #[serde(default)]
    pub adapters: Vec<String>,
}

// =============================================================================
// Logging
// =============================================================================

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoggingConfig {
    /// Base log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Output destination.
    #[serde(default)]
    pub output: LogOutput,

    /// Log file path, used when `output = "file"`.
    #[serde(default)]
    pub file_path: Option<PathBuf>,
}

/// Log verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
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
    /// The level as the lowercase string `tracing` filters expect.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
}

/// Log output destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}
