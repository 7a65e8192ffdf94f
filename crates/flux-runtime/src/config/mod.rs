//! Configuration module for the flux runtime.
//!
//! TOML-based configuration loading (figment: defaults → file → `FLUX_*`
//! environment variables) plus validation of the engine and logging
//! settings.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, load_config, load_config_from_file};
pub use schema::{
    EngineConfig, ExtensionsConfig, FluxConfig, LogFormat, LogLevel, LogOutput, LoggingConfig,
};
pub use validation::validate_config;
