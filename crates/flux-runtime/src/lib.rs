//! flux-runtime — orchestration layer for the flux chat-bot platform.
//!
//! This crate provides everything around the core engine:
//! - Configuration loading ([`config`]) — TOML + `FLUX_*` environment
//!   variables via figment
//! - Logging setup ([`logging`]) — configuration-driven tracing
//! - The extension loading boundary ([`loader`]) — compiled-in registration
//!   tables resolved through the [`ExtensionLoader`] trait
//! - Runtime orchestration ([`runtime`]) — load phase, engine start,
//!   signal-driven shutdown
//!
//! ```rust,ignore
//! use flux_runtime::FluxRuntime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Auto-loads flux.toml; extensions named in [extensions] are
//!     // resolved against the compiled-in registration tables.
//!     let runtime = FluxRuntime::new();
//!
//!     // Run until Ctrl+C / SIGTERM.
//!     runtime.run().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod loader;
pub mod logging;
pub mod runtime;

// Re-exports
pub use config::{
    ConfigError, ConfigLoader, ConfigResult, EngineConfig, ExtensionsConfig, FluxConfig,
    LoggingConfig,
};
pub use error::{RuntimeError, RuntimeResult};
pub use loader::{
    ADAPTER_FACTORIES, AdapterFactory, AdapterRegistration, ExtensionLoader, LoadError,
    LoadReport, LoadResult, PLUGIN_FACTORIES, PluginFactory, PluginRegistration, StaticLoader,
};
pub use logging::LoggingBuilder;
pub use runtime::{FluxRuntime, RuntimeBuilder};

// Re-export linkme so extension crates can use the registration tables
// without pinning their own copy.
pub use linkme;
