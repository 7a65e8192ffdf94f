//! Runtime orchestration.
//!
//! [`FluxRuntime`] ties the pieces together: it loads configuration,
//! initializes logging, runs the extension load phase, freezes the
//! registry, and drives the engine until a shutdown signal arrives.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use flux_runtime::FluxRuntime;
//!
//! // Simplest way — auto-loads flux.toml from the default locations
//! let runtime = FluxRuntime::new();
//! runtime.run().await?;
//!
//! // Custom configuration path
//! let runtime = FluxRuntime::builder()
//!     .config_file("config/flux.toml")
//!     .build()?;
//! ```

use parking_lot::Mutex;
use tokio::signal;
use tracing::{info, warn};

use flux_core::{
    Adapter, BoxedAdapter, BoxedPlugin, Engine, EngineHandle, Plugin, RegistryBuilder,
};

use crate::config::{ConfigLoader, ConfigResult, FluxConfig, validate_config};
use crate::error::{RuntimeError, RuntimeResult};
use crate::loader::{self, ExtensionLoader, LoadReport, StaticLoader};
use crate::logging;

/// The main flux runtime.
///
/// Extensions come from two places, both feeding the same load-phase
/// registry: names listed in `[extensions]` are resolved through the
/// [`ExtensionLoader`], and values can be registered programmatically with
/// [`register_plugin`](FluxRuntime::register_plugin) /
/// [`register_adapter`](FluxRuntime::register_adapter) before the first
/// start.
pub struct FluxRuntime {
    /// The configuration.
    config: FluxConfig,
    /// Name-to-value resolver for configured extensions.
    loader: Box<dyn ExtensionLoader>,
    /// Load-phase registry; taken (and thereby frozen) by `start`.
    builder: Mutex<Option<RegistryBuilder>>,
}

impl FluxRuntime {
    /// Creates a runtime with automatic configuration loading.
    ///
    /// Searches the default locations for `flux.toml`; if nothing is found
    /// or loading fails, default settings are used.
    pub fn new() -> Self {
        let config = ConfigLoader::new().load().unwrap_or_else(|e| {
            eprintln!("warning: failed to load config ({e}), using defaults");
            FluxConfig::default()
        });
        Self::from_config(&config)
    }

    /// Creates a runtime builder for custom configuration.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a runtime from an already-loaded configuration.
    ///
    /// Initializes logging from the configuration (a no-op if logging was
    /// already initialized).
    pub fn from_config(config: &FluxConfig) -> Self {
        logging::init_from_config(&config.logging);

        info!(
            trigger = %config.engine.trigger,
            log_level = %config.logging.level,
            "runtime initialized from configuration"
        );

        Self {
            config: config.clone(),
            loader: Box::new(StaticLoader::collect()),
            builder: Mutex::new(Some(RegistryBuilder::new())),
        }
    }

    /// Replaces the extension loader (default: [`StaticLoader`]).
    pub fn with_loader(mut self, loader: impl ExtensionLoader + 'static) -> Self {
        self.loader = Box::new(loader);
        self
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &FluxConfig {
        &self.config
    }

    /// Registers an already-built plugin for the coming run phase.
    pub fn register_plugin(&self, plugin: BoxedPlugin) -> RuntimeResult<()> {
        let mut slot = self.builder.lock();
        let builder = slot.as_mut().ok_or(RuntimeError::AlreadyStarted)?;
        info!(plugin = %plugin.name(), "registered plugin");
        builder.insert_plugin(plugin);
        Ok(())
    }

    /// Registers an already-built adapter for the coming run phase.
    pub fn register_adapter(&self, adapter: BoxedAdapter) -> RuntimeResult<()> {
        let mut slot = self.builder.lock();
        let builder = slot.as_mut().ok_or(RuntimeError::AlreadyStarted)?;
        info!(adapter = %adapter.name(), "registered adapter");
        builder.insert_adapter(adapter);
        Ok(())
    }

    /// Runs the load phase and starts the engine.
    ///
    /// Configured extension names are resolved through the loader; failures
    /// are skipped and reported, not fatal. Startup aborts only when no
    /// adapter is available at the end of the load phase.
    pub async fn start(&self) -> RuntimeResult<EngineHandle> {
        validate_config(&self.config)?;

        let mut builder = self
            .builder
            .lock()
            .take()
            .ok_or(RuntimeError::AlreadyStarted)?;

        let report: LoadReport =
            loader::load_extensions(self.loader.as_ref(), &self.config.extensions, &mut builder);

        let registry = builder.build();
        if registry.adapter_count() == 0 {
            return Err(RuntimeError::NoAdapters);
        }

        if report.has_failures() {
            warn!("continuing with partially loaded extensions");
        }

        let engine = Engine::new(registry, self.config.engine.to_options());
        Ok(engine.start().await)
    }

    /// Runs until a shutdown signal (Ctrl+C or SIGTERM) is received.
    pub async fn run(&self) -> RuntimeResult<()> {
        let handle = self.start().await?;

        info!("flux is running; press Ctrl+C to stop");
        wait_for_shutdown().await;

        handle.shutdown().await;
        Ok(())
    }

    /// Runs until the given future resolves.
    ///
    /// Useful in tests and embeddings where signal handling belongs to the
    /// caller.
    pub async fn run_until<F>(&self, shutdown: F) -> RuntimeResult<()>
    where
        F: std::future::Future<Output = ()>,
    {
        let handle = self.start().await?;

        shutdown.await;

        handle.shutdown().await;
        Ok(())
    }
}

impl Default for FluxRuntime {
    fn default() -> Self {
        Self::new()
    }
}

/// Waits for shutdown signals (Ctrl+C or SIGTERM).
async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to register SIGTERM handler");

        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("received Ctrl+C, shutting down");
            }
            _ = sigterm.recv() => {
                info!("received SIGTERM, shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
        info!("received Ctrl+C, shutting down");
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for creating a [`FluxRuntime`] with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// let runtime = FluxRuntime::builder()
///     .config_file("config/flux.toml")
///     .build()?;
/// ```
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder.
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new(),
        }
    }

    /// Sets a specific configuration file to load.
    pub fn config_file<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    /// Enables loading environment variables (enabled by default).
    pub fn with_env(mut self) -> Self {
        self.config_loader = self.config_loader.with_env();
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges additional configuration programmatically.
    pub fn merge(mut self, config: FluxConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Builds the runtime.
    pub fn build(self) -> ConfigResult<FluxRuntime> {
        let config = self.config_loader.load()?;
        Ok(FluxRuntime::from_config(&config))
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use flux_core::{
        Adapter, AdapterResult, CmdManifest, EgressMessage, ManifestPlugin, RawIngressMessage,
    };
    use std::sync::Arc;
    use tokio::sync::mpsc;

    /// Adapter that connects to nothing: the sender is dropped immediately,
    /// which the engine treats as a clean disconnect.
    struct NullAdapter;

    #[async_trait]
    impl Adapter for NullAdapter {
        fn name(&self) -> &str {
            "null"
        }

        async fn listen(&self, _tx: mpsc::Sender<RawIngressMessage>) -> AdapterResult<()> {
            Ok(())
        }

        async fn send_message(&self, _message: EgressMessage) -> AdapterResult<()> {
            Ok(())
        }
    }

    fn quiet_runtime() -> FluxRuntime {
        // Leave env out so a developer's FLUX_* variables cannot leak in.
        let config = ConfigLoader::new().without_env().load().unwrap();
        FluxRuntime::from_config(&config)
    }

    #[tokio::test]
    async fn start_without_adapters_is_an_error() {
        let runtime = quiet_runtime();
        runtime
            .register_plugin(Arc::new(ManifestPlugin::new("lonely", CmdManifest::new())))
            .unwrap();

        assert!(matches!(
            runtime.start().await,
            Err(RuntimeError::NoAdapters)
        ));
    }

    #[tokio::test]
    async fn second_start_is_rejected() {
        let runtime = quiet_runtime();
        runtime.register_adapter(Arc::new(NullAdapter)).unwrap();

        let handle = runtime.start().await.unwrap();
        assert!(matches!(
            runtime.start().await,
            Err(RuntimeError::AlreadyStarted)
        ));
        assert!(matches!(
            runtime.register_adapter(Arc::new(NullAdapter)),
            Err(RuntimeError::AlreadyStarted)
        ));

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn run_until_starts_and_stops() {
        let runtime = quiet_runtime();
        runtime.register_adapter(Arc::new(NullAdapter)).unwrap();

        runtime.run_until(async {}).await.unwrap();
    }
}
