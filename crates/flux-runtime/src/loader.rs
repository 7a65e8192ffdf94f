//! Extension loading boundary.
//!
//! The engine consumes plugin and adapter *values*; this module owns the
//! question of where those values come from. The [`ExtensionLoader`] trait
//! is the boundary: given a configured name, produce the extension or a
//! [`LoadError`].
//!
//! The built-in realization is [`StaticLoader`]: compiled-in registration
//! tables built from linkme distributed slices. Any crate linked into the
//! binary can contribute an entry:
//!
//! ```rust,ignore
//! use flux_runtime::loader::{PLUGIN_FACTORIES, PluginRegistration};
//! use linkme::distributed_slice;
//!
//! #[distributed_slice(PLUGIN_FACTORIES)]
//! static PING: PluginRegistration = PluginRegistration {
//!     name: "ping",
//!     factory: ping_plugin,
//! };
//! ```
//!
//! The load phase itself is isolating: a bad extension is skipped and
//! recorded in the [`LoadReport`], never aborting the extensions after it.

use std::collections::HashMap;

use linkme::distributed_slice;
use thiserror::Error;
use tracing::{error, info, warn};

use flux_core::{BoxedAdapter, BoxedPlugin, RegistryBuilder};

use crate::config::ExtensionsConfig;

// =============================================================================
// Errors
// =============================================================================

/// Errors that can occur while loading an extension.
#[derive(Debug, Error)]
pub enum LoadError {
    /// No plugin is registered under the requested name.
    #[error("unknown plugin '{0}'")]
    UnknownPlugin(String),

    /// No adapter is registered under the requested name.
    #[error("unknown adapter '{0}'")]
    UnknownAdapter(String),

    /// A command pattern failed to compile.
    #[error("invalid command pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// The extension failed to initialize.
    #[error("extension failed to initialize: {0}")]
    Init(String),
}

/// Result type for extension loading.
pub type LoadResult<T> = Result<T, LoadError>;

// =============================================================================
// Registration Tables (linkme distributed slices)
// =============================================================================

/// Factory producing a plugin value.
pub type PluginFactory = fn() -> LoadResult<BoxedPlugin>;

/// Factory producing an adapter value.
pub type AdapterFactory = fn() -> LoadResult<BoxedAdapter>;

/// A named plugin factory entry in the compiled-in registration table.
pub struct PluginRegistration {
    /// Name the factory is resolved under.
    pub name: &'static str,
    /// The factory itself.
    pub factory: PluginFactory,
}

/// A named adapter factory entry in the compiled-in registration table.
pub struct AdapterRegistration {
    /// Name the factory is resolved under.
    pub name: &'static str,
    /// The factory itself.
    pub factory: AdapterFactory,
}

/// Registry of compiled-in plugin factories.
/// Each crate that provides a plugin contributes one entry.
#[distributed_slice]
pub static PLUGIN_FACTORIES: [PluginRegistration];

/// Registry of compiled-in adapter factories.
#[distributed_slice]
pub static ADAPTER_FACTORIES: [AdapterRegistration];

// =============================================================================
// Loader Boundary
// =============================================================================

/// Resolves configured extension names to concrete values.
pub trait ExtensionLoader: Send + Sync {
    /// Loads the plugin registered under `name`.
    fn load_plugin(&self, name: &str) -> LoadResult<BoxedPlugin>;

    /// Loads the adapter registered under `name`.
    fn load_adapter(&self, name: &str) -> LoadResult<BoxedAdapter>;
}

/// Loader over the compiled-in registration tables.
pub struct StaticLoader {
    plugins: HashMap<&'static str, PluginFactory>,
    adapters: HashMap<&'static str, AdapterFactory>,
}

impl StaticLoader {
    /// Collects every compiled-in registration.
    ///
    /// If two crates register the same name, a warning is emitted and the
    /// first entry wins.
    pub fn collect() -> Self {
        let mut plugins = HashMap::new();
        for registration in PLUGIN_FACTORIES {
            if plugins.contains_key(registration.name) {
                warn!(plugin = registration.name, "duplicate plugin registration, keeping first");
                continue;
            }
            plugins.insert(registration.name, registration.factory);
        }

        let mut adapters = HashMap::new();
        for registration in ADAPTER_FACTORIES {
            if adapters.contains_key(registration.name) {
                warn!(adapter = registration.name, "duplicate adapter registration, keeping first");
                continue;
            }
            adapters.insert(registration.name, registration.factory);
        }

        Self { plugins, adapters }
    }

    /// Names of all registered plugin factories.
    pub fn plugin_names(&self) -> Vec<&'static str> {
        self.plugins.keys().copied().collect()
    }

    /// Names of all registered adapter factories.
    pub fn adapter_names(&self) -> Vec<&'static str> {
        self.adapters.keys().copied().collect()
    }
}

impl Default for StaticLoader {
    fn default() -> Self {
        Self::collect()
    }
}

impl ExtensionLoader for StaticLoader {
    fn load_plugin(&self, name: &str) -> LoadResult<BoxedPlugin> {
        let factory = self
            .plugins
            .get(name)
            .ok_or_else(|| LoadError::UnknownPlugin(name.to_string()))?;
        factory()
    }

    fn load_adapter(&self, name: &str) -> LoadResult<BoxedAdapter> {
        let factory = self
            .adapters
            .get(name)
            .ok_or_else(|| LoadError::UnknownAdapter(name.to_string()))?;
        factory()
    }
}

// =============================================================================
// Load Phase
// =============================================================================

/// Outcome of the load phase.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Names of successfully loaded plugins.
    pub plugins: Vec<String>,
    /// Names of successfully loaded adapters.
    pub adapters: Vec<String>,
    /// Plugins that failed to load, with the reason.
    pub failed_plugins: Vec<(String, LoadError)>,
    /// Adapters that failed to load, with the reason.
    pub failed_adapters: Vec<(String, LoadError)>,
}

impl LoadReport {
    /// Whether any extension failed to load.
    pub fn has_failures(&self) -> bool {
        !self.failed_plugins.is_empty() || !self.failed_adapters.is_empty()
    }
}

/// Resolves every configured extension name through `loader`, inserting the
/// results into `builder`.
///
/// A failing extension is skipped with an error log and recorded in the
/// report; the remaining extensions still load.
pub fn load_extensions(
    loader: &dyn ExtensionLoader,
    extensions: &ExtensionsConfig,
    builder: &mut RegistryBuilder,
) -> LoadReport {
    let mut report = LoadReport::default();

    info!("loading extensions");

    for name in &extensions.plugins {
        match loader.load_plugin(name) {
            Ok(plugin) => {
                info!(plugin = %name, "loaded plugin");
                report.plugins.push(name.clone());
                builder.insert_plugin(plugin);
            }
            Err(e) => {
                error!(plugin = %name, error = %e, "failed to load plugin, skipping");
                report.failed_plugins.push((name.clone(), e));
            }
        }
    }

    for name in &extensions.adapters {
        match loader.load_adapter(name) {
            Ok(adapter) => {
                info!(adapter = %name, "loaded adapter");
                report.adapters.push(name.clone());
                builder.insert_adapter(adapter);
            }
            Err(e) => {
                error!(adapter = %name, error = %e, "failed to load adapter, skipping");
                report.failed_adapters.push((name.clone(), e));
            }
        }
    }

    info!(
        plugins = ?report.plugins,
        adapters = ?report.adapters,
        "extension load phase complete"
    );
    if report.has_failures() {
        warn!(
            failed_plugins = report.failed_plugins.len(),
            failed_adapters = report.failed_adapters.len(),
            "some extensions failed to load"
        );
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use flux_core::{CmdManifest, ManifestPlugin, Plugin};
    use linkme::distributed_slice;
    use std::sync::Arc;

    fn quote_plugin() -> LoadResult<BoxedPlugin> {
        Ok(Arc::new(ManifestPlugin::new("quote", CmdManifest::new())))
    }

    fn faulty_plugin() -> LoadResult<BoxedPlugin> {
        Err(LoadError::Init("backing store unavailable".into()))
    }

    #[distributed_slice(PLUGIN_FACTORIES)]
    static QUOTE: PluginRegistration = PluginRegistration {
        name: "quote",
        factory: quote_plugin,
    };

    #[distributed_slice(PLUGIN_FACTORIES)]
    static FAULTY: PluginRegistration = PluginRegistration {
        name: "faulty",
        factory: faulty_plugin,
    };

    #[test]
    fn static_loader_resolves_compiled_in_plugins() {
        let loader = StaticLoader::collect();
        let plugin = loader.load_plugin("quote").unwrap();
        assert_eq!(plugin.name(), "quote");
    }

    #[test]
    fn unknown_names_are_load_errors() {
        let loader = StaticLoader::collect();
        assert!(matches!(
            loader.load_plugin("nope"),
            Err(LoadError::UnknownPlugin(_))
        ));
        assert!(matches!(
            loader.load_adapter("nope"),
            Err(LoadError::UnknownAdapter(_))
        ));
    }

    #[test]
    fn one_bad_extension_does_not_stop_the_rest() {
        let loader = StaticLoader::collect();
        let extensions = ExtensionsConfig {
            plugins: vec!["faulty".into(), "quote".into(), "missing".into()],
            adapters: vec![],
        };

        let mut builder = RegistryBuilder::new();
        let report = load_extensions(&loader, &extensions, &mut builder);

        assert_eq!(report.plugins, ["quote"]);
        assert_eq!(report.failed_plugins.len(), 2);
        assert!(report.has_failures());

        let registry = builder.build();
        assert_eq!(registry.plugin_count(), 1);
        assert!(registry.plugin("quote").is_some());
    }
}
