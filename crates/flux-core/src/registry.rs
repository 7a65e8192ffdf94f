//! Extension registry with a two-phase lifecycle.
//!
//! Extensions are registered during a load phase through the mutable
//! [`RegistryBuilder`], then frozen into an immutable [`ExtensionRegistry`]
//! for the run phase. The snapshot is shared read-only by every worker, so
//! dispatch needs no locking at all.

use std::collections::HashMap;

use tracing::warn;

use crate::adapter::{Adapter, BoxedAdapter};
use crate::plugin::{BoxedPlugin, Plugin};

/// Load-phase accumulator for plugins and adapters.
///
/// Name collisions keep the later registration and log a warning naming the
/// replaced extension.
#[derive(Default)]
pub struct RegistryBuilder {
    plugins: Vec<BoxedPlugin>,
    plugin_index: HashMap<String, usize>,
    adapters: HashMap<String, BoxedAdapter>,
}

impl RegistryBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a plugin under its own name.
    pub fn insert_plugin(&mut self, plugin: BoxedPlugin) {
        let name = plugin.name().to_string();
        if let Some(&index) = self.plugin_index.get(&name) {
            warn!(plugin = %name, "plugin name collision, replacing earlier registration");
            self.plugins[index] = plugin;
        } else {
            self.plugin_index.insert(name, self.plugins.len());
            self.plugins.push(plugin);
        }
    }

    /// Registers an adapter under its own name.
    pub fn insert_adapter(&mut self, adapter: BoxedAdapter) {
        let name = adapter.name().to_string();
        if self.adapters.contains_key(&name) {
            warn!(adapter = %name, "adapter name collision, replacing earlier registration");
        }
        self.adapters.insert(name, adapter);
    }

    /// Freezes the builder into the immutable run-phase snapshot.
    pub fn build(self) -> ExtensionRegistry {
        ExtensionRegistry {
            plugins: self.plugins,
            adapters: self.adapters,
        }
    }
}

/// Immutable run-phase snapshot of all loaded extensions.
///
/// Plugins are iterated in registration order, which makes dispatch order
/// deterministic for a given load sequence.
pub struct ExtensionRegistry {
    plugins: Vec<BoxedPlugin>,
    adapters: HashMap<String, BoxedAdapter>,
}

impl ExtensionRegistry {
    /// All loaded plugins, in registration order.
    pub fn plugins(&self) -> &[BoxedPlugin] {
        &self.plugins
    }

    /// Looks up a plugin by name.
    pub fn plugin(&self, name: &str) -> Option<&BoxedPlugin> {
        self.plugins.iter().find(|p| p.name() == name)
    }

    /// Looks up an adapter by name.
    pub fn adapter(&self, name: &str) -> Option<&BoxedAdapter> {
        self.adapters.get(name)
    }

    /// Iterates all loaded adapters (order unspecified).
    pub fn adapters(&self) -> impl Iterator<Item = &BoxedAdapter> {
        self.adapters.values()
    }

    /// Names of all loaded adapters.
    pub fn adapter_names(&self) -> Vec<String> {
        self.adapters.keys().cloned().collect()
    }

    /// Number of loaded plugins.
    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }

    /// Number of loaded adapters.
    pub fn adapter_count(&self) -> usize {
        self.adapters.len()
    }
}
