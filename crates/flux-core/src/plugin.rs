//! Plugin capability and command manifests.
//!
//! A plugin declares the commands it answers to through a [`CmdManifest`]:
//! an ordered table mapping regex patterns to handler functions. The engine
//! runs each ingress message against every manifest of every loaded plugin;
//! every pattern that matches fires its handler with a fresh
//! [`CmdDelegate`].
//!
//! # Example
//!
//! ```rust,ignore
//! use flux_core::{CmdDelegate, CmdManifest, ManifestPlugin};
//! use regex::Regex;
//!
//! let manifest = CmdManifest::new()
//!     .cmd("ping", Regex::new("^ping$")?, |d: &mut CmdDelegate| {
//!         d.respond("pong");
//!     })
//!     .cmd("echo", Regex::new("^echo (.+)$")?, |d: &mut CmdDelegate| {
//!         if let Some(text) = d.submatch(1) {
//!             d.respond(text.to_string());
//!         }
//!     });
//!
//! let plugin = ManifestPlugin::new("echo", manifest);
//! ```

use std::sync::Arc;

use regex::Regex;

use crate::delegate::CmdDelegate;

/// A command handler function.
///
/// Handlers are plain synchronous closures: the engine invokes them from a
/// dedicated worker task, so they may do CPU work freely but should not
/// block on I/O. A reply is signalled solely through the delegate.
pub type CmdFn = Arc<dyn Fn(&mut CmdDelegate) + Send + Sync>;

/// One named command: a compiled pattern and the handler it fires.
pub struct CmdLink {
    name: String,
    pattern: Regex,
    handler: CmdFn,
}

impl CmdLink {
    /// The command's declared name (used in logs, not for matching).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The command's pattern. Applied as an unanchored search; anchor with
    /// `^`/`$` in the pattern itself where full-string matching is wanted.
    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    pub(crate) fn handler(&self) -> &CmdFn {
        &self.handler
    }
}

impl std::fmt::Debug for CmdLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CmdLink")
            .field("name", &self.name)
            .field("pattern", &self.pattern.as_str())
            .finish()
    }
}

/// Ordered command table owned by a plugin.
///
/// Entries are matched in declaration order, and every entry whose pattern
/// matches fires — there is deliberately no first-match-wins cutoff, so one
/// message can trigger several handlers (possibly across plugins). Whether
/// that is the right semantics for overlapping patterns is an open design
/// question; until it is settled, declare patterns that do not overlap
/// unless you want all of them to run.
#[derive(Default)]
pub struct CmdManifest {
    links: Vec<CmdLink>,
}

impl CmdManifest {
    /// Creates an empty manifest.
    pub fn new() -> Self {
        Self { links: Vec::new() }
    }

    /// Declares a command (builder pattern).
    pub fn cmd<F>(mut self, name: impl Into<String>, pattern: Regex, handler: F) -> Self
    where
        F: Fn(&mut CmdDelegate) + Send + Sync + 'static,
    {
        self.links.push(CmdLink {
            name: name.into(),
            pattern,
            handler: Arc::new(handler),
        });
        self
    }

    /// The declared commands, in declaration order.
    pub fn links(&self) -> &[CmdLink] {
        &self.links
    }

    /// Number of declared commands.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Whether the manifest declares no commands.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

impl std::fmt::Debug for CmdManifest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.links.iter()).finish()
    }
}

// =============================================================================
// Plugin Trait
// =============================================================================

/// The plugin capability consumed by the engine.
///
/// Loaded once, immutable thereafter, shared by all invocations.
pub trait Plugin: Send + Sync {
    /// Unique id used for registry bookkeeping and logging.
    fn name(&self) -> &str;

    /// The plugin's command table.
    fn manifest(&self) -> &CmdManifest;
}

/// A shared plugin trait object.
pub type BoxedPlugin = Arc<dyn Plugin>;

/// A plugin defined directly by a name and a manifest.
///
/// Most plugins need no state beyond their command table; this is the
/// ready-made carrier for them.
pub struct ManifestPlugin {
    name: String,
    manifest: CmdManifest,
}

impl ManifestPlugin {
    /// Creates a plugin from a name and a manifest.
    pub fn new(name: impl Into<String>, manifest: CmdManifest) -> Self {
        Self {
            name: name.into(),
            manifest,
        }
    }
}

impl Plugin for ManifestPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn manifest(&self) -> &CmdManifest {
        &self.manifest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_preserves_declaration_order() {
        let manifest = CmdManifest::new()
            .cmd("b", Regex::new("^b$").unwrap(), |_d: &mut CmdDelegate| {})
            .cmd("a", Regex::new("^a$").unwrap(), |_d: &mut CmdDelegate| {})
            .cmd("c", Regex::new("^c$").unwrap(), |_d: &mut CmdDelegate| {});

        let names: Vec<_> = manifest.links().iter().map(CmdLink::name).collect();
        assert_eq!(names, ["b", "a", "c"]);
    }

    #[test]
    fn manifest_plugin_exposes_name_and_manifest() {
        let plugin = ManifestPlugin::new(
            "ping",
            CmdManifest::new().cmd("ping", Regex::new("^ping$").unwrap(), |d: &mut CmdDelegate| {
                d.respond("pong");
            }),
        );
        assert_eq!(plugin.name(), "ping");
        assert_eq!(plugin.manifest().len(), 1);
    }
}
