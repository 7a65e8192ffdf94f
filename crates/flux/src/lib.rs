//! # flux
//!
//! A message-routing core for chat bots.
//!
//! flux takes raw messages from pluggable transport connectors
//! ("adapters"), recognizes command invocations, dispatches them to
//! pluggable command handlers ("plugins"), and routes every reply back to
//! the adapter and channel it came from.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────┐   fan-in   ┌──────────────────┐   workers   ┌─────────┐
//! │ Adapter │───────────▶│                  │────────────▶│ Plugins │
//! ├─────────┤            │  dispatch loop   │             └────┬────┘
//! │ Adapter │───────────▶│ (bounded queues) │◀─────────────────┘
//! └─────────┘◀───────────│                  │   replies
//!      ▲      egress     └──────────────────┘
//! ```
//!
//! - **flux-core**: the engine — buffers, dispatch loop, command matching,
//!   extension registry
//! - **flux-runtime**: configuration, logging, extension loading, and the
//!   signal-driven run loop
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use flux::prelude::*;
//! use regex::Regex;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = FluxRuntime::new();
//!
//!     runtime.register_plugin(Arc::new(ManifestPlugin::new(
//!         "ping",
//!         CmdManifest::new().cmd("ping", Regex::new("^ping$")?, |d: &mut CmdDelegate| {
//!             d.respond("pong");
//!         }),
//!     )))?;
//!     runtime.register_adapter(my_adapter)?;
//!
//!     runtime.run().await?;
//!     Ok(())
//! }
//! ```

pub use flux_core as core;
pub use flux_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use flux::prelude::*;
/// ```
pub mod prelude {
    // Runtime — main entry point
    pub use flux_runtime::{FluxRuntime, RuntimeBuilder, RuntimeError, RuntimeResult};

    // Configuration
    pub use flux_runtime::config::{ExtensionsConfig, FluxConfig};

    // Extension loading — registration tables for compiled-in extensions
    pub use flux_runtime::loader::{
        ADAPTER_FACTORIES, AdapterRegistration, ExtensionLoader, LoadError, LoadResult,
        PLUGIN_FACTORIES, PluginRegistration,
    };

    // Core capabilities and message types
    pub use flux_core::{
        Adapter, AdapterError, AdapterResult, BoxedAdapter, BoxedPlugin, CmdDelegate,
        CmdManifest, EgressMessage, ManifestPlugin, Originator, Plugin, RawIngressMessage,
    };
}
