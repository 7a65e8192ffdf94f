//! # flux-core
//!
//! The message-routing engine at the heart of the flux chat-bot platform.
//!
//! flux accepts raw inbound messages from pluggable transport connectors
//! ("adapters"), recognizes command invocations, dispatches them to
//! pluggable command handlers ("plugins"), and routes any generated reply
//! back to the originating adapter and channel.
//!
//! ## Pipeline
//!
//! ```text
//! Adapter ─▶ private channel ─▶ Raw Ingress Buffer ─▶ Filter/Parser
//!                                                          │
//!                         Ingress Buffer ◀────────────────┘
//!                               │
//!                               ▼
//!                       Command Dispatcher ─▶ Egress Buffer ─▶ Egress Dispatcher ─▶ Adapter
//! ```
//!
//! - **Fan-in**: one listener task per adapter relays into the shared raw
//!   ingress buffer.
//! - **Dispatch loop**: a single task waits on all three bounded buffers and
//!   hands each item to its own worker, so slow handlers never stall intake.
//! - **Backpressure**: every buffer is bounded; a full buffer suspends its
//!   producer. That is the only flow-control mechanism.
//! - **Registry**: plugins and adapters are registered during a load phase
//!   ([`RegistryBuilder`]) and frozen into an immutable snapshot
//!   ([`ExtensionRegistry`]) before the run phase — dispatch takes no locks.
//!
//! ## Example
//!
//! ```rust,ignore
//! use flux_core::{
//!     CmdDelegate, CmdManifest, Engine, EngineOptions, ManifestPlugin, RegistryBuilder,
//! };
//! use regex::Regex;
//! use std::sync::Arc;
//!
//! let mut builder = RegistryBuilder::new();
//! builder.insert_plugin(Arc::new(ManifestPlugin::new(
//!     "ping",
//!     CmdManifest::new().cmd("ping", Regex::new("^ping$")?, |d: &mut CmdDelegate| {
//!         d.respond("pong");
//!     }),
//! )));
//! builder.insert_adapter(my_adapter);
//!
//! let engine = Engine::new(builder.build(), EngineOptions::default());
//! let handle = engine.start().await;
//! // ... run until shutdown ...
//! handle.shutdown().await;
//! ```

pub mod adapter;
pub mod classify;
pub mod delegate;
pub mod engine;
pub mod error;
pub mod message;
pub mod plugin;
pub mod registry;

mod dispatch;

pub use adapter::{Adapter, BoxedAdapter};
pub use classify::{Classifier, TriggerClassifier};
pub use delegate::CmdDelegate;
pub use engine::{Engine, EngineHandle, EngineOptions};
pub use error::{AdapterError, AdapterResult};
pub use message::{EgressMessage, IngressMessage, Originator, RawIngressMessage};
pub use plugin::{BoxedPlugin, CmdFn, CmdLink, CmdManifest, ManifestPlugin, Plugin};
pub use registry::{ExtensionRegistry, RegistryBuilder};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::adapter::{Adapter, BoxedAdapter};
    pub use crate::delegate::CmdDelegate;
    pub use crate::engine::{Engine, EngineHandle, EngineOptions};
    pub use crate::error::{AdapterError, AdapterResult};
    pub use crate::message::{EgressMessage, IngressMessage, Originator, RawIngressMessage};
    pub use crate::plugin::{BoxedPlugin, CmdManifest, ManifestPlugin, Plugin};
    pub use crate::registry::{ExtensionRegistry, RegistryBuilder};
}
