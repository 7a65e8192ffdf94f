//! Adapter capability.
//!
//! An adapter is a transport connector to one external chat platform. It
//! produces inbound [`RawIngressMessage`]s and accepts outbound
//! [`EgressMessage`]s; the engine knows nothing about the protocol behind it.
//!
//! # Lifecycle
//!
//! The engine calls [`Adapter::listen`] once, handing the adapter the
//! sending half of a private channel. `listen` must be non-blocking: it
//! spawns whatever delivery task the adapter needs and returns. The adapter
//! then delivers messages on the channel until it shuts down; dropping the
//! sender closes the channel, which the engine treats as a permanent
//! disconnect for that adapter — there is no reconnect logic.
//!
//! [`Adapter::send_message`] may be called concurrently from many egress
//! workers while `listen` is active; implementations must tolerate that.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::AdapterResult;
use crate::message::{EgressMessage, RawIngressMessage};

/// The adapter capability consumed by the engine.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Unique id used for registry lookup and egress routing.
    fn name(&self) -> &str;

    /// Begins asynchronously delivering inbound messages on `tx`.
    ///
    /// Must not block: spawn a delivery task and return. Dropping `tx`
    /// (or every clone of it) signals adapter shutdown to the engine.
    async fn listen(&self, tx: mpsc::Sender<RawIngressMessage>) -> AdapterResult<()>;

    /// Delivers an outgoing message to the platform.
    ///
    /// Fire-and-forget from the engine's point of view: an error is logged
    /// and the message dropped; retries are the adapter's business.
    async fn send_message(&self, message: EgressMessage) -> AdapterResult<()>;
}

/// A shared adapter trait object.
pub type BoxedAdapter = Arc<dyn Adapter>;
