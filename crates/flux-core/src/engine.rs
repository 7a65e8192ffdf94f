//! The flux engine: buffer wiring, listener fan-in, and the dispatch loop.
//!
//! # Architecture
//!
//! ```text
//! Adapter ──▶ private channel ──▶ Raw Ingress Buffer ─┐
//! Adapter ──▶ private channel ──▶ (fan-in)            │
//!                                                     ▼
//!                                              dispatch loop ──▶ worker: filter/parse ──▶ Ingress Buffer
//!                                                     │
//!                                                     ├──▶ worker: match commands, run handlers ──▶ Egress Buffer
//!                                                     │
//!                                                     └──▶ worker: route reply to adapter
//! ```
//!
//! The dispatch loop is the only consumer of the three shared buffers. It
//! waits on all of them simultaneously (`tokio::select!`, whose random
//! branch polling keeps any one buffer from starving the others) and hands
//! each dequeued item to its own worker task, so the loop never blocks on
//! slow processing — only on buffer selection.
//!
//! All buffers are bounded; a full buffer suspends its producer until a
//! consumer frees capacity. That is the engine's sole flow-control
//! mechanism: no drop policy, no enqueue timeout.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use crate::adapter::Adapter;
use crate::classify::{self, Classifier, TriggerClassifier};
use crate::dispatch;
use crate::message::{
    EgressEnvelope, EgressMessage, IngressMessage, RawIngressEnvelope, RawIngressMessage,
};
use crate::registry::ExtensionRegistry;

/// Engine tunables, fixed at construction.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Capacity of each of the three shared buffers.
    pub buffer_size: usize,
    /// Capacity of each adapter's private inbound channel.
    pub adapter_channel_size: usize,
    /// The command trigger character.
    pub trigger: char,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            buffer_size: 32,
            adapter_channel_size: 2,
            trigger: '!',
        }
    }
}

/// The message-routing engine.
///
/// Construct with a frozen [`ExtensionRegistry`], then call
/// [`start`](Engine::start) to spawn the pipeline. The returned
/// [`EngineHandle`] controls shutdown.
pub struct Engine {
    registry: Arc<ExtensionRegistry>,
    classifier: Arc<dyn Classifier>,
    options: EngineOptions,
}

impl Engine {
    /// Creates an engine over a frozen registry.
    pub fn new(registry: ExtensionRegistry, options: EngineOptions) -> Self {
        Self {
            registry: Arc::new(registry),
            classifier: Arc::new(TriggerClassifier::new(options.trigger)),
            options,
        }
    }

    /// Replaces the default trigger-based classifier.
    pub fn with_classifier(mut self, classifier: Arc<dyn Classifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// The registry this engine dispatches against.
    pub fn registry(&self) -> &ExtensionRegistry {
        &self.registry
    }

    /// Starts the pipeline: one listener task per adapter, the dispatch
    /// loop, and the worker task group.
    ///
    /// An adapter whose `listen` call fails is skipped with an error log;
    /// the rest of the pipeline starts normally.
    pub async fn start(self) -> EngineHandle {
        let buffer_size = self.options.buffer_size.max(1);
        let adapter_channel_size = self.options.adapter_channel_size.max(1);

        let (raw_tx, raw_rx) = mpsc::channel::<RawIngressEnvelope>(buffer_size);
        let (ingress_tx, ingress_rx) = mpsc::channel::<IngressMessage>(buffer_size);
        let (egress_tx, egress_rx) = mpsc::channel::<EgressEnvelope>(buffer_size);

        let cancel = CancellationToken::new();
        let listeners = TaskTracker::new();
        let workers = TaskTracker::new();

        // Fan-in: one relay task per adapter, each bridging the adapter's
        // private channel into the shared raw ingress buffer.
        for adapter in self.registry.adapters() {
            let (tx, rx) = mpsc::channel(adapter_channel_size);

            if let Err(e) = adapter.listen(tx).await {
                error!(adapter = %adapter.name(), error = %e, "failed to start adapter, skipping");
                continue;
            }
            info!(adapter = %adapter.name(), "adapter listening");

            listeners.spawn(relay_raw_ingress(
                adapter.name().to_string(),
                rx,
                raw_tx.clone(),
                cancel.clone(),
            ));
        }
        listeners.close();

        // The loop's receiver observes fan-in shutdown through sender drops,
        // so the wiring copy must not outlive the relays.
        drop(raw_tx);

        let dispatch = tokio::spawn(dispatch_loop(DispatchLoop {
            registry: Arc::clone(&self.registry),
            classifier: Arc::clone(&self.classifier),
            trigger: self.options.trigger,
            raw_rx,
            ingress_rx,
            egress_rx,
            ingress_tx,
            egress_tx,
            cancel: cancel.clone(),
            workers: workers.clone(),
        }));

        info!(
            plugins = self.registry.plugin_count(),
            adapters = self.registry.adapter_count(),
            "engine started"
        );

        EngineHandle {
            cancel,
            listeners,
            workers,
            dispatch,
        }
    }
}

/// Handle controlling a started engine.
///
/// Dropping the handle leaves the engine running detached; call
/// [`shutdown`](EngineHandle::shutdown) to stop it and drain in-flight work.
pub struct EngineHandle {
    cancel: CancellationToken,
    listeners: TaskTracker,
    workers: TaskTracker,
    dispatch: JoinHandle<()>,
}

impl EngineHandle {
    /// Signals the engine to stop, without waiting.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Stops the dispatch loop, then waits for every listener and every
    /// in-flight worker to finish.
    ///
    /// Items still queued in the buffers when the loop stops are discarded;
    /// items already handed to a worker complete normally.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if self.dispatch.await.is_err() {
            error!("dispatch loop task failed");
        }
        self.listeners.wait().await;
        self.workers.close();
        self.workers.wait().await;
        info!("engine stopped");
    }
}

// =============================================================================
// Listener Fan-in
// =============================================================================

/// Relays one adapter's private channel into the shared raw ingress buffer.
///
/// Ends when the adapter drops its sender (permanent disconnect, no
/// reconnect logic) or the engine shuts down.
async fn relay_raw_ingress(
    adapter_name: String,
    mut rx: mpsc::Receiver<RawIngressMessage>,
    raw_tx: mpsc::Sender<RawIngressEnvelope>,
    cancel: CancellationToken,
) {
    loop {
        let message = tokio::select! {
            _ = cancel.cancelled() => break,
            received = rx.recv() => match received {
                Some(message) => message,
                None => {
                    info!(adapter = %adapter_name, "adapter channel closed, inbound relay ending");
                    break;
                }
            },
        };

        let envelope = RawIngressEnvelope {
            adapter_name: adapter_name.clone(),
            message,
        };

        // A full shared buffer suspends this relay until the loop drains it;
        // the adapter's private channel then backs up behind us.
        tokio::select! {
            _ = cancel.cancelled() => break,
            sent = raw_tx.send(envelope) => {
                if sent.is_err() {
                    break;
                }
            }
        }
    }
}

// =============================================================================
// Dispatch Loop
// =============================================================================

struct DispatchLoop {
    registry: Arc<ExtensionRegistry>,
    classifier: Arc<dyn Classifier>,
    trigger: char,
    raw_rx: mpsc::Receiver<RawIngressEnvelope>,
    ingress_rx: mpsc::Receiver<IngressMessage>,
    egress_rx: mpsc::Receiver<EgressEnvelope>,
    ingress_tx: mpsc::Sender<IngressMessage>,
    egress_tx: mpsc::Sender<EgressEnvelope>,
    cancel: CancellationToken,
    workers: TaskTracker,
}

/// The single control loop: waits on all three buffers, spawns one worker
/// per dequeued item, never blocks on handler logic.
async fn dispatch_loop(state: DispatchLoop) {
    let DispatchLoop {
        registry,
        classifier,
        trigger,
        mut raw_rx,
        mut ingress_rx,
        mut egress_rx,
        ingress_tx,
        egress_tx,
        cancel,
        workers,
    } = state;

    debug!("dispatch loop running");

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,

            Some(envelope) = raw_rx.recv() => {
                let classifier = Arc::clone(&classifier);
                let ingress_tx = ingress_tx.clone();
                workers.spawn(async move {
                    handle_raw_ingress(classifier, trigger, ingress_tx, envelope).await;
                });
            }

            Some(message) = ingress_rx.recv() => {
                let registry = Arc::clone(&registry);
                let egress_tx = egress_tx.clone();
                workers.spawn(async move {
                    handle_ingress(registry, egress_tx, message).await;
                });
            }

            Some(envelope) = egress_rx.recv() => {
                let registry = Arc::clone(&registry);
                workers.spawn(async move {
                    handle_egress(registry, envelope).await;
                });
            }
        }
    }

    debug!("dispatch loop stopped");
}

// =============================================================================
// Workers
// =============================================================================

/// Filters one raw message; forwards the structured command, if any, to the
/// ingress buffer.
async fn handle_raw_ingress(
    classifier: Arc<dyn Classifier>,
    trigger: char,
    ingress_tx: mpsc::Sender<IngressMessage>,
    envelope: RawIngressEnvelope,
) {
    let Some(message) = classify::filter_raw(
        classifier.as_ref(),
        trigger,
        &envelope.adapter_name,
        envelope.message,
    ) else {
        return;
    };

    if ingress_tx.send(message).await.is_err() {
        debug!("ingress buffer closed, dropping command message");
    }
}

/// Matches one command message against every plugin and queues a reply for
/// each handler that produced one.
async fn handle_ingress(
    registry: Arc<ExtensionRegistry>,
    egress_tx: mpsc::Sender<EgressEnvelope>,
    message: IngressMessage,
) {
    debug!(
        adapter = %message.originator.adapter_name,
        content = %message.content,
        "dispatching command message"
    );

    let matches = dispatch::apply_manifests(&registry, &message.content);

    for cmd in &matches {
        let Some(response) = dispatch::execute_match(&message, cmd) else {
            continue;
        };

        let envelope = EgressEnvelope {
            originator: message.originator.clone(),
            message: EgressMessage {
                channel_id: message.originator.channel_id.clone(),
                content: response,
            },
        };

        if egress_tx.send(envelope).await.is_err() {
            debug!("egress buffer closed, dropping reply");
        }
    }
}

/// Routes one outgoing message to the adapter named by its originator.
async fn handle_egress(registry: Arc<ExtensionRegistry>, envelope: EgressEnvelope) {
    match registry.adapter(&envelope.originator.adapter_name) {
        Some(adapter) => {
            if let Err(e) = adapter.send_message(envelope.message).await {
                warn!(
                    adapter = %envelope.originator.adapter_name,
                    error = %e,
                    "adapter failed to send message, dropping"
                );
            }
        }
        None => {
            warn!(
                adapter = %envelope.originator.adapter_name,
                "no adapter registered for outgoing message, dropping"
            );
        }
    }
}
