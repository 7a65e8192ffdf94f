//! Message types flowing through the engine.
//!
//! A message enters the pipeline as a [`RawIngressMessage`], becomes an
//! [`IngressMessage`] once the command filter accepts it, and leaves as an
//! [`EgressMessage`] when a handler writes a reply. Every derived message
//! carries an [`Originator`] so the reply can be routed back to the adapter
//! and channel it came from.

/// A raw inbound message as produced by an adapter.
///
/// Immutable once produced; consumed exactly once by the ingress filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawIngressMessage {
    /// Platform identity of the sender (nick, user id, ...).
    pub identity: String,
    /// Platform channel the message arrived on.
    pub channel_id: String,
    /// The unparsed message text, trigger prefix included.
    pub raw_content: String,
}

impl RawIngressMessage {
    /// Creates a raw message from its parts.
    pub fn new(
        identity: impl Into<String>,
        channel_id: impl Into<String>,
        raw_content: impl Into<String>,
    ) -> Self {
        Self {
            identity: identity.into(),
            channel_id: channel_id.into(),
            raw_content: raw_content.into(),
        }
    }
}

/// Identifies where any reply derived from a raw message must go.
///
/// Attached to every [`IngressMessage`] and carried through to egress
/// dispatch, where `adapter_name` selects the sending adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Originator {
    /// Sender identity, copied from the raw message.
    pub identity: String,
    /// Channel the raw message arrived on.
    pub channel_id: String,
    /// Name of the adapter that produced the raw message.
    pub adapter_name: String,
}

/// A structured command message, derived 1:1 from a raw message that passed
/// the command filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngressMessage {
    /// Reply destination for anything this message produces.
    pub originator: Originator,
    /// Command text with the trigger character stripped.
    pub content: String,
}

/// An outgoing message produced by a command handler.
///
/// Paired with an [`Originator`] at dispatch time; the engine never sends
/// one anywhere except through the adapter named by that originator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EgressMessage {
    /// Channel to deliver to.
    pub channel_id: String,
    /// Reply text.
    pub content: String,
}

// =============================================================================
// Buffer Envelopes
// =============================================================================

// Internal buffer payloads: the public message plus the routing metadata the
// engine needs to move it along.

/// Raw ingress buffer entry: a raw message tagged with its source adapter.
#[derive(Debug, Clone)]
pub(crate) struct RawIngressEnvelope {
    pub(crate) adapter_name: String,
    pub(crate) message: RawIngressMessage,
}

/// Egress buffer entry: an outgoing message tagged with its originator.
#[derive(Debug, Clone)]
pub(crate) struct EgressEnvelope {
    pub(crate) originator: Originator,
    pub(crate) message: EgressMessage,
}
