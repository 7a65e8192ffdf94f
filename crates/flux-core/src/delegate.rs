//! Per-invocation command delegate.

use crate::message::{IngressMessage, Originator};

/// Mutable scratch context handed to a command handler for exactly one
/// invocation.
///
/// The delegate carries everything a handler may read — the originator, the
/// full command content, the regex submatches — and the one thing it may
/// write: the response accumulator. A handler signals a reply solely by
/// calling [`respond`](CmdDelegate::respond); leaving the response empty
/// produces no egress traffic.
#[derive(Debug)]
pub struct CmdDelegate {
    originator: Originator,
    content: String,
    submatches: Vec<String>,
    response: String,
}

impl CmdDelegate {
    /// Builds a delegate for one handler invocation.
    pub fn new(message: &IngressMessage, submatches: Vec<String>) -> Self {
        Self {
            originator: message.originator.clone(),
            content: message.content.clone(),
            submatches,
            response: String::new(),
        }
    }

    /// The originator of the message being handled.
    pub fn originator(&self) -> &Originator {
        &self.originator
    }

    /// The command content (trigger already stripped).
    pub fn content(&self) -> &str {
        &self.content
    }

    /// All captured submatches. Index 0 is the whole match; groups that did
    /// not participate in the match are empty strings.
    pub fn submatches(&self) -> &[String] {
        &self.submatches
    }

    /// The `index`-th submatch, if the pattern captured that many.
    pub fn submatch(&self, index: usize) -> Option<&str> {
        self.submatches.get(index).map(String::as_str)
    }

    /// Sets the reply to send back to the originator.
    ///
    /// Later calls overwrite earlier ones; the last write wins.
    pub fn respond(&mut self, response: impl Into<String>) {
        self.response = response.into();
    }

    /// The currently accumulated response text (empty if none).
    pub fn response(&self) -> &str {
        &self.response
    }

    /// Consumes the delegate, yielding the accumulated response.
    pub(crate) fn into_response(self) -> String {
        self.response
    }

    /// Whether a non-empty response has been set.
    pub fn has_response(&self) -> bool {
        !self.response.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> IngressMessage {
        IngressMessage {
            originator: Originator {
                identity: "ferris".into(),
                channel_id: "#general".into(),
                adapter_name: "irc".into(),
            },
            content: "echo hello".into(),
        }
    }

    #[test]
    fn submatch_access() {
        let delegate = CmdDelegate::new(&message(), vec!["echo hello".into(), "hello".into()]);
        assert_eq!(delegate.submatch(0), Some("echo hello"));
        assert_eq!(delegate.submatch(1), Some("hello"));
        assert_eq!(delegate.submatch(2), None);
    }

    #[test]
    fn respond_overwrites() {
        let mut delegate = CmdDelegate::new(&message(), vec![]);
        assert!(!delegate.has_response());
        delegate.respond("first");
        delegate.respond("second");
        assert!(delegate.has_response());
        assert_eq!(delegate.into_response(), "second");
    }
}
