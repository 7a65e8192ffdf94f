//! Ingress filtering and command parsing.
//!
//! Raw messages pass through two gates before they reach the command
//! dispatcher:
//!
//! 1. the [`Classifier`] decides whether the content is a command at all —
//!    non-commands are dropped silently;
//! 2. the first character must equal the configured trigger — a mismatch
//!    means the classifier and the trigger convention disagree, so the
//!    message is dropped with a warning.
//!
//! The policy is fail closed: any ambiguity drops the message rather than
//! risking a bad dispatch.

use tracing::warn;

use crate::message::{IngressMessage, Originator, RawIngressMessage};

/// Decides whether raw content is a command invocation.
///
/// Injectable so platforms with richer command markers (mentions, slash
/// commands) can supply their own notion of "looks like a command". The
/// trigger check in [`filter_raw`] still applies afterwards.
pub trait Classifier: Send + Sync {
    /// Returns `true` if `raw_content` should be treated as a command.
    fn is_command(&self, raw_content: &str) -> bool;
}

/// Default classifier: content is a command iff its first character is the
/// configured trigger.
#[derive(Debug, Clone, Copy)]
pub struct TriggerClassifier {
    trigger: char,
}

impl TriggerClassifier {
    /// Creates a classifier for the given trigger character.
    pub fn new(trigger: char) -> Self {
        Self { trigger }
    }
}

impl Classifier for TriggerClassifier {
    fn is_command(&self, raw_content: &str) -> bool {
        raw_content.chars().next() == Some(self.trigger)
    }
}

/// Filters one raw message into at most one ingress message.
///
/// Returns `None` for non-commands (silent) and for classified-as-command
/// content whose first character is not the trigger (logged warning).
pub(crate) fn filter_raw(
    classifier: &dyn Classifier,
    trigger: char,
    adapter_name: &str,
    message: RawIngressMessage,
) -> Option<IngressMessage> {
    if !classifier.is_command(&message.raw_content) {
        return None;
    }

    let mut chars = message.raw_content.chars();
    match chars.next() {
        Some(c) if c == trigger => {}
        _ => {
            warn!(
                adapter = %adapter_name,
                content = %message.raw_content,
                "content was classified as a command but does not start with the trigger, dropping"
            );
            return None;
        }
    }

    // Strip exactly the leading trigger character; the remainder is the
    // dispatch payload.
    let content = chars.as_str().to_string();

    Some(IngressMessage {
        originator: Originator {
            identity: message.identity,
            channel_id: message.channel_id,
            adapter_name: adapter_name.to_string(),
        },
        content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Classifier that unconditionally flags content as a command, used to
    /// exercise the trigger-mismatch defence.
    struct AlwaysCommand;

    impl Classifier for AlwaysCommand {
        fn is_command(&self, _raw_content: &str) -> bool {
            true
        }
    }

    fn raw(content: &str) -> RawIngressMessage {
        RawIngressMessage::new("ferris", "#general", content)
    }

    #[test]
    fn command_with_trigger_is_stripped() {
        let classifier = TriggerClassifier::new('!');
        let message = filter_raw(&classifier, '!', "irc", raw("!ping")).unwrap();
        assert_eq!(message.content, "ping");
        assert_eq!(message.originator.identity, "ferris");
        assert_eq!(message.originator.channel_id, "#general");
        assert_eq!(message.originator.adapter_name, "irc");
    }

    #[test]
    fn non_command_is_dropped_silently() {
        let classifier = TriggerClassifier::new('!');
        assert!(filter_raw(&classifier, '!', "irc", raw("hello")).is_none());
    }

    #[test]
    fn classifier_trigger_disagreement_drops() {
        // The classifier says "command" but the content starts with the
        // wrong symbol for the configured trigger.
        assert!(filter_raw(&AlwaysCommand, '#', "irc", raw("!ping")).is_none());
    }

    #[test]
    fn empty_content_is_never_a_command() {
        let classifier = TriggerClassifier::new('!');
        assert!(filter_raw(&classifier, '!', "irc", raw("")).is_none());
        assert!(filter_raw(&AlwaysCommand, '!', "irc", raw("")).is_none());
    }

    #[test]
    fn only_the_first_character_is_stripped() {
        let classifier = TriggerClassifier::new('!');
        let message = filter_raw(&classifier, '!', "irc", raw("!!ping")).unwrap();
        assert_eq!(message.content, "!ping");
    }

    #[test]
    fn multibyte_trigger_strips_cleanly() {
        let classifier = TriggerClassifier::new('§');
        let message = filter_raw(&classifier, '§', "irc", raw("§status")).unwrap();
        assert_eq!(message.content, "status");
    }
}
