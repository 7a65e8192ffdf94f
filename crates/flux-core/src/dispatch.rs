//! Command matching and handler execution.
//!
//! One ingress message is run against every pattern of every loaded plugin;
//! each match yields a [`CmdMatch`] record and one handler invocation. Every
//! invocation is a fault boundary: a panicking handler is caught, logged
//! with its plugin and command identity, and contributes no reply.

use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::{debug, error};

use crate::delegate::CmdDelegate;
use crate::message::IngressMessage;
use crate::plugin::{CmdFn, Plugin};
use crate::registry::ExtensionRegistry;

/// One pattern match: the handler to fire plus identity for logging.
pub(crate) struct CmdMatch {
    pub(crate) plugin: String,
    pub(crate) command: String,
    pub(crate) handler: CmdFn,
    pub(crate) submatches: Vec<String>,
}

/// Runs `content` against every manifest of every loaded plugin.
///
/// Patterns are applied as unanchored searches; all matches fire, in
/// plugin-registration then manifest-declaration order.
pub(crate) fn apply_manifests(registry: &ExtensionRegistry, content: &str) -> Vec<CmdMatch> {
    let mut matches = Vec::new();

    for plugin in registry.plugins() {
        for link in plugin.manifest().links() {
            if let Some(captures) = link.pattern().captures(content) {
                let submatches = captures
                    .iter()
                    .map(|group| group.map(|m| m.as_str().to_string()).unwrap_or_default())
                    .collect();

                matches.push(CmdMatch {
                    plugin: plugin.name().to_string(),
                    command: link.name().to_string(),
                    handler: link.handler().clone(),
                    submatches,
                });
            }
        }
    }

    debug!(
        content = %content,
        match_count = matches.len(),
        "applied command manifests"
    );

    matches
}

/// Executes one matched handler and returns its reply, if any.
///
/// Returns `None` when the handler set no response or panicked.
pub(crate) fn execute_match(message: &IngressMessage, cmd: &CmdMatch) -> Option<String> {
    let mut delegate = CmdDelegate::new(message, cmd.submatches.clone());

    let outcome = catch_unwind(AssertUnwindSafe(|| (cmd.handler)(&mut delegate)));

    match outcome {
        Ok(()) => {
            let response = delegate.into_response();
            if response.is_empty() {
                None
            } else {
                Some(response)
            }
        }
        Err(_) => {
            error!(
                plugin = %cmd.plugin,
                command = %cmd.command,
                "command handler panicked, dropping any reply"
            );
            None
        }
    }
}
