//! Echo Bot Demo
//!
//! A console bot wiring the full flux pipeline: a stdin/stdout adapter plus
//! `ping` and `echo` plugins, all registered through the compiled-in
//! extension tables and enabled by name.
//!
//! # Usage
//!
//! ```bash
//! cargo run --package echo-bot
//! ```
//!
//! Then type commands:
//!
//! ```text
//! !ping
//! [console] pong
//! !echo hello world
//! [console] hello world
//! ```

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use linkme::distributed_slice;
use regex::Regex;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

use flux::prelude::*;

// ============================================================================
// Console Adapter
// ============================================================================

/// Adapter that reads raw messages from stdin and prints replies to stdout.
struct ConsoleAdapter;

#[async_trait]
impl Adapter for ConsoleAdapter {
    fn name(&self) -> &str {
        "console"
    }

    async fn listen(&self, tx: mpsc::Sender<RawIngressMessage>) -> AdapterResult<()> {
        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let message = RawIngressMessage::new("console-user", "console", line);
                if tx.send(message).await.is_err() {
                    break;
                }
            }
            debug!("stdin closed, console adapter ending");
        });
        Ok(())
    }

    async fn send_message(&self, message: EgressMessage) -> AdapterResult<()> {
        println!("[{}] {}", message.channel_id, message.content);
        Ok(())
    }
}

fn console_adapter() -> LoadResult<BoxedAdapter> {
    Ok(Arc::new(ConsoleAdapter))
}

#[distributed_slice(ADAPTER_FACTORIES)]
static CONSOLE: AdapterRegistration = AdapterRegistration {
    name: "console",
    factory: console_adapter,
};

// ============================================================================
// Plugins
// ============================================================================

fn ping_plugin() -> LoadResult<BoxedPlugin> {
    let manifest = CmdManifest::new().cmd(
        "ping",
        Regex::new("^ping$")?,
        |delegate: &mut CmdDelegate| {
            delegate.respond("pong");
        },
    );
    Ok(Arc::new(ManifestPlugin::new("ping", manifest)))
}

#[distributed_slice(PLUGIN_FACTORIES)]
static PING: PluginRegistration = PluginRegistration {
    name: "ping",
    factory: ping_plugin,
};

fn echo_plugin() -> LoadResult<BoxedPlugin> {
    let manifest = CmdManifest::new().cmd(
        "echo",
        Regex::new("^echo (.+)$")?,
        |delegate: &mut CmdDelegate| {
            if let Some(text) = delegate.submatch(1) {
                delegate.respond(text.to_string());
            }
        },
    );
    Ok(Arc::new(ManifestPlugin::new("echo", manifest)))
}

#[distributed_slice(PLUGIN_FACTORIES)]
static ECHO: PluginRegistration = PluginRegistration {
    name: "echo",
    factory: echo_plugin,
};

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    // Enable the demo extensions programmatically; a flux.toml in the
    // working directory (or FLUX_* environment variables) can still
    // override the engine and logging sections.
    let runtime = FluxRuntime::builder()
        .merge(FluxConfig {
            extensions: ExtensionsConfig {
                plugins: vec!["ping".into(), "echo".into()],
                adapters: vec!["console".into()],
            },
            ..FluxConfig::default()
        })
        .build()?;

    runtime.run().await?;

    Ok(())
}
