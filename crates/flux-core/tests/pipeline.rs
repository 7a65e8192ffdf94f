//! End-to-end pipeline tests: scripted adapters in, recorded egress out.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use regex::Regex;
use tokio::sync::mpsc;

use flux_core::{
    Adapter, AdapterResult, Classifier, CmdDelegate, CmdManifest, Engine, EngineOptions,
    EgressMessage, ManifestPlugin, RawIngressMessage, RegistryBuilder,
};

/// Adapter that plays a fixed script of inbound messages and records every
/// outbound message it is asked to send.
struct ScriptedAdapter {
    name: String,
    script: Vec<RawIngressMessage>,
    sent: Arc<Mutex<Vec<EgressMessage>>>,
}

impl ScriptedAdapter {
    fn new(name: &str, script: Vec<RawIngressMessage>) -> (Self, Arc<Mutex<Vec<EgressMessage>>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                name: name.into(),
                script,
                sent: Arc::clone(&sent),
            },
            sent,
        )
    }
}

#[async_trait]
impl Adapter for ScriptedAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn listen(&self, tx: mpsc::Sender<RawIngressMessage>) -> AdapterResult<()> {
        let script = self.script.clone();
        tokio::spawn(async move {
            for message in script {
                if tx.send(message).await.is_err() {
                    break;
                }
            }
            // Sender drops here: the engine sees a permanent disconnect.
        });
        Ok(())
    }

    async fn send_message(&self, message: EgressMessage) -> AdapterResult<()> {
        self.sent.lock().push(message);
        Ok(())
    }
}

/// Classifier that flags everything as a command, used to provoke the
/// trigger-mismatch defence.
struct EagerClassifier;

impl Classifier for EagerClassifier {
    fn is_command(&self, _raw_content: &str) -> bool {
        true
    }
}

fn raw(content: &str) -> RawIngressMessage {
    RawIngressMessage::new("ferris", "#general", content)
}

fn ping_plugin() -> ManifestPlugin {
    ManifestPlugin::new(
        "ping",
        CmdManifest::new().cmd("ping", Regex::new("^ping$").unwrap(), |d: &mut CmdDelegate| {
            d.respond("pong");
        }),
    )
}

async fn wait_for(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

/// Lets already-ingested messages finish flowing before a negative assertion.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(100)).await;
}

#[tokio::test]
async fn ping_command_round_trips_to_origin_channel() {
    let (adapter, sent) = ScriptedAdapter::new("irc", vec![raw("!ping")]);

    let mut builder = RegistryBuilder::new();
    builder.insert_plugin(Arc::new(ping_plugin()));
    builder.insert_adapter(Arc::new(adapter));

    let handle = Engine::new(builder.build(), EngineOptions::default())
        .start()
        .await;

    wait_for(|| !sent.lock().is_empty()).await;
    {
        let sent = sent.lock();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].content, "pong");
        assert_eq!(sent[0].channel_id, "#general");
    }

    handle.shutdown().await;
}

#[tokio::test]
async fn non_command_produces_no_traffic() {
    // "hello" carries no trigger; "!ping" is the control that proves the
    // pipeline ran.
    let (adapter, sent) = ScriptedAdapter::new("irc", vec![raw("hello"), raw("!ping")]);

    let mut builder = RegistryBuilder::new();
    builder.insert_plugin(Arc::new(ping_plugin()));
    builder.insert_adapter(Arc::new(adapter));

    let handle = Engine::new(builder.build(), EngineOptions::default())
        .start()
        .await;

    wait_for(|| !sent.lock().is_empty()).await;
    settle().await;
    assert_eq!(sent.lock().len(), 1);
    assert_eq!(sent.lock()[0].content, "pong");

    handle.shutdown().await;
}

#[tokio::test]
async fn wrong_trigger_is_dropped_even_when_classified_as_command() {
    // The classifier flags everything, the trigger is '#': "!ping" must be
    // dropped by the trigger check while "#ping" goes through.
    let (adapter, sent) = ScriptedAdapter::new("irc", vec![raw("!ping"), raw("#ping")]);

    let mut builder = RegistryBuilder::new();
    builder.insert_plugin(Arc::new(ping_plugin()));
    builder.insert_adapter(Arc::new(adapter));

    let options = EngineOptions {
        trigger: '#',
        ..EngineOptions::default()
    };
    let handle = Engine::new(builder.build(), options)
        .with_classifier(Arc::new(EagerClassifier))
        .start()
        .await;

    wait_for(|| !sent.lock().is_empty()).await;
    settle().await;
    assert_eq!(sent.lock().len(), 1);

    handle.shutdown().await;
}

#[tokio::test]
async fn every_matching_plugin_replies() {
    let (adapter, sent) = ScriptedAdapter::new("irc", vec![raw("!status")]);

    let watcher = ManifestPlugin::new(
        "watcher",
        CmdManifest::new().cmd("status", Regex::new("^status$").unwrap(), |d: &mut CmdDelegate| {
            d.respond("watcher: all green");
        }),
    );
    let pager = ManifestPlugin::new(
        "pager",
        CmdManifest::new().cmd("status", Regex::new("status").unwrap(), |d: &mut CmdDelegate| {
            d.respond("pager: no incidents");
        }),
    );

    let mut builder = RegistryBuilder::new();
    builder.insert_plugin(Arc::new(watcher));
    builder.insert_plugin(Arc::new(pager));
    builder.insert_adapter(Arc::new(adapter));

    let handle = Engine::new(builder.build(), EngineOptions::default())
        .start()
        .await;

    wait_for(|| sent.lock().len() == 2).await;
    let mut replies: Vec<_> = sent.lock().iter().map(|m| m.content.clone()).collect();
    replies.sort();
    assert_eq!(replies, ["pager: no incidents", "watcher: all green"]);

    handle.shutdown().await;
}

#[tokio::test]
async fn invocation_count_matches_pattern_matches() {
    let invocations = Arc::new(AtomicUsize::new(0));

    // Three patterns match "!deploy now": two respond, one stays silent.
    let (c1, c2, c3) = (
        Arc::clone(&invocations),
        Arc::clone(&invocations),
        Arc::clone(&invocations),
    );
    let plugin = ManifestPlugin::new(
        "deploy",
        CmdManifest::new()
            .cmd("deploy", Regex::new("^deploy").unwrap(), move |d: &mut CmdDelegate| {
                c1.fetch_add(1, Ordering::SeqCst);
                d.respond("deploying");
            })
            .cmd("audit", Regex::new("deploy").unwrap(), move |_d: &mut CmdDelegate| {
                c2.fetch_add(1, Ordering::SeqCst);
            })
            .cmd("when", Regex::new("now$").unwrap(), move |d: &mut CmdDelegate| {
                c3.fetch_add(1, Ordering::SeqCst);
                d.respond("right away");
            }),
    );

    let (adapter, sent) = ScriptedAdapter::new("irc", vec![raw("!deploy now")]);

    let mut builder = RegistryBuilder::new();
    builder.insert_plugin(Arc::new(plugin));
    builder.insert_adapter(Arc::new(adapter));

    let handle = Engine::new(builder.build(), EngineOptions::default())
        .start()
        .await;

    wait_for(|| sent.lock().len() == 2).await;
    settle().await;
    assert_eq!(invocations.load(Ordering::SeqCst), 3);
    assert_eq!(sent.lock().len(), 2);

    handle.shutdown().await;
}

#[tokio::test]
async fn panicking_handler_does_not_take_down_siblings() {
    let boom = ManifestPlugin::new(
        "boom",
        CmdManifest::new().cmd("boom", Regex::new("status").unwrap(), |_d: &mut CmdDelegate| {
            panic!("handler exploded");
        }),
    );
    let steady = ManifestPlugin::new(
        "steady",
        CmdManifest::new().cmd("status", Regex::new("^status$").unwrap(), |d: &mut CmdDelegate| {
            d.respond("still here");
        }),
    );

    let (adapter, sent) = ScriptedAdapter::new("irc", vec![raw("!status"), raw("!status")]);

    let mut builder = RegistryBuilder::new();
    builder.insert_plugin(Arc::new(boom));
    builder.insert_plugin(Arc::new(steady));
    builder.insert_adapter(Arc::new(adapter));

    let handle = Engine::new(builder.build(), EngineOptions::default())
        .start()
        .await;

    // Both messages must still produce the steady plugin's reply.
    wait_for(|| sent.lock().len() == 2).await;
    assert!(sent.lock().iter().all(|m| m.content == "still here"));

    handle.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn fan_in_loses_nothing_across_adapters() {
    const ADAPTERS: usize = 3;
    const MESSAGES: usize = 40;

    let echo = ManifestPlugin::new(
        "echo",
        CmdManifest::new().cmd("echo", Regex::new("^echo (.+)$").unwrap(), |d: &mut CmdDelegate| {
            if let Some(text) = d.submatch(1) {
                d.respond(text.to_string());
            }
        }),
    );

    let mut builder = RegistryBuilder::new();
    builder.insert_plugin(Arc::new(echo));

    let mut recorders = Vec::new();
    for a in 0..ADAPTERS {
        let name = format!("adapter-{a}");
        let script = (0..MESSAGES)
            .map(|m| raw(&format!("!echo {name}:{m}")))
            .collect();
        let (adapter, sent) = ScriptedAdapter::new(&name, script);
        builder.insert_adapter(Arc::new(adapter));
        recorders.push((name, sent));
    }

    // Small buffers so the test actually exercises backpressure.
    let options = EngineOptions {
        buffer_size: 4,
        adapter_channel_size: 2,
        trigger: '!',
    };
    let handle = Engine::new(builder.build(), options).start().await;

    futures::future::join_all(recorders.iter().map(|(_, sent)| {
        let sent = Arc::clone(sent);
        wait_for(move || sent.lock().len() == MESSAGES)
    }))
    .await;

    for (name, sent) in &recorders {
        let mut replies: Vec<_> = sent.lock().iter().map(|m| m.content.clone()).collect();
        replies.sort();
        let mut expected: Vec<_> = (0..MESSAGES).map(|m| format!("{name}:{m}")).collect();
        expected.sort();
        assert_eq!(replies, expected, "adapter {name} lost or misrouted replies");
    }

    handle.shutdown().await;
}

#[tokio::test]
async fn shutdown_drains_in_flight_work() {
    let (adapter, _sent) = ScriptedAdapter::new(
        "irc",
        (0..64).map(|i| raw(&format!("!echo {i}"))).collect(),
    );

    let echo = ManifestPlugin::new(
        "echo",
        CmdManifest::new().cmd("echo", Regex::new("^echo (.+)$").unwrap(), |d: &mut CmdDelegate| {
            if let Some(text) = d.submatch(1) {
                d.respond(text.to_string());
            }
        }),
    );

    let mut builder = RegistryBuilder::new();
    builder.insert_plugin(Arc::new(echo));
    builder.insert_adapter(Arc::new(adapter));

    let handle = Engine::new(builder.build(), EngineOptions::default())
        .start()
        .await;

    // Shut down mid-burst: must complete promptly, never hang on queued work.
    tokio::time::timeout(Duration::from_secs(5), handle.shutdown())
        .await
        .expect("shutdown hung");
}
