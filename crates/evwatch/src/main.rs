//! Demo harness for the evwatch pipeline.
//!
//! Drives a synthetic page through the full path: a tapped dispatcher posts
//! captures onto the page bus, a bridge relays them to the hub service, and
//! an attached panel store renders the result. Optionally writes the export
//! artifact to disk.

#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use evwatch_core::constants::{MAX_EVENTS, OBSERVER_PORT_NAME};
use evwatch_core::{CapturePolicy, EventRecord};
use evwatch_hook::{DetailValue, Dispatch, EventTarget, HostEvent, TapDispatcher};
use evwatch_panel::{ConsoleMirror, Downloader, ExportArtifact, PanelStore, format_time};
use evwatch_relay::{HubCommand, HubService, ObserverConnection, PageBridge, WatcherHub};

/// Silence on the observer channel that counts as pipeline quiescence.
const DRAIN_QUIET: Duration = Duration::from_millis(250);

#[derive(Debug, Parser)]
#[command(
    name = "evwatch",
    about = "Drive a synthetic page through the event-watcher pipeline"
)]
struct Args {
    /// Rounds of synthetic page activity; each round dispatches one batch.
    #[arg(long, default_value_t = 4)]
    rounds: usize,

    /// Hub ring-buffer capacity.
    #[arg(long, default_value_t = MAX_EVENTS)]
    capacity: usize,

    /// Capture builtin dispatches too, not only custom events.
    #[arg(long, default_value_t = false)]
    capture_all: bool,

    /// Case-insensitive search over name, detail, and target.
    #[arg(long, default_value = "")]
    search: String,

    /// Case-sensitive event-name prefix filter.
    #[arg(long, default_value = "")]
    prefix: String,

    /// Echo new events into the process log as they arrive.
    #[arg(long, default_value_t = false)]
    mirror: bool,

    /// Directory to write the export artifact into.
    #[arg(long)]
    export_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_subscriber("info");
    run(Args::parse()).await
}

async fn run(args: Args) -> Result<()> {
    let policy = CapturePolicy::new();
    let shutdown = CancellationToken::new();
    let hub = Arc::new(WatcherHub::with_capacity(args.capacity));

    let (commands_tx, commands_rx) = mpsc::channel(256);
    let service = HubService::new(Arc::clone(&hub), commands_rx, shutdown.clone());
    let service_handle = tokio::spawn(service.run());

    let page_id = format!("page_{}", Uuid::now_v7());
    let (bus_tx, bus_rx) = mpsc::channel(256);
    let bridge = PageBridge::new(page_id.clone(), bus_rx, commands_tx.clone(), shutdown.clone());
    let bridge_handle = tokio::spawn(bridge.run());

    // Attach before dispatching so the panel sees every capture live.
    let (observer_tx, mut observer_rx) = mpsc::channel(256);
    commands_tx
        .send(HubCommand::Attach(ObserverConnection::new(
            OBSERVER_PORT_NAME,
            observer_tx,
        )))
        .await
        .context("hub service is not accepting commands")?;

    let mut panel = PanelStore::new().with_policy(policy.clone());
    if args.mirror {
        panel = panel.with_mirror(Box::new(TraceMirror));
        panel.set_mirror_to_console(true);
    }
    panel.set_search(args.search);
    panel.set_prefix(args.prefix);
    if args.capture_all {
        let _ = panel.toggle_capture_all();
    }

    let mut page = TapDispatcher::new(HostPage::default(), policy, bus_tx, page_id);
    let mut dispatched = 0u64;
    for round in 0..args.rounds {
        for event in synthetic_batch(round) {
            let _ = page.dispatch(&event);
            dispatched += 1;
        }
    }
    info!(
        dispatched,
        captured = page.captured(),
        delivered = page.inner().delivered,
        "synthetic page finished"
    );

    // Captures are fire-and-forget, so quiet means done.
    loop {
        match timeout(DRAIN_QUIET, observer_rx.recv()).await {
            Ok(Some(message)) => panel.apply(message),
            Ok(None) | Err(_) => break,
        }
    }

    info!(
        buffered = hub.len(),
        observers = hub.observer_count(),
        "hub state after run"
    );
    println!(
        "panel: {} total, {} filtered, showing {}",
        panel.total(),
        panel.filtered_len(),
        panel.displayed().len()
    );
    for record in panel.displayed() {
        println!(
            "{:>5}  {}  {:<16} {:<18} {}",
            record.id,
            format_time(record.ts),
            record.name,
            record.target,
            record.detail
        );
    }

    if let Some(dir) = args.export_dir {
        let artifact = panel.export_events(Utc::now()).context("building export artifact")?;
        let mut downloader = FsDownloader::new(&dir);
        downloader
            .download(&artifact)
            .with_context(|| format!("failed to write export into {}", dir.display()))?;
        println!("{}", dir.join(&artifact.filename).display());
    }

    shutdown.cancel();
    bridge_handle.await.context("page bridge task panicked")?;
    service_handle.await.context("hub service task panicked")?;
    Ok(())
}

fn init_subscriber(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact();

    // try_init is a no-op if a subscriber is already set
    let _ = subscriber.try_init();
}

/// The page's own handling of a dispatch.
#[derive(Debug, Default)]
struct HostPage {
    delivered: u64,
}

impl Dispatch for HostPage {
    fn dispatch(&mut self, event: &HostEvent) -> bool {
        self.delivered += 1;
        debug!(event = %event.name, "page delivered event to its listeners");
        true
    }
}

/// Echoes new events into the process log.
struct TraceMirror;

impl ConsoleMirror for TraceMirror {
    fn mirror(&mut self, record: &EventRecord) {
        info!(
            event_id = record.id,
            name = %record.name,
            detail = %record.detail,
            "mirrored event"
        );
    }
}

/// Writes export artifacts into a downloads directory.
struct FsDownloader {
    dir: PathBuf,
}

impl FsDownloader {
    fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Downloader for FsDownloader {
    fn download(&mut self, artifact: &ExportArtifact) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.dir.join(&artifact.filename), &artifact.bytes)
    }
}

/// One batch of representative page activity.
///
/// Covers the serializer's interesting corners: nested objects, a date, a
/// float, a cyclic detail, a depth-limited tree, and one builtin dispatch
/// that is only captured under capture-all.
fn synthetic_batch(round: usize) -> Vec<HostEvent> {
    let linked = DetailValue::shared_cell(DetailValue::Null);
    *linked.borrow_mut() = DetailValue::object([
        ("name", DetailValue::text("head")),
        ("next", DetailValue::shared(&linked)),
    ]);

    vec![
        HostEvent::custom(
            "cart:add",
            DetailValue::object([
                ("sku", DetailValue::text("oat-milk")),
                ("qty", DetailValue::Int(2)),
                ("round", DetailValue::Int(round as i64)),
            ]),
        )
        .with_target(EventTarget::element("BUTTON").with_id("add-to-cart")),
        HostEvent::custom(
            "form.submit",
            DetailValue::object([
                ("fields", DetailValue::Int(3)),
                ("valid", DetailValue::Bool(true)),
            ]),
        )
        .with_target(EventTarget::element("FORM").with_classes("checkout narrow")),
        HostEvent::custom(
            "sync:progress",
            DetailValue::object([
                ("done", DetailValue::Float(0.5)),
                ("at", DetailValue::Date(Utc::now())),
                (
                    "batches",
                    DetailValue::array([DetailValue::Int(1), DetailValue::Int(2)]),
                ),
            ]),
        ),
        HostEvent::custom(
            "settings:nested",
            DetailValue::object([(
                "l1",
                DetailValue::object([(
                    "l2",
                    DetailValue::object([("l3", DetailValue::Int(9))]),
                )]),
            )]),
        )
        .with_target(EventTarget::Document),
        HostEvent::custom("graph:linked", DetailValue::shared(&linked)),
        HostEvent::builtin("click")
            .with_target(EventTarget::element("DIV").with_classes("btn primary")),
    ]
}
