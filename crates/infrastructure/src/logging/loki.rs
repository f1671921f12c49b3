//! Loki log shipping
//!
//! A `tracing-subscriber` layer enriches each event and queues it as a JSON
//! line. A background worker batches the queue and pushes it to
//! `{endpoint}/loki/api/v1/push`, labelled with the application identity and
//! the event level.

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tracing::{Event, Subscriber, debug, warn};
use tracing_subscriber::{Layer, layer::Context};

use super::{LoggingError, enricher::ApplicationEnricher, record::LogRecord};

/// Target used by the worker for its own diagnostics; never shipped
pub const WORKER_TARGET: &str = "loki_push";

/// Events from these targets are not shipped; the HTTP stack used for pushing
/// would otherwise feed its own logs back into the queue.
const IGNORED_TARGET_PREFIXES: &[&str] = &[
    WORKER_TARGET,
    "reqwest",
    "hyper",
    "h2",
    "tonic",
    "tower::",
    "rustls",
    "opentelemetry",
];

const PUSH_PATH: &str = "/loki/api/v1/push";

/// Configuration for the Loki sink
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LokiConfig {
    /// Whether logs are shipped to Loki
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Base URL of the Loki server
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Push as soon as this many entries are queued
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Push whatever is queued at least this often
    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,

    /// Entries buffered before new ones are dropped
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// HTTP timeout for a single push
    #[serde(default = "default_push_timeout_secs")]
    pub push_timeout_secs: u64,
}

const fn default_enabled() -> bool {
    true
}

fn default_endpoint() -> String {
    "http://localhost:3100".to_string()
}

const fn default_batch_size() -> usize {
    100
}

const fn default_flush_interval_ms() -> u64 {
    1000
}

const fn default_queue_capacity() -> usize {
    4096
}

const fn default_push_timeout_secs() -> u64 {
    5
}

impl Default for LokiConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            endpoint: default_endpoint(),
            batch_size: default_batch_size(),
            flush_interval_ms: default_flush_interval_ms(),
            queue_capacity: default_queue_capacity(),
            push_timeout_secs: default_push_timeout_secs(),
        }
    }
}

/// One queued log line
#[derive(Debug, Clone, PartialEq, Eq)]
struct LokiEntry {
    level: &'static str,
    timestamp_ns: String,
    line: String,
}

impl LokiEntry {
    fn from_record(record: &LogRecord) -> Self {
        Self {
            level: record.level_name(),
            timestamp_ns: record
                .timestamp
                .timestamp_nanos_opt()
                .unwrap_or_default()
                .to_string(),
            line: record.to_json().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct PushRequest<'a> {
    streams: Vec<PushStream<'a>>,
}

#[derive(Debug, Serialize)]
struct PushStream<'a> {
    stream: BTreeMap<&'a str, &'a str>,
    values: Vec<[&'a str; 2]>,
}

/// Build the push body, one stream per level
fn push_request<'a>(
    labels: &'a BTreeMap<String, String>,
    entries: &'a [LokiEntry],
) -> PushRequest<'a> {
    let mut by_level: BTreeMap<&'static str, Vec<[&'a str; 2]>> = BTreeMap::new();
    for entry in entries {
        by_level
            .entry(entry.level)
            .or_default()
            .push([entry.timestamp_ns.as_str(), entry.line.as_str()]);
    }

    let streams = by_level
        .into_iter()
        .map(|(level, values)| {
            let mut stream: BTreeMap<&str, &str> = labels
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect();
            stream.insert("level", level);
            PushStream { stream, values }
        })
        .collect();

    PushRequest { streams }
}

fn is_ignored_target(target: &str) -> bool {
    IGNORED_TARGET_PREFIXES
        .iter()
        .any(|prefix| target.starts_with(prefix))
}

/// Layer that queues enriched events for the Loki worker
#[derive(Debug)]
pub struct LokiLayer {
    sender: mpsc::Sender<LokiEntry>,
    enricher: Arc<ApplicationEnricher>,
}

impl<S: Subscriber> Layer<S> for LokiLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if is_ignored_target(event.metadata().target()) {
            return;
        }

        let mut record = LogRecord::from_event(event);
        self.enricher.enrich(&mut record);

        // A full queue drops the entry rather than blocking the caller
        let _ = self.sender.try_send(LokiEntry::from_record(&record));
    }
}

struct LokiWorker {
    client: reqwest::Client,
    push_url: String,
    labels: BTreeMap<String, String>,
    receiver: mpsc::Receiver<LokiEntry>,
    batch_size: usize,
    flush_interval: Duration,
}

impl LokiWorker {
    async fn run(mut self, mut shutdown: oneshot::Receiver<()>) {
        let mut buffer = Vec::with_capacity(self.batch_size);
        let mut ticker = tokio::time::interval(self.flush_interval);

        loop {
            tokio::select! {
                received = self.receiver.recv() => match received {
                    Some(entry) => {
                        buffer.push(entry);
                        if buffer.len() >= self.batch_size {
                            self.flush(&mut buffer).await;
                        }
                    },
                    None => break,
                },
                _ = ticker.tick() => self.flush(&mut buffer).await,
                _ = &mut shutdown => {
                    while let Ok(entry) = self.receiver.try_recv() {
                        buffer.push(entry);
                    }
                    break;
                },
            }
        }

        self.flush(&mut buffer).await;
        debug!(target: WORKER_TARGET, "Loki worker stopped");
    }

    async fn flush(&self, buffer: &mut Vec<LokiEntry>) {
        if buffer.is_empty() {
            return;
        }

        let result = {
            let body = push_request(&self.labels, buffer.as_slice());
            self.client.post(&self.push_url).json(&body).send().await
        };

        match result {
            Ok(response) if !response.status().is_success() => {
                warn!(
                    target: WORKER_TARGET,
                    status = %response.status(),
                    dropped = buffer.len(),
                    "Loki rejected log push"
                );
            },
            Ok(_) => {},
            Err(e) => {
                warn!(
                    target: WORKER_TARGET,
                    error = %e,
                    dropped = buffer.len(),
                    "Failed to push logs to Loki"
                );
            },
        }
        buffer.clear();
    }
}

/// Handle used to stop the worker and flush what is queued
#[derive(Debug)]
pub struct LokiHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl LokiHandle {
    /// Signal the worker, then wait up to `timeout` for the final push
    pub async fn shutdown(self, timeout: Duration) {
        let _ = self.shutdown.send(());
        if tokio::time::timeout(timeout, self.task).await.is_err() {
            warn!(target: WORKER_TARGET, "Timed out flushing logs to Loki");
        }
    }
}

/// Create the Loki layer and spawn its worker on the current Tokio runtime
pub fn spawn_loki(
    config: &LokiConfig,
    enricher: Arc<ApplicationEnricher>,
) -> Result<(LokiLayer, LokiHandle), LoggingError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.push_timeout_secs))
        .build()
        .map_err(|e| LoggingError::Client(e.to_string()))?;

    let labels = BTreeMap::from([
        ("appId".to_string(), enricher.application_id().to_string()),
        ("appName".to_string(), enricher.application_name().to_string()),
        ("env".to_string(), enricher.environment().to_string()),
    ]);

    let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let worker = LokiWorker {
        client,
        push_url: format!("{}{PUSH_PATH}", config.endpoint.trim_end_matches('/')),
        labels,
        receiver,
        batch_size: config.batch_size.max(1),
        flush_interval: Duration::from_millis(config.flush_interval_ms.max(1)),
    };
    let task = tokio::spawn(worker.run(shutdown_rx));

    Ok((
        LokiLayer { sender, enricher },
        LokiHandle {
            shutdown: shutdown_tx,
            task,
        },
    ))
}
