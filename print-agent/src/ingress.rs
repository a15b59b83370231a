//! Event ingress
//!
//! Persistent channel to the backend: consumes `new-order`, `test-print`
//! and `list-printers` events and acknowledges them. The queue only ever
//! sees the [`IngressHandler`] boundary; the wire client is a reconnecting
//! newline-delimited JSON connection with exponential backoff.

use crate::queue::JobQueue;
use crate::registry::PrinterRegistry;
use cupom_printer::SystemPrinter;
use serde::Deserialize;
use serde_json::json;
use shared::Order;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

const BACKOFF_FLOOR: Duration = Duration::from_secs(2);
const BACKOFF_CEIL: Duration = Duration::from_secs(60);
const BACKOFF_FACTOR: f64 = 1.5;

/// Reconnect backoff: floor 2s, ceiling 60s, x1.5 per failure
#[derive(Debug)]
pub struct Backoff {
    current: Duration,
}

impl Backoff {
    pub fn new() -> Self {
        Self {
            current: BACKOFF_FLOOR,
        }
    }

    /// Delay before the next attempt; grows until the ceiling
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = self.current.mul_f64(BACKOFF_FACTOR).min(BACKOFF_CEIL);
        delay
    }

    /// Back to the floor after a successful connect
    pub fn reset(&mut self) {
        self.current = BACKOFF_FLOOR;
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new()
    }
}

/// Test print request payload
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TestPrintRequest {
    pub printer_id: Option<String>,
}

/// Inbound event frames
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
enum InboundFrame {
    NewOrder {
        data: Order,
    },
    TestPrint {
        id: u64,
        #[serde(default)]
        data: TestPrintRequest,
    },
    ListPrinters {
        id: u64,
    },
}

/// Synchronous-result handlers over the queue and registry
///
/// Acknowledgments are plain `Result`s; nothing here depends on callback
/// ordering.
#[derive(Clone)]
pub struct IngressHandler {
    queue: Arc<JobQueue>,
    registry: Arc<PrinterRegistry>,
}

impl IngressHandler {
    pub fn new(queue: Arc<JobQueue>, registry: Arc<PrinterRegistry>) -> Self {
        Self { queue, registry }
    }

    pub fn handle_order(&self, order: Order) {
        info!(display_id = ?order.display_id, "order event received");
        self.queue.enqueue(order);
    }

    pub fn handle_test_print(&self, request: TestPrintRequest) -> Result<(), String> {
        self.queue.enqueue_test(request.printer_id)
    }

    pub async fn handle_list_printers(&self) -> Vec<SystemPrinter> {
        self.registry.list_system_printers().await
    }
}

/// Reconnecting event channel client
pub struct EventClient {
    server_addr: String,
    token: String,
    handler: IngressHandler,
}

impl EventClient {
    pub fn new(server_addr: &str, token: &str, handler: IngressHandler) -> Self {
        Self {
            server_addr: server_addr.to_string(),
            token: token.to_string(),
            handler,
        }
    }

    /// Run until cancelled, reconnecting with exponential backoff
    pub async fn run(&self, shutdown: CancellationToken) {
        let mut backoff = Backoff::new();

        loop {
            if shutdown.is_cancelled() {
                return;
            }

            match TcpStream::connect(&self.server_addr).await {
                Ok(stream) => {
                    info!(addr = %self.server_addr, "event channel connected");
                    backoff.reset();
                    if let Err(e) = self.serve(stream, &shutdown).await {
                        warn!(error = %e, "event channel closed");
                    }
                    if shutdown.is_cancelled() {
                        return;
                    }
                }
                Err(e) => {
                    warn!(addr = %self.server_addr, error = %e, "event channel connect failed");
                }
            }

            let delay = backoff.next_delay();
            info!(delay_ms = delay.as_millis() as u64, "reconnecting after delay");
            tokio::select! {
                _ = shutdown.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    async fn serve(&self, stream: TcpStream, shutdown: &CancellationToken) -> std::io::Result<()> {
        let (reader, mut writer) = stream.into_split();
        let mut lines = BufReader::new(reader).lines();

        // announce readiness so the backend flushes pending deliveries
        let hello = json!({"event": "agent-ready", "token": self.token});
        writer.write_all(format!("{}\n", hello).as_bytes()).await?;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => return Ok(()),
                line = lines.next_line() => {
                    let Some(line) = line? else { return Ok(()) };
                    if line.trim().is_empty() {
                        continue;
                    }
                    if let Some(ack) = self.handle_frame(&line).await {
                        writer.write_all(format!("{}\n", ack).as_bytes()).await?;
                    }
                }
            }
        }
    }

    async fn handle_frame(&self, line: &str) -> Option<serde_json::Value> {
        match serde_json::from_str::<InboundFrame>(line) {
            Ok(InboundFrame::NewOrder { data }) => {
                self.handler.handle_order(data);
                None
            }
            Ok(InboundFrame::TestPrint { id, data }) => {
                Some(match self.handler.handle_test_print(data) {
                    Ok(()) => json!({"ack": id, "ok": true}),
                    Err(error) => json!({"ack": id, "ok": false, "error": error}),
                })
            }
            Ok(InboundFrame::ListPrinters { id }) => {
                let printers = self.handler.handle_list_printers().await;
                Some(json!({"ack": id, "ok": true, "printers": printers}))
            }
            Err(e) => {
                warn!(error = %e, "unparseable event frame");
                None
            }
        }
    }
}
