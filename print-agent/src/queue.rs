//! FIFO print queue with deduplication and retry
//!
//! Flow: `enqueue(order)` -> dedup check -> push -> wake the drain worker.
//! Draining is single-flight: at most one job is rendered and dispatched
//! at any instant, so failures always have an unambiguous printer. A
//! failed job goes back to the *head* of the queue after a fixed delay,
//! up to the retry bound; then it is discarded with a terminal log entry.

use crate::dispatch::Dispatcher;
use crate::registry::{PrinterRegistry, RoutingError};
use crate::renderer;
use chrono::Utc;
use cupom_printer::TransportError;
use parking_lot::Mutex;
use shared::{DeliveryAddress, Order, OrderItem, Payment};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Notify;
use tracing::{error, info, warn};

pub const MAX_RETRIES: u32 = 3;
pub const RETRY_DELAY: Duration = Duration::from_secs(5);
pub const DEDUP_TTL: Duration = Duration::from_secs(30);

/// Company-wide fallbacks applied when the order or printer lack their own
#[derive(Debug, Clone, Default)]
pub struct ReceiptDefaults {
    pub header_name: Option<String>,
    pub header_city: Option<String>,
    pub template: Option<String>,
}

/// One unit of print work
#[derive(Debug, Clone)]
pub struct PrintJob {
    pub order: Order,
    pub is_test: bool,
    pub test_printer_id: Option<String>,
    pub retries: u32,
    pub enqueued_at: Instant,
    pub dedup_key: String,
}

/// All mutable queue state, owned by one [`JobQueue`] instance
#[derive(Default)]
struct QueueState {
    jobs: VecDeque<PrintJob>,
    /// dedup key -> last time it was enqueued
    recent: HashMap<String, Instant>,
    /// single-flight guard over the drain loop
    processing: bool,
}

enum JobError {
    Routing(RoutingError),
    Transport {
        printer: String,
        source: TransportError,
    },
}

pub struct JobQueue {
    state: Mutex<QueueState>,
    notify: Notify,
    registry: Arc<PrinterRegistry>,
    dispatcher: Arc<dyn Dispatcher>,
    defaults: ReceiptDefaults,
    retry_delay: Duration,
    dedup_ttl: Duration,
}

impl JobQueue {
    /// Create the queue and start its resident drain worker
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(
        registry: Arc<PrinterRegistry>,
        dispatcher: Arc<dyn Dispatcher>,
        defaults: ReceiptDefaults,
    ) -> Arc<Self> {
        Self::with_policy(registry, dispatcher, defaults, RETRY_DELAY, DEDUP_TTL)
    }

    /// Queue with explicit retry/dedup timing (tests use short windows)
    pub fn with_policy(
        registry: Arc<PrinterRegistry>,
        dispatcher: Arc<dyn Dispatcher>,
        defaults: ReceiptDefaults,
        retry_delay: Duration,
        dedup_ttl: Duration,
    ) -> Arc<Self> {
        let queue = Arc::new(Self {
            state: Mutex::new(QueueState::default()),
            notify: Notify::new(),
            registry,
            dispatcher,
            defaults,
            retry_delay,
            dedup_ttl,
        });

        let worker = Arc::clone(&queue);
        tokio::spawn(async move { worker.drain_loop().await });

        queue
    }

    /// Enqueue an order, unless it is a duplicate delivery
    pub fn enqueue(&self, order: Order) {
        let key = dedup_key(&order);
        {
            let mut state = self.state.lock();
            let now = Instant::now();

            // evict expired entries so the map stays bounded
            let ttl = self.dedup_ttl;
            state.recent.retain(|_, seen| now.duration_since(*seen) < ttl);

            if state.recent.contains_key(&key) {
                warn!(dedup_key = %key, "duplicate order ignored");
                return;
            }
            state.recent.insert(key.clone(), now);

            info!(dedup_key = %key, "order enqueued");
            state.jobs.push_back(PrintJob {
                order,
                is_test: false,
                test_printer_id: None,
                retries: 0,
                enqueued_at: now,
                dedup_key: key,
            });
        }
        self.notify.notify_one();
    }

    /// Enqueue a synthetic test print, bypassing deduplication
    ///
    /// With a printer id the job targets that single printer; without one
    /// it routes like a normal order.
    pub fn enqueue_test(&self, printer_id: Option<String>) -> Result<(), String> {
        if let Some(id) = &printer_id
            && self.registry.printer_by_id(id).is_none()
        {
            return Err(format!("printer not found: {}", id));
        }

        let order = build_test_order(&self.defaults);
        let key = dedup_key(&order);
        info!(dedup_key = %key, printer_id = ?printer_id, "test print enqueued");

        {
            let mut state = self.state.lock();
            state.jobs.push_back(PrintJob {
                order,
                is_test: true,
                test_printer_id: printer_id,
                retries: 0,
                enqueued_at: Instant::now(),
                dedup_key: key,
            });
        }
        self.notify.notify_one();
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.state.lock().jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().jobs.is_empty()
    }

    /// Wait until the queue has no jobs and nothing is processing
    pub async fn wait_idle(&self) {
        loop {
            {
                let state = self.state.lock();
                if state.jobs.is_empty() && !state.processing {
                    return;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    /// Resident worker: woken on enqueue, drains until the queue is empty
    async fn drain_loop(self: Arc<Self>) {
        loop {
            self.notify.notified().await;
            self.drain().await;
        }
    }

    /// Serialized drain
    ///
    /// The `processing` flag keeps this single-flight even if a second
    /// drain is ever triggered concurrently.
    async fn drain(&self) {
        loop {
            let mut job = {
                let mut state = self.state.lock();
                if state.processing {
                    return;
                }
                let Some(job) = state.jobs.pop_front() else {
                    return;
                };
                state.processing = true;
                job
            };

            match self.process_job(&job).await {
                Ok(()) => {
                    self.state.lock().processing = false;
                }
                Err(JobError::Routing(e)) => {
                    // retrying cannot change the routing outcome
                    warn!(dedup_key = %job.dedup_key, error = %e, "job dropped");
                    self.state.lock().processing = false;
                }
                Err(JobError::Transport { printer, source }) => {
                    error!(
                        dedup_key = %job.dedup_key,
                        printer = %printer,
                        error = %source,
                        "print job failed"
                    );
                    if job.retries < MAX_RETRIES {
                        job.retries += 1;
                        info!(
                            dedup_key = %job.dedup_key,
                            attempt = job.retries,
                            max = MAX_RETRIES,
                            "rescheduling job at queue head"
                        );
                        // the queue stalls for the delay; single-flight holds
                        tokio::time::sleep(self.retry_delay).await;
                        let mut state = self.state.lock();
                        state.jobs.push_front(job);
                        state.processing = false;
                    } else {
                        error!(
                            dedup_key = %job.dedup_key,
                            "job discarded after {} retries",
                            MAX_RETRIES
                        );
                        self.state.lock().processing = false;
                    }
                }
            }

            // yield between jobs so the event channel stays responsive
            tokio::task::yield_now().await;
        }
    }

    async fn process_job(&self, job: &PrintJob) -> Result<(), JobError> {
        let targets = if job.is_test && job.test_printer_id.is_some() {
            let id = job.test_printer_id.as_deref().unwrap_or_default();
            self.registry.printer_by_id(id).into_iter().collect()
        } else {
            self.registry.target_printers_for(&job.order)
        };

        if targets.is_empty() {
            return Err(JobError::Routing(RoutingError));
        }

        // local header fallbacks when the backend sent none
        let mut order = job.order.clone();
        if order.header_name.is_none() {
            order.header_name = self.defaults.header_name.clone();
        }
        if order.header_city.is_none() {
            order.header_city = self.defaults.header_city.clone();
        }

        for target in targets.iter().filter(|p| p.enabled) {
            // company template when the printer has none of its own
            let mut printer = target.clone();
            if printer.template.is_none() {
                printer.template = self.defaults.template.clone();
            }

            let document = renderer::render(&order, &printer);

            let copies = printer.copies.max(1);
            for _ in 0..copies {
                self.dispatcher
                    .dispatch(&printer, &document)
                    .await
                    .map_err(|source| JobError::Transport {
                        printer: printer.alias.clone(),
                        source,
                    })?;
            }
            info!(
                printer = %printer.alias,
                copies,
                bytes = document.len(),
                "printed"
            );
        }

        Ok(())
    }
}

/// Dedup key: order id, else display id, else the creation timestamp
fn dedup_key(order: &Order) -> String {
    order
        .id
        .clone()
        .or_else(|| order.display_id.clone())
        .unwrap_or_else(|| {
            order
                .created_at
                .map(|t| t.timestamp_millis())
                .unwrap_or_else(|| Utc::now().timestamp_millis())
                .to_string()
        })
}

/// Fixed test order used by test-print requests
pub fn build_test_order(defaults: &ReceiptDefaults) -> Order {
    let loja = defaults
        .header_name
        .clone()
        .unwrap_or_else(|| "Delivery SaaS".to_string());

    Order {
        id: Some(format!("TEST-{}", Utc::now().timestamp_millis())),
        display_id: Some("TESTE".to_string()),
        created_at: Some(Utc::now()),
        order_type: Some("delivery".to_string()),
        customer_name: Some("Cliente Teste".to_string()),
        customer_phone: Some("(71) 99999-9999".to_string()),
        delivery_address: Some(DeliveryAddress {
            street: Some("Rua Exemplo".to_string()),
            number: Some("123".to_string()),
            neighborhood: Some("Centro".to_string()),
            city: Some("Salvador".to_string()),
            ..Default::default()
        }),
        items: vec![
            OrderItem {
                name: "X-Burguer".to_string(),
                quantity: 1,
                price: 2500,
                notes: Some("Sem cebola".to_string()),
                ..Default::default()
            },
            OrderItem {
                name: "Coca-Cola 350ml".to_string(),
                quantity: 2,
                price: 600,
                ..Default::default()
            },
        ],
        payments: vec![Payment {
            method: "Dinheiro".to_string(),
            value: 4200,
        }],
        subtotal: 3700,
        delivery_fee: 500,
        discount: 0,
        total: 4200,
        notes: Some("Pedido de teste".to_string()),
        qr_text: Some("https://app.deliverywl.com.br/orders/test".to_string()),
        header_name: Some(loja.clone()),
        store_name: Some(loja),
        header_city: defaults.header_city.clone(),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_key_prefers_id() {
        let order = Order {
            id: Some("abc".to_string()),
            display_id: Some("42".to_string()),
            ..Default::default()
        };
        assert_eq!(dedup_key(&order), "abc");
    }

    #[test]
    fn test_dedup_key_falls_back_to_display_id() {
        let order = Order {
            display_id: Some("42".to_string()),
            ..Default::default()
        };
        assert_eq!(dedup_key(&order), "42");
    }

    #[test]
    fn test_dedup_key_timestamp_fallback() {
        let order = Order::default();
        // no id at all: key is a millisecond timestamp
        assert!(dedup_key(&order).parse::<i64>().is_ok());
    }

    #[test]
    fn test_build_test_order_totals() {
        let order = build_test_order(&ReceiptDefaults::default());
        assert_eq!(order.display_id.as_deref(), Some("TESTE"));
        assert_eq!(order.total, 4200);
        assert_eq!(order.items_total(), 3700);
        assert_eq!(order.header_name.as_deref(), Some("Delivery SaaS"));
    }

    #[test]
    fn test_build_test_order_uses_configured_header() {
        let defaults = ReceiptDefaults {
            header_name: Some("Pizzaria do Zé".to_string()),
            ..Default::default()
        };
        let order = build_test_order(&defaults);
        assert_eq!(order.header_name.as_deref(), Some("Pizzaria do Zé"));
    }
}
