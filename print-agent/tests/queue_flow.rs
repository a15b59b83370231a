//! End-to-end queue behavior against a fault-injecting transport stub

use async_trait::async_trait;
use cupom_printer::TransportError;
use parking_lot::Mutex;
use print_agent::dispatch::Dispatcher;
use print_agent::queue::{JobQueue, ReceiptDefaults};
use print_agent::registry::PrinterRegistry;
use shared::{Order, OrderItem, PrinterConfig};
use std::sync::Arc;
use std::time::Duration;

const RETRY_DELAY: Duration = Duration::from_millis(20);
const DEDUP_TTL: Duration = Duration::from_millis(80);

/// Records every dispatch attempt and fails for the configured aliases
struct StubDispatcher {
    attempts: Mutex<Vec<String>>,
    fail_aliases: Vec<String>,
}

impl StubDispatcher {
    fn new(fail_aliases: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            attempts: Mutex::new(Vec::new()),
            fail_aliases: fail_aliases.iter().map(|s| s.to_string()).collect(),
        })
    }

    fn attempts(&self) -> Vec<String> {
        self.attempts.lock().clone()
    }
}

#[async_trait]
impl Dispatcher for StubDispatcher {
    async fn dispatch(&self, printer: &PrinterConfig, data: &[u8]) -> Result<(), TransportError> {
        assert!(!data.is_empty(), "dispatch received an empty document");
        self.attempts.lock().push(printer.alias.clone());
        if self.fail_aliases.contains(&printer.alias) {
            Err(TransportError::SocketError(format!(
                "{} unreachable",
                printer.alias
            )))
        } else {
            Ok(())
        }
    }
}

fn printer(alias: &str, categories: &[&str]) -> PrinterConfig {
    let mut printer = PrinterConfig::network(alias, "10.0.0.1", 9100);
    printer.id = alias.to_string();
    printer.categories = categories.iter().map(|s| s.to_string()).collect();
    printer
}

fn order(id: &str, category: &str) -> Order {
    Order {
        id: Some(id.to_string()),
        items: vec![OrderItem {
            name: "Item".to_string(),
            quantity: 1,
            price: 1000,
            category: Some(category.to_string()),
            ..Default::default()
        }],
        total: 1000,
        ..Default::default()
    }
}

fn queue_with(
    printers: Vec<PrinterConfig>,
    dispatcher: Arc<StubDispatcher>,
) -> Arc<JobQueue> {
    JobQueue::with_policy(
        Arc::new(PrinterRegistry::new(printers)),
        dispatcher,
        ReceiptDefaults::default(),
        RETRY_DELAY,
        DEDUP_TTL,
    )
}

#[tokio::test]
async fn test_successful_job_dispatches_once() {
    let dispatcher = StubDispatcher::new(&[]);
    let queue = queue_with(vec![printer("Caixa", &["all"])], Arc::clone(&dispatcher));

    queue.enqueue(order("o1", "lanches"));
    queue.wait_idle().await;

    assert_eq!(dispatcher.attempts(), vec!["Caixa"]);
}

#[tokio::test]
async fn test_failing_job_is_retried_then_discarded() {
    let dispatcher = StubDispatcher::new(&["Caixa"]);
    let queue = queue_with(vec![printer("Caixa", &["all"])], Arc::clone(&dispatcher));

    queue.enqueue(order("o1", "lanches"));
    queue.wait_idle().await;

    // initial attempt + exactly 3 retries, then the job is gone
    assert_eq!(dispatcher.attempts().len(), 4);
    assert!(queue.is_empty());
}

#[tokio::test]
async fn test_duplicate_order_within_window_is_collapsed() {
    let dispatcher = StubDispatcher::new(&[]);
    let queue = queue_with(vec![printer("Caixa", &["all"])], Arc::clone(&dispatcher));

    queue.enqueue(order("same", "lanches"));
    queue.enqueue(order("same", "lanches"));
    queue.wait_idle().await;
    assert_eq!(dispatcher.attempts().len(), 1);

    // after the window elapses the same id is a new delivery
    tokio::time::sleep(DEDUP_TTL + Duration::from_millis(40)).await;
    queue.enqueue(order("same", "lanches"));
    queue.wait_idle().await;
    assert_eq!(dispatcher.attempts().len(), 2);
}

#[tokio::test]
async fn test_transport_isolation_between_printers() {
    let dispatcher = StubDispatcher::new(&["Grill"]);
    let queue = queue_with(
        vec![printer("Grill", &["grill"]), printer("Bar", &["bar"])],
        Arc::clone(&dispatcher),
    );

    // first job fails on Grill and burns its retries at the queue head;
    // the second job must still reach Bar afterwards
    queue.enqueue(order("o1", "grill"));
    queue.enqueue(order("o2", "bar"));
    queue.wait_idle().await;

    assert_eq!(
        dispatcher.attempts(),
        vec!["Grill", "Grill", "Grill", "Grill", "Bar"]
    );
}

#[tokio::test]
async fn test_unroutable_order_is_dropped_without_retry() {
    let dispatcher = StubDispatcher::new(&[]);
    let queue = queue_with(vec![printer("Grill", &["grill"])], Arc::clone(&dispatcher));

    queue.enqueue(order("o1", "sushi"));
    queue.wait_idle().await;

    assert!(dispatcher.attempts().is_empty());
    assert!(queue.is_empty());
}

#[tokio::test]
async fn test_test_print_targets_one_printer() {
    let dispatcher = StubDispatcher::new(&[]);
    let queue = queue_with(
        vec![printer("Caixa", &["all"]), printer("Bar", &["all"])],
        Arc::clone(&dispatcher),
    );

    queue.enqueue_test(Some("Bar".to_string())).unwrap();
    queue.wait_idle().await;

    assert_eq!(dispatcher.attempts(), vec!["Bar"]);
}

#[tokio::test]
async fn test_test_print_unknown_printer_is_refused() {
    let dispatcher = StubDispatcher::new(&[]);
    let queue = queue_with(vec![printer("Caixa", &["all"])], Arc::clone(&dispatcher));

    let err = queue.enqueue_test(Some("missing".to_string())).unwrap_err();
    assert!(err.contains("missing"));
    assert!(dispatcher.attempts().is_empty());
}

#[tokio::test]
async fn test_copies_dispatch_sequentially() {
    let dispatcher = StubDispatcher::new(&[]);
    let mut caixa = printer("Caixa", &["all"]);
    caixa.copies = 3;
    let queue = queue_with(vec![caixa], Arc::clone(&dispatcher));

    queue.enqueue(order("o1", "lanches"));
    queue.wait_idle().await;

    assert_eq!(dispatcher.attempts(), vec!["Caixa", "Caixa", "Caixa"]);
}

#[tokio::test]
async fn test_order_fans_out_to_all_matching_printers() {
    let dispatcher = StubDispatcher::new(&[]);
    let queue = queue_with(
        vec![printer("Caixa", &["all"]), printer("Grill", &["grill"])],
        Arc::clone(&dispatcher),
    );

    queue.enqueue(order("o1", "grill"));
    queue.wait_idle().await;

    let attempts = dispatcher.attempts();
    assert_eq!(attempts.len(), 2);
    assert!(attempts.contains(&"Caixa".to_string()));
    assert!(attempts.contains(&"Grill".to_string()));
}
