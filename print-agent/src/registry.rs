//! Printer registry
//!
//! Holds the configured printer set, resolves category routing for
//! incoming orders and answers system printer enumeration requests.

use cupom_printer::SystemPrinter;
use parking_lot::RwLock;
use shared::{Order, PrinterConfig};
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// No enabled printer matches the order's categories
///
/// Never retried: requeueing cannot change the routing outcome.
#[derive(Debug, Error)]
#[error("no enabled printer matches the order categories")]
pub struct RoutingError;

const LIST_TIMEOUT: Duration = Duration::from_secs(8);

pub struct PrinterRegistry {
    printers: RwLock<Vec<PrinterConfig>>,
}

impl PrinterRegistry {
    pub fn new(printers: Vec<PrinterConfig>) -> Self {
        info!(count = printers.len(), "printer registry loaded");
        Self {
            printers: RwLock::new(printers),
        }
    }

    /// Swap the printer set (config reload)
    pub fn replace(&self, printers: Vec<PrinterConfig>) {
        info!(count = printers.len(), "printer registry replaced");
        *self.printers.write() = printers;
    }

    pub fn printer_by_id(&self, id: &str) -> Option<PrinterConfig> {
        self.printers.read().iter().find(|p| p.id == id).cloned()
    }

    /// Printers that should receive this order
    ///
    /// A printer matches when it is enabled, has at least one category and
    /// either carries the `"all"` tag or intersects the order's derived
    /// category set.
    pub fn target_printers_for(&self, order: &Order) -> Vec<PrinterConfig> {
        let order_categories = derived_categories(order);

        self.printers
            .read()
            .iter()
            .filter(|p| {
                p.enabled
                    && !p.categories.is_empty()
                    && (p.categories.iter().any(|c| c == "all")
                        || p.categories
                            .iter()
                            .any(|c| order_categories.contains(&c.to_lowercase())))
            })
            .cloned()
            .collect()
    }

    /// Enumerate printers installed on this machine
    ///
    /// OS query with a bounded timeout; any failure degrades to an empty
    /// list so the event channel ack never hangs.
    pub async fn list_system_printers(&self) -> Vec<SystemPrinter> {
        let lookup = tokio::task::spawn_blocking(cupom_printer::list_system_printers);

        match tokio::time::timeout(LIST_TIMEOUT, lookup).await {
            Ok(Ok(list)) => list,
            Ok(Err(e)) => {
                warn!(error = %e, "system printer enumeration task failed");
                Vec::new()
            }
            Err(_) => {
                warn!("system printer enumeration timed out");
                Vec::new()
            }
        }
    }
}

/// Category tags derived from an order's line items
///
/// Lowercased item categories plus the implicit `"all"` tag.
fn derived_categories(order: &Order) -> HashSet<String> {
    let mut categories = HashSet::from(["all".to_string()]);
    for item in &order.items {
        if let Some(category) = &item.category {
            categories.insert(category.to_lowercase());
        }
        for category in &item.categories {
            categories.insert(category.to_lowercase());
        }
    }
    categories
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::OrderItem;

    fn printer_with_categories(id: &str, categories: &[&str]) -> PrinterConfig {
        let mut printer = PrinterConfig::network(id, "10.0.0.9", 9100);
        printer.id = id.to_string();
        printer.categories = categories.iter().map(|c| c.to_string()).collect();
        printer
    }

    fn order_with_category(category: &str) -> Order {
        Order {
            items: vec![OrderItem {
                name: "Item".to_string(),
                quantity: 1,
                category: Some(category.to_string()),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_all_tag_matches_everything() {
        let registry = PrinterRegistry::new(vec![printer_with_categories("p1", &["all"])]);
        let targets = registry.target_printers_for(&order_with_category("bebidas"));
        assert_eq!(targets.len(), 1);
    }

    #[test]
    fn test_category_intersection() {
        let registry = PrinterRegistry::new(vec![
            printer_with_categories("grill", &["lanches"]),
            printer_with_categories("bar", &["bebidas"]),
        ]);

        let targets = registry.target_printers_for(&order_with_category("Bebidas"));
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].id, "bar");
    }

    #[test]
    fn test_disabled_and_uncategorized_never_match() {
        let mut disabled = printer_with_categories("p1", &["all"]);
        disabled.enabled = false;
        let uncategorized = printer_with_categories("p2", &[]);

        let registry = PrinterRegistry::new(vec![disabled, uncategorized]);
        assert!(
            registry
                .target_printers_for(&order_with_category("lanches"))
                .is_empty()
        );
    }

    #[test]
    fn test_printer_by_id() {
        let registry = PrinterRegistry::new(vec![printer_with_categories("p1", &["all"])]);
        assert!(registry.printer_by_id("p1").is_some());
        assert!(registry.printer_by_id("missing").is_none());
    }

    #[test]
    fn test_replace_swaps_set() {
        let registry = PrinterRegistry::new(vec![printer_with_categories("p1", &["all"])]);
        registry.replace(vec![printer_with_categories("p2", &["all"])]);
        assert!(registry.printer_by_id("p1").is_none());
        assert!(registry.printer_by_id("p2").is_some());
    }
}
