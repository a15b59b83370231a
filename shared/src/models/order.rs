//! Delivery Order Model
//!
//! Typed view of the order payload delivered by the event channel. The
//! backend evolved field names over time, so several fields accept legacy
//! aliases. All monetary values are integer cents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Delivery address, structured
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeliveryAddress {
    #[serde(alias = "streetName", alias = "logradouro")]
    pub street: Option<String>,
    #[serde(alias = "streetNumber", alias = "numero")]
    pub number: Option<String>,
    #[serde(alias = "complemento")]
    pub complement: Option<String>,
    #[serde(alias = "bairro", alias = "district")]
    pub neighborhood: Option<String>,
    #[serde(alias = "cidade")]
    pub city: Option<String>,
    #[serde(alias = "referencia")]
    pub reference: Option<String>,
}

/// Item option / add-on (e.g. extra cheese)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemOption {
    pub name: String,
    /// Price in cents
    pub price: i64,
}

/// One order line item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderItem {
    #[serde(alias = "productName")]
    pub name: String,
    pub quantity: u32,
    /// Base unit price in cents
    pub price: i64,
    #[serde(alias = "observation")]
    pub notes: Option<String>,
    pub options: Vec<ItemOption>,
    pub category: Option<String>,
    pub categories: Vec<String>,
}

impl OrderItem {
    /// Unit price including options, in cents
    pub fn unit_price(&self) -> i64 {
        self.price + self.options.iter().map(|o| o.price).sum::<i64>()
    }

    /// Line subtotal (unit price x quantity), in cents
    pub fn subtotal(&self) -> i64 {
        self.unit_price() * i64::from(self.quantity.max(1))
    }
}

/// A confirmed payment entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Payment {
    #[serde(alias = "name", alias = "tipo", alias = "paymentMethod")]
    pub method: String,
    /// Paid value in cents
    #[serde(alias = "amount", alias = "valor")]
    pub value: i64,
}

/// Delivery order payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Order {
    pub id: Option<String>,
    pub display_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    /// "delivery" | "pickup" | "mesa"
    #[serde(alias = "type")]
    pub order_type: Option<String>,

    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub delivery_address: Option<DeliveryAddress>,
    /// Flat, pre-resolved address string (fallback for legacy payloads)
    pub address: Option<String>,

    pub items: Vec<OrderItem>,
    pub payments: Vec<Payment>,

    /// Totals in cents; subtotal may be absent and is then derived from items
    pub subtotal: i64,
    pub delivery_fee: i64,
    #[serde(alias = "couponDiscount")]
    pub discount: i64,
    pub total: i64,

    #[serde(alias = "observation")]
    pub notes: Option<String>,
    #[serde(alias = "trackingUrl")]
    pub qr_text: Option<String>,

    // Header fields, injected by the backend or by the local agent config
    pub header_name: Option<String>,
    pub header_city: Option<String>,
    pub store_name: Option<String>,
}

impl Order {
    /// Sum of line subtotals, in cents
    pub fn items_total(&self) -> i64 {
        self.items.iter().map(|i| i.subtotal()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_aliases() {
        let json = r#"{
            "displayId": "1042",
            "type": "delivery",
            "customerName": "Maria",
            "items": [
                {"name": "X-Burguer", "quantity": 1, "price": 2500, "observation": "Sem cebola"}
            ],
            "payments": [{"tipo": "Dinheiro", "valor": 4200}],
            "couponDiscount": 300,
            "trackingUrl": "https://example.com/t/1042"
        }"#;

        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.display_id.as_deref(), Some("1042"));
        assert_eq!(order.order_type.as_deref(), Some("delivery"));
        assert_eq!(order.items[0].notes.as_deref(), Some("Sem cebola"));
        assert_eq!(order.payments[0].method, "Dinheiro");
        assert_eq!(order.payments[0].value, 4200);
        assert_eq!(order.discount, 300);
        assert_eq!(order.qr_text.as_deref(), Some("https://example.com/t/1042"));
    }

    #[test]
    fn test_item_subtotal_includes_options() {
        let item = OrderItem {
            name: "Acai".to_string(),
            quantity: 2,
            price: 1500,
            options: vec![
                ItemOption {
                    name: "Granola".to_string(),
                    price: 200,
                },
                ItemOption {
                    name: "Leite em po".to_string(),
                    price: 0,
                },
            ],
            ..Default::default()
        };

        assert_eq!(item.unit_price(), 1700);
        assert_eq!(item.subtotal(), 3400);
    }

    #[test]
    fn test_items_total() {
        let order = Order {
            items: vec![
                OrderItem {
                    name: "A".to_string(),
                    quantity: 1,
                    price: 2500,
                    ..Default::default()
                },
                OrderItem {
                    name: "B".to_string(),
                    quantity: 2,
                    price: 600,
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        assert_eq!(order.items_total(), 3700);
    }
}
