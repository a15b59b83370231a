//! Template context construction
//!
//! Pure mapping from the order payload (plus the target printer) to the
//! flat pt-BR variable set the receipt templates consume. Monetary values
//! arrive as integer cents and leave formatted as BRL strings.

use chrono::{DateTime, Local, Utc};
use serde_json::{Value, json};
use shared::{Order, PrinterConfig};

/// Format integer cents as BRL: 4200 -> "R$ 42,00"
pub fn format_brl(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.abs();
    format!("R$ {}{},{:02}", sign, abs / 100, abs % 100)
}

/// Build the template context for an order on a given printer
pub fn build_context(order: &Order, printer: &PrinterConfig) -> Value {
    let created: DateTime<Local> = order
        .created_at
        .unwrap_or_else(Utc::now)
        .with_timezone(&Local);

    let raw_type = order
        .order_type
        .as_deref()
        .unwrap_or_default()
        .to_lowercase();
    let tipo = match raw_type.as_str() {
        "delivery" => "DELIVERY".to_string(),
        "pickup" => "RETIRADA".to_string(),
        "mesa" => "MESA".to_string(),
        "" => "PEDIDO".to_string(),
        other => other.to_uppercase(),
    };
    let tipo_delivery = raw_type == "delivery";

    let da = order.delivery_address.clone().unwrap_or_default();
    let street = da.street.unwrap_or_default();
    let number = da.number.unwrap_or_default();
    let complement = da.complement.unwrap_or_default();
    let neighborhood = da.neighborhood.unwrap_or_default();
    let city = da.city.unwrap_or_default();
    let reference = da.reference.unwrap_or_default();
    let flat_address = order.address.clone().unwrap_or_default();

    let endereco_completo = if flat_address.is_empty() {
        [&street, &number, &complement, &neighborhood, &city]
            .iter()
            .filter(|part| !part.is_empty())
            .map(|part| part.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    } else {
        flat_address.clone()
    };

    let loja_nome = order
        .header_name
        .clone()
        .or_else(|| order.store_name.clone())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "Delivery".to_string());

    let items: Vec<Value> = order
        .items
        .iter()
        .map(|item| {
            let qty = i64::from(item.quantity.max(1));
            let unit = item.unit_price();
            let opcoes = item
                .options
                .iter()
                .map(|opt| {
                    if opt.price > 0 {
                        format!("   + {}: {}", opt.name, format_brl(opt.price))
                    } else {
                        format!("   + {}", opt.name)
                    }
                })
                .collect::<Vec<_>>()
                .join("\n");

            json!({
                "qtd": qty.to_string(),
                "nome": item.name,
                "obs": item.notes.clone().unwrap_or_default(),
                "preco": format_brl(unit),
                "subtotal": format_brl(unit * qty),
                "tem_opcoes": !item.options.is_empty(),
                "opcoes": opcoes,
            })
        })
        .collect();

    let pagamentos: Vec<Value> = order
        .payments
        .iter()
        .map(|payment| {
            json!({
                "metodo": payment.method,
                "valor": format_brl(payment.value),
            })
        })
        .collect();

    // The payload has no reliable subtotal column; derive it from the items
    let items_total = order.items_total();
    let subtotal = if items_total > 0 {
        items_total
    } else {
        order.subtotal
    };

    let obs_pedido = order.notes.clone().unwrap_or_default();
    let link_pedido = order.qr_text.clone().unwrap_or_default();

    json!({
        "loja_nome": loja_nome,
        "loja_cidade": order.header_city.clone().unwrap_or_default(),
        "display_id": order.display_id.clone()
            .or_else(|| order.id.clone())
            .unwrap_or_else(|| "---".to_string()),
        "data": created.format("%d/%m/%Y").to_string(),
        "hora": created.format("%H:%M").to_string(),
        "tipo": tipo,
        "tipo_delivery": tipo_delivery,

        "cliente_nome": order.customer_name.clone().unwrap_or_default(),
        "cliente_tel": order.customer_phone.clone().unwrap_or_default(),

        "endereco_rua": if street.is_empty() { flat_address.clone() } else { street.clone() },
        "endereco_num": number,
        "endereco_comp": complement,
        "endereco_bairro": neighborhood,
        "endereco_cidade": city,
        "endereco_ref": reference,
        "endereco_completo": endereco_completo,
        "endereco_rua_ok": !street.is_empty() || !flat_address.is_empty(),

        "items": items,
        "pagamentos": pagamentos,

        "subtotal": format_brl(subtotal),
        "taxa": format_brl(order.delivery_fee),
        "desconto": format_brl(order.discount),
        "total": format_brl(order.total),

        "tem_taxa": order.delivery_fee > 0,
        "tem_desconto": order.discount > 0,
        "tem_obs": !obs_pedido.is_empty(),
        "obs_pedido": obs_pedido,

        "tem_qr": !link_pedido.is_empty(),
        "link_pedido": link_pedido,

        "impressora_alias": printer.alias,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{DeliveryAddress, OrderItem, Payment};

    fn sample_order() -> Order {
        Order {
            display_id: Some("1042".to_string()),
            order_type: Some("delivery".to_string()),
            customer_name: Some("Maria".to_string()),
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
            delivery_fee: 500,
            total: 4200,
            ..Default::default()
        }
    }

    #[test]
    fn test_format_brl() {
        assert_eq!(format_brl(4200), "R$ 42,00");
        assert_eq!(format_brl(5), "R$ 0,05");
        assert_eq!(format_brl(0), "R$ 0,00");
        assert_eq!(format_brl(123456), "R$ 1234,56");
        assert_eq!(format_brl(-500), "R$ -5,00");
    }

    #[test]
    fn test_context_totals_and_flags() {
        let printer = PrinterConfig::network("Caixa", "10.0.0.2", 9100);
        let ctx = build_context(&sample_order(), &printer);

        assert_eq!(ctx["display_id"], "1042");
        assert_eq!(ctx["tipo"], "DELIVERY");
        assert_eq!(ctx["tipo_delivery"], true);
        // 2500 + 2x600 = 3700 cents
        assert_eq!(ctx["subtotal"], "R$ 37,00");
        assert_eq!(ctx["taxa"], "R$ 5,00");
        assert_eq!(ctx["total"], "R$ 42,00");
        assert_eq!(ctx["tem_taxa"], true);
        assert_eq!(ctx["tem_desconto"], false);
        assert_eq!(ctx["impressora_alias"], "Caixa");
    }

    #[test]
    fn test_context_items() {
        let printer = PrinterConfig::network("Caixa", "10.0.0.2", 9100);
        let ctx = build_context(&sample_order(), &printer);

        let items = ctx["items"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1]["qtd"], "2");
        assert_eq!(items[1]["nome"], "Coca-Cola 350ml");
        assert_eq!(items[1]["preco"], "R$ 6,00");
        assert_eq!(items[1]["subtotal"], "R$ 12,00");
        assert_eq!(items[0]["tem_opcoes"], false);
    }

    #[test]
    fn test_context_unknown_type_uppercased() {
        let printer = PrinterConfig::network("Caixa", "10.0.0.2", 9100);
        let mut order = sample_order();
        order.order_type = Some("balcao".to_string());
        let ctx = build_context(&order, &printer);
        assert_eq!(ctx["tipo"], "BALCAO");

        order.order_type = None;
        let ctx = build_context(&order, &printer);
        assert_eq!(ctx["tipo"], "PEDIDO");
    }

    #[test]
    fn test_context_address_fallback() {
        let printer = PrinterConfig::network("Caixa", "10.0.0.2", 9100);
        let mut order = sample_order();
        order.delivery_address = None;
        order.address = Some("Av. Sete, 900 - Centro".to_string());
        let ctx = build_context(&order, &printer);

        assert_eq!(ctx["endereco_rua"], "Av. Sete, 900 - Centro");
        assert_eq!(ctx["endereco_completo"], "Av. Sete, 900 - Centro");
        assert_eq!(ctx["endereco_rua_ok"], true);
    }
}
