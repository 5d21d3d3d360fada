//! Invoice command
//!
//! Prints the figures an invoice carries, recomputed from the order's item
//! snapshots and stored tax rate, formatted for display.

use clap::Args;
use serde_json::{json, Value};

use crate::commands::checked_order_id;
use crate::error::CliError;
use crate::App;

#[derive(Debug, Args)]
pub struct InvoiceArgs {
    pub order_id: String,
}

pub async fn execute(app: &App, args: InvoiceArgs) -> Result<Value, CliError> {
    let detail = app.engine.get_order(checked_order_id(&args.order_id)?).await?;
    let figures = detail.invoice();
    let money = |amount| app.config.format_currency(amount);

    let lines: Vec<Value> = detail
        .items
        .iter()
        .map(|item| {
            json!({
                "lineNo": item.line_no,
                "productName": item.product_name,
                "quantity": item.quantity,
                "unitPrice": money(item.unit_price),
                "lineTotal": money(item.line_total()),
            })
        })
        .collect();

    let order = &detail.order;
    Ok(json!({
        "orderId": order.id,
        "customerName": order.customer_name,
        "mobileNumber": order.mobile_number,
        "orderDate": order.order_date,
        "plannedDeliveryDate": order.planned_delivery_date,
        "paymentMethod": order.payment_method,
        "lines": lines,
        "subtotal": money(figures.subtotal),
        "taxRate": figures.tax_rate.to_string(),
        "taxAmount": money(figures.tax_amount),
        "total": money(figures.total),
        "advanceReceived": money(figures.advance_received),
        "balanceDue": money(figures.balance_due),
    }))
}
