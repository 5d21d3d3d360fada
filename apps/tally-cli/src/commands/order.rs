//! Order commands
//!
//! Intents are JSON documents read from `--file` (`-` for stdin):
//!
//! ```json
//! {
//!   "customerName": "Asha",
//!   "mobileNumber": "9876543210",
//!   "orderDate": "2025-09-05",
//!   "advanceReceived": "100",
//!   "items": [{ "sku": "HLM-ROAD-M", "productName": "Road Helmet (M)", "quantity": 1, "price": "2499" }]
//! }
//! ```

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use serde_json::{json, Value};
use tally_core::OrderIntent;

use crate::commands::{checked_order_id, to_json};
use crate::error::CliError;
use crate::App;

#[derive(Debug, Args)]
pub struct OrderArgs {
    #[command(subcommand)]
    pub command: OrderCommand,
}

#[derive(Debug, Subcommand)]
pub enum OrderCommand {
    /// Create an order and reserve its stock
    Create {
        #[arg(long)]
        file: PathBuf,
    },
    /// Replace an order's details and items, moving only changed stock
    Update {
        order_id: String,
        #[arg(long)]
        file: PathBuf,
    },
    /// Delete an order and return its stock
    Delete { order_id: String },
    /// Show an order with its items and invoice figures
    Show { order_id: String },
    /// List orders, newest first
    List,
}

pub async fn execute(app: &App, args: OrderArgs) -> Result<Value, CliError> {
    match args.command {
        OrderCommand::Create { file } => {
            let intent = read_intent(&file)?;
            let order_id = app.engine.create_order(&intent).await?;
            Ok(json!({ "orderId": order_id }))
        }
        OrderCommand::Update { order_id, file } => {
            checked_order_id(&order_id)?;
            let intent = read_intent(&file)?;
            let deltas = app.engine.update_order(&order_id, &intent).await?;
            Ok(json!({ "orderId": order_id, "deltas": to_json(&deltas)? }))
        }
        OrderCommand::Delete { order_id } => {
            app.engine.delete_order(checked_order_id(&order_id)?).await?;
            Ok(json!({ "orderId": order_id, "deleted": true }))
        }
        OrderCommand::Show { order_id } => {
            let detail = app.engine.get_order(checked_order_id(&order_id)?).await?;
            let mut shown = to_json(&detail)?;
            shown["invoice"] = to_json(&detail.invoice())?;
            Ok(shown)
        }
        OrderCommand::List => to_json(&app.engine.list_orders().await?),
    }
}

/// Reads and validates an intent document.
fn read_intent(path: &Path) -> Result<OrderIntent, CliError> {
    let body = if path == Path::new("-") {
        let mut body = String::new();
        std::io::stdin().read_to_string(&mut body)?;
        body
    } else {
        std::fs::read_to_string(path)?
    };

    Ok(OrderIntent::from_json(&body)?)
}
