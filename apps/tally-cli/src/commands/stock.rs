//! Stock commands

use clap::{Args, Subcommand};
use serde_json::{json, Value};
use tally_db::StockCheck;

use crate::error::CliError;
use crate::App;

#[derive(Debug, Args)]
pub struct StockArgs {
    #[command(subcommand)]
    pub command: StockCommand,
}

#[derive(Debug, Subcommand)]
pub enum StockCommand {
    /// Can QUANTITY units of SKU be reserved right now?
    Check {
        sku: String,
        #[arg(default_value_t = 1)]
        quantity: i64,
    },
    /// Add (receiving) or remove (shrinkage) units; never below zero
    Adjust {
        sku: String,
        #[arg(allow_negative_numbers = true)]
        delta: i64,
    },
}

pub async fn execute(app: &App, args: StockArgs) -> Result<Value, CliError> {
    match args.command {
        StockCommand::Check { sku, quantity } => {
            if quantity <= 0 {
                return Err(CliError::validation("quantity must be positive"));
            }

            match app.db.stock().check(&sku, quantity).await? {
                StockCheck::Available => Ok(json!({
                    "sku": sku,
                    "requested": quantity,
                    "available": true,
                })),
                StockCheck::Insufficient { available } => Ok(json!({
                    "sku": sku,
                    "requested": quantity,
                    "available": false,
                    "onHand": available,
                    "shortfall": quantity - available,
                })),
                StockCheck::NotFound => Err(CliError::not_found("Product", &sku)),
            }
        }
        StockCommand::Adjust { sku, delta } => {
            if delta == 0 {
                return Err(CliError::validation("delta must be non-zero"));
            }

            let quantity = app.db.stock().adjust(&sku, delta).await?;
            Ok(json!({ "sku": sku, "delta": delta, "quantity": quantity }))
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorCode;
    use crate::test_support::{app, seed, tally};

    #[tokio::test]
    async fn test_check_reports_shortfall() {
        let app = app().await;
        seed(&app, "LCK-U", 3, "1499").await;

        let ok = tally(&app, &["stock", "check", "LCK-U", "3"]).await.unwrap();
        assert_eq!(ok["available"], true);

        let short = tally(&app, &["stock", "check", "LCK-U", "5"]).await.unwrap();
        assert_eq!(short["available"], false);
        assert_eq!(short["onHand"], 3);
        assert_eq!(short["shortfall"], 2);

        let missing = tally(&app, &["stock", "check", "NOPE"]).await.unwrap_err();
        assert_eq!(missing.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_adjust_never_goes_negative() {
        let app = app().await;
        seed(&app, "BTL-750", 4, "299").await;

        let received = tally(&app, &["stock", "adjust", "BTL-750", "6"]).await.unwrap();
        assert_eq!(received["quantity"], 10);

        let shrunk = tally(&app, &["stock", "adjust", "BTL-750", "-9"]).await.unwrap();
        assert_eq!(shrunk["quantity"], 1);

        let err = tally(&app, &["stock", "adjust", "BTL-750", "-2"]).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);

        let shown = tally(&app, &["product", "show", "BTL-750"]).await.unwrap();
        assert_eq!(shown["quantity"], 1);
    }
}
