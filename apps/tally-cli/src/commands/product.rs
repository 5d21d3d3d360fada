//! Product commands

use clap::{Args, Subcommand};
use serde_json::{json, Value};
use tally_core::{Money, Product};

use crate::commands::{parse_money, to_json};
use crate::error::CliError;
use crate::App;

#[derive(Debug, Args)]
pub struct ProductArgs {
    #[command(subcommand)]
    pub command: ProductCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProductCommand {
    /// Add a product to the catalog
    Add(AddArgs),
    /// Change name, price or category of a product (stock moves via `stock adjust`)
    Update(UpdateArgs),
    /// Delete a product (existing orders keep their snapshots)
    Delete { sku: String },
    /// Show one product
    Show { sku: String },
    /// List products, optionally in one category
    List {
        #[arg(long)]
        category: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct AddArgs {
    pub sku: String,

    #[arg(long)]
    pub name: String,

    #[arg(long, value_parser = parse_money)]
    pub price: Money,

    /// Opening stock
    #[arg(long, default_value_t = 0)]
    pub quantity: i64,

    #[arg(long)]
    pub category: Option<String>,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    pub sku: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long, value_parser = parse_money)]
    pub price: Option<Money>,

    #[arg(long, conflicts_with = "uncategorize")]
    pub category: Option<String>,

    /// Remove the product from its category
    #[arg(long)]
    pub uncategorize: bool,
}

pub async fn execute(app: &App, args: ProductArgs) -> Result<Value, CliError> {
    match args.command {
        ProductCommand::Add(add) => execute_add(app, add).await,
        ProductCommand::Update(update) => execute_update(app, update).await,
        ProductCommand::Delete { sku } => {
            app.db.products().delete(&sku).await?;
            Ok(json!({ "sku": sku, "deleted": true }))
        }
        ProductCommand::Show { sku } => {
            let product = app
                .db
                .products()
                .get_by_sku(&sku)
                .await?
                .ok_or_else(|| CliError::not_found("Product", &sku))?;
            to_json(&product)
        }
        ProductCommand::List { category } => {
            let products = match category {
                Some(category) => app.db.products().list_by_category(&category).await?,
                None => app.db.products().list().await?,
            };
            to_json(&products)
        }
    }
}

async fn execute_add(app: &App, args: AddArgs) -> Result<Value, CliError> {
    let product = Product {
        sku: args.sku,
        name: args.name,
        category: args.category,
        quantity: args.quantity,
        unit_price: args.price,
    };

    to_json(&app.db.products().insert(&product).await?)
}

async fn execute_update(app: &App, args: UpdateArgs) -> Result<Value, CliError> {
    let products = app.db.products();
    let mut product = products
        .get_by_sku(&args.sku)
        .await?
        .ok_or_else(|| CliError::not_found("Product", &args.sku))?;

    if let Some(name) = args.name {
        product.name = name;
    }
    if let Some(price) = args.price {
        product.unit_price = price;
    }
    if args.uncategorize {
        product.category = None;
    } else if let Some(category) = args.category {
        product.category = Some(category);
    }

    to_json(&products.update(&product).await?)
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorCode;
    use crate::test_support::{app, tally};

    #[tokio::test]
    async fn test_add_update_show() {
        let app = app().await;
        tally(&app, &["category", "add", "Lights"]).await.unwrap();

        let added = tally(
            &app,
            &[
                "product", "add", "LGT-REAR", "--name", "Rear Light", "--price", "499",
                "--quantity", "8", "--category", "Lights",
            ],
        )
        .await
        .unwrap();
        assert_eq!(added["sku"], "LGT-REAR");
        assert_eq!(added["category"], "Lights");

        tally(&app, &["stock", "adjust", "LGT-REAR", "-5"]).await.unwrap();
        let updated = tally(&app, &["product", "update", "LGT-REAR", "--price", "549", "--uncategorize"])
            .await
            .unwrap();
        assert_eq!(updated["quantity"], 3);

        let shown = tally(&app, &["product", "show", "LGT-REAR"]).await.unwrap();
        assert_eq!(shown["quantity"], 3);
        assert_eq!(shown["name"], "Rear Light");
        assert!(shown["category"].is_null());
    }

    #[test]
    fn test_update_has_no_quantity_flag() {
        use crate::Cli;
        use clap::Parser;

        let parsed = Cli::try_parse_from(["tally", "product", "update", "LGT-REAR", "--quantity", "3"]);
        assert!(parsed.is_err());
    }

    #[tokio::test]
    async fn test_rejections() {
        let app = app().await;

        let unknown_category = tally(
            &app,
            &["product", "add", "BTL-500", "--name", "Bottle", "--price", "249", "--category", "Nope"],
        )
        .await
        .unwrap_err();
        assert_eq!(unknown_category.code, ErrorCode::ValidationError);

        let missing = tally(&app, &["product", "show", "BTL-500"]).await.unwrap_err();
        assert_eq!(missing.code, ErrorCode::NotFound);

        let missing = tally(&app, &["product", "delete", "BTL-500"]).await.unwrap_err();
        assert_eq!(missing.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_list_by_category() {
        let app = app().await;
        tally(&app, &["category", "add", "Locks"]).await.unwrap();
        for (sku, category) in [("LCK-U", Some("Locks")), ("ACC-BELL", None)] {
            let mut args = vec!["product", "add", sku, "--name", sku, "--price", "100"];
            if let Some(category) = category {
                args.extend(["--category", category]);
            }
            tally(&app, &args).await.unwrap();
        }

        let all = tally(&app, &["product", "list"]).await.unwrap();
        assert_eq!(all.as_array().unwrap().len(), 2);

        let locks = tally(&app, &["product", "list", "--category", "Locks"]).await.unwrap();
        assert_eq!(locks.as_array().unwrap().len(), 1);
        assert_eq!(locks[0]["sku"], "LCK-U");
    }
}
