//! # Seed Data Generator
//!
//! Loads a demo catalog of bike accessories for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./tally_dev.db
//! cargo run -p tally-db --bin seed
//!
//! # Specify database path and stock level per product
//! cargo run -p tally-db --bin seed -- --db ./data/tally.db --stock 25
//! ```
//!
//! ## Generated Catalog
//! One category per accessory family, one product per model and size:
//! - SKU: `{FAMILY}-{MODEL}{-SIZE}`
//! - Price: base model price plus size premium
//! - Stock: `--stock` units each (default 20)

use rust_decimal::Decimal;
use std::env;
use tally_core::{Money, Product};
use tally_db::{Database, DbConfig, DbError};

/// `(family code, category name, [(model code, model name, base price in paise)])`
const CATALOG: &[(&str, &str, &[(&str, &str, i64)])] = &[
    (
        "HLM",
        "Helmets",
        &[
            ("ROAD", "Road Helmet", 249_900),
            ("MTB", "Trail Helmet", 319_900),
            ("KID", "Kids Helmet", 129_900),
        ],
    ),
    (
        "LGT",
        "Lights",
        &[
            ("FRONT", "Front Light 400lm", 89_900),
            ("REAR", "Rear Light", 49_900),
            ("COMBO", "Light Set", 129_900),
        ],
    ),
    (
        "LCK",
        "Locks",
        &[
            ("U", "U-Lock", 149_900),
            ("CBL", "Cable Lock", 59_900),
            ("FOLD", "Folding Lock", 229_900),
        ],
    ),
    (
        "BTL",
        "Bottles & Cages",
        &[
            ("500", "Bottle 500ml", 24_900),
            ("750", "Bottle 750ml", 29_900),
            ("CAGE", "Bottle Cage", 34_900),
        ],
    ),
    (
        "ACC",
        "Accessories",
        &[
            ("BELL", "Bell", 19_900),
            ("PUMP", "Mini Pump", 79_900),
            ("GLV", "Gloves", 69_900),
        ],
    ),
];

/// Sized families and the premium each size adds (paise).
const SIZES: &[(&str, &[(&str, i64)])] = &[
    ("HLM", &[("S", 0), ("M", 0), ("L", 20_000)]),
    ("ACC-GLV", &[("S", 0), ("M", 0), ("L", 0), ("XL", 10_000)]),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut stock: i64 = 20;
    let mut db_path = String::from("./tally_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--stock" | "-s" => {
                if i + 1 < args.len() {
                    stock = args[i + 1].parse().unwrap_or(20);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Tally Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -s, --stock <N>    Units on hand per product (default: 20)");
                println!("  -d, --db <PATH>    Database file path (default: ./tally_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Tally Seed Data Generator");
    println!("============================");
    println!("Database: {}", db_path);
    println!("Stock per product: {}", stock);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let mut generated = 0;
    for (family, category, models) in CATALOG {
        match db.categories().add(category).await {
            Ok(_) | Err(DbError::UniqueViolation { .. }) => {}
            Err(e) => return Err(e.into()),
        }

        for (model, name, base_price) in models.iter() {
            for product in generate_products(family, category, model, name, *base_price, stock) {
                if let Err(e) = db.products().insert(&product).await {
                    eprintln!("Failed to insert {}: {}", product.sku, e);
                    continue;
                }
                generated += 1;
            }
        }
    }

    println!();
    println!("✓ Generated {} products in {} categories", generated, CATALOG.len());
    println!("✓ Seed complete!");

    Ok(())
}

/// One product per size (or a single unsized product).
fn generate_products(
    family: &str,
    category: &str,
    model: &str,
    name: &str,
    base_price: i64,
    stock: i64,
) -> Vec<Product> {
    let key = format!("{family}-{model}");
    let sizes = SIZES
        .iter()
        .find(|(prefix, _)| *prefix == family || *prefix == key)
        .map(|(_, sizes)| *sizes);

    let product = |sku: String, name: String, paise: i64| Product {
        sku,
        name,
        category: Some(category.to_string()),
        quantity: stock,
        unit_price: Money::new(Decimal::new(paise, 2)),
    };

    match sizes {
        None => vec![product(key, name.to_string(), base_price)],
        Some(sizes) => sizes
            .iter()
            .map(|(size, premium)| {
                product(
                    format!("{key}-{size}"),
                    format!("{name} ({size})"),
                    base_price + premium,
                )
            })
            .collect(),
    }
}
