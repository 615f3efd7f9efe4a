//! # Seed Data Generator
//!
//! Populates the database with demo catalog data and a default admin user.
//!
//! ## Usage
//! ```bash
//! # Seed the default dev database
//! cargo run -p duka-db --bin seed
//!
//! # Specify database path
//! cargo run -p duka-db --bin seed -- --db ./data/duka.db
//!
//! # Custom admin credentials
//! cargo run -p duka-db --bin seed -- --admin-user admin --admin-pass changeme
//! ```
//!
//! ## Generated Data
//! - One admin user (default admin / admin123)
//! - Categories, brands and a supplier
//! - Grocery products with multiple pack-size variants:
//!   realistic prices, purchase prices, barcodes and stock levels

use std::env;

use duka_db::{Database, DbConfig, NewProduct, NewVariant};
use duka_core::Role;

/// (category, brand, product, [(variant, price_cents, stock)])
const PRODUCTS: &[(&str, &str, &str, &[(&str, i64, i64)])] = &[
    (
        "Grains",
        "Capwell",
        "Basmati Rice",
        &[("1kg", 25000, 40), ("2kg", 48000, 25), ("5kg", 110000, 10)],
    ),
    (
        "Grains",
        "Soko",
        "Maize Flour",
        &[("1kg", 15900, 60), ("2kg", 29900, 35)],
    ),
    (
        "Grains",
        "Exe",
        "Wheat Flour",
        &[("1kg", 17500, 50), ("2kg", 33000, 20)],
    ),
    (
        "Beverages",
        "Coca-Cola",
        "Soda",
        &[("330ml", 5000, 120), ("500ml", 7000, 80), ("1L", 11000, 40)],
    ),
    (
        "Beverages",
        "Ketepa",
        "Tea Leaves",
        &[("100g", 9500, 30), ("250g", 21000, 18)],
    ),
    (
        "Dairy",
        "Brookside",
        "Fresh Milk",
        &[("500ml", 6500, 45), ("1L", 12000, 30)],
    ),
    (
        "Dairy",
        "KCC",
        "Yoghurt",
        &[("250ml", 8000, 24), ("500ml", 14500, 15)],
    ),
    (
        "Household",
        "Menengai",
        "Bar Soap",
        &[("800g", 16000, 35), ("1kg", 19500, 22)],
    ),
    (
        "Household",
        "Sunlight",
        "Washing Powder",
        &[("500g", 13500, 28), ("1kg", 25000, 14)],
    ),
    (
        "Cooking",
        "Fresh Fri",
        "Cooking Oil",
        &[("500ml", 18500, 32), ("1L", 35000, 18), ("2L", 67000, 8)],
    ),
    (
        "Cooking",
        "Kensalt",
        "Table Salt",
        &[("500g", 3000, 90), ("1kg", 5500, 50)],
    ),
    (
        "Cooking",
        "Mumias",
        "Sugar",
        &[("1kg", 17000, 55), ("2kg", 33000, 25)],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG controls verbosity, e.g. RUST_LOG=duka_db=debug
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./duka_dev.db");
    let mut admin_user = String::from("admin");
    let mut admin_pass = String::from("admin123");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--admin-user" => {
                if i + 1 < args.len() {
                    admin_user = args[i + 1].clone();
                    i += 1;
                }
            }
            "--admin-pass" => {
                if i + 1 < args.len() {
                    admin_pass = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Duka POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>        Database file path (default: ./duka_dev.db)");
                println!("      --admin-user <U>   Admin username (default: admin)");
                println!("      --admin-pass <P>   Admin password (default: admin123)");
                println!("  -h, --help             Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Duka POS Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!();

    // Connect to database
    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Admin user
    if db.users().is_empty().await? {
        db.users()
            .create(&admin_user, &admin_pass, Role::Admin)
            .await?;
        println!("✓ Created admin user '{}'", admin_user);
    } else {
        println!("⚠ Users already exist, skipping admin creation");
    }

    // Catalog
    let existing = db.catalog().search("", 1).await?;
    if !existing.is_empty() {
        println!("⚠ Database already has catalog data");
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating catalog...");

    let supplier = db
        .catalog()
        .add_supplier(
            "Kilimani Wholesalers",
            Some("+254 700 000000"),
            None,
            Some("Nairobi"),
        )
        .await?;

    let start = std::time::Instant::now();
    let mut products = 0;
    let mut variants = 0;

    for (seed, (category, brand, name, sizes)) in PRODUCTS.iter().enumerate() {
        let category = db.catalog().ensure_category(category).await?;
        let brand = db.catalog().ensure_brand(brand).await?;

        let new_variants: Vec<NewVariant> = sizes
            .iter()
            .enumerate()
            .map(|(vi, (size, price_cents, stock))| NewVariant {
                name: size.to_string(),
                // Cost at 70-85% of selling price
                purchase_price_cents: Some(price_cents * (70 + (seed as i64 % 16)) / 100),
                price_cents: *price_cents,
                barcode: Some(format!("616110{:04}{:03}", seed, vi)),
                stock_quantity: *stock,
                reorder_level: Some(5),
            })
            .collect();

        variants += new_variants.len();
        products += 1;

        db.catalog()
            .create_product(NewProduct {
                name: name.to_string(),
                category_id: Some(category.id),
                brand_id: Some(brand.id),
                supplier_id: Some(supplier.id.clone()),
                variants: new_variants,
            })
            .await?;
    }

    let elapsed = start.elapsed();
    println!(
        "✓ Generated {} products ({} variants) in {:?}",
        products, variants, elapsed
    );

    // Verify lookups work
    println!();
    println!("Verifying catalog lookups...");
    let results = db.catalog().search("rice", 10).await?;
    println!("  Search 'rice': {} results", results.len());
    let low = db.catalog().low_stock().await?;
    println!("  Low stock: {} variants", low.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
