//! # Seed Data Generator
//!
//! Registers demo equipment so the station can be tried without a
//! registration session.
//!
//! ## Usage
//! ```bash
//! cargo run -p rentrack-db --bin seed
//! cargo run -p rentrack-db --bin seed -- --db ./data/rental.db
//! ```
//!
//! Tags are the real identifiers of the bench tools, so tapping one of them
//! on a connected reader finds the product.

use std::env;

use rentrack_core::{Money, NewProduct, RentalType, TagId};
use rentrack_db::{Database, DbConfig, DbError};

/// (tag, name, category, rental type, rate in cents)
const DEMO_EQUIPMENT: &[(&str, &str, &str, RentalType, i64)] = &[
    (
        "a55a0019833000e200001b260c02562050e0f800",
        "Cutter 11",
        "Cutters",
        RentalType::PerDay,
        10_000,
    ),
    (
        "a55a0019833000e200001b66040172172092e200",
        "Cutter 02",
        "Cutters",
        RentalType::PerDay,
        10_000,
    ),
    (
        "a55a0019833000e200001b660401601720816400",
        "Cutter 03",
        "Cutters",
        RentalType::PerHour,
        1_500,
    ),
    (
        "a55a0019833000e200001b6604016317208f1100",
        "Cutter 13",
        "Cutters",
        RentalType::PerHour,
        1_500,
    ),
    (
        "a55a0019833000e200001b6604009417203cbf00",
        "Grinder 05",
        "Grinders",
        RentalType::PerHour,
        5_000,
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./rental_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("rentrack seed data generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./rental_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("rentrack seed");
    println!("=============");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected, migrations applied");

    let mut added = 0;
    let mut skipped = 0;

    for (tag, name, category, rental_type, rate_cents) in DEMO_EQUIPMENT {
        let product = NewProduct {
            tag_id: TagId::parse(tag)?,
            name: name.to_string(),
            category: Some(category.to_string()),
            rental_type: *rental_type,
            rate: Money::from_cents(*rate_cents),
        };

        match db.products().insert(&product).await {
            Ok(p) => {
                println!("  + {:<12} {} {}/{}", p.name, p.tag_id, p.rate(), p.rental_type);
                added += 1;
            }
            Err(DbError::DuplicateTag(_)) => {
                println!("  = {:<12} already registered", name);
                skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    println!();
    println!(
        "✓ Seed complete: {} added, {} already present, {} total",
        added,
        skipped,
        db.products().count().await?
    );

    db.close().await;
    Ok(())
}
