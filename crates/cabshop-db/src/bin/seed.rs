//! # Seed Data Generator
//!
//! Populates a development database with cabs, accessories, materials and
//! customers.
//!
//! ## Usage
//! ```bash
//! # Generate 60 cabs (default) plus the fixed accessory/material catalog
//! cargo run -p cabshop-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p cabshop-db --bin seed -- --count 200
//!
//! # Specify database path
//! cargo run -p cabshop-db --bin seed -- --db ./data/cabshop.db
//! ```
//!
//! Cab quantities cycle through 0..=9 so every stock status shows up.

use cabshop_core::{
    FilterQuery, NewCustomer, NewMaterial, NewStockItem, Page, StockStatus,
};
use cabshop_db::{Database, DbConfig};
use std::env;

/// Makes and their models.
const CAB_MODELS: &[(&str, &[&str])] = &[
    ("Suzuki", &["Multicab Scrum", "Every Wagon", "Carry Dropside", "DA64 Van"]),
    ("Daihatsu", &["Hijet Cargo", "Hijet Deck Van", "Atrai Wagon"]),
    ("Mitsubishi", &["Minicab Bravo", "Minicab Truck"]),
    ("Honda", &["Acty Van", "Acty Truck"]),
    ("Toyota", &["Pixis Van", "Lite Ace"]),
];

const COLORS: &[&str] = &["white", "silver", "red", "blue", "black"];

/// (name, make, price_cents, quantity)
const ACCESSORIES: &[(&str, &str, i64, i64)] = &[
    ("Roof Rack", "Thule", 450_000, 12),
    ("Seat Cover Set", "OEM", 125_000, 30),
    ("Side Mirror", "OEM", 85_000, 4),
    ("Bull Bar", "Ironman", 980_000, 2),
    ("Mud Flaps", "OEM", 35_000, 0),
    ("LED Headlight Kit", "Philips", 320_000, 7),
    ("Canopy", "Custom", 1_500_000, 1),
];

/// (name, category, supplier, unit, quantity, cost_cents)
const MATERIALS: &[(&str, &str, &str, &str, i64, i64)] = &[
    ("Epoxy Primer", "paint", "Boysen", "liters", 40, 65_000),
    ("Automotive Topcoat", "paint", "Davies", "liters", 25, 120_000),
    ("Pop Rivets 4mm", "hardware", "Ace", "pcs", 2_000, 150),
    ("Galvanized Sheet", "metal", "Steelasia", "sheets", 18, 210_000),
    ("Welding Rod", "metal", "Lincoln", "kg", 30, 18_000),
];

const CUSTOMERS: &[(&str, &str)] = &[
    ("Juan Dela Cruz", "juan@example.com"),
    ("Maria Santos", "maria@example.com"),
    ("Jose Rizal Trading", "orders@rizaltrading.example.com"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 60;
    let mut db_path = String::from("./cabshop_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(60);
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
                println!("Cabshop Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of cabs to generate (default: 60)");
                println!("  -d, --db <PATH>    Database file path (default: ./cabshop_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Cabshop Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!("Cabs:     {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.cabs().list(&FilterQuery::new(), Page::new(Some(1), None)).await?;
    if !existing.is_empty() {
        println!("⚠ Database already has cabs");
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating cabs...");
    let start = std::time::Instant::now();

    let models: Vec<(&str, &str)> = CAB_MODELS
        .iter()
        .flat_map(|(make, names)| names.iter().map(move |name| (*make, *name)))
        .collect();

    let mut generated = 0;
    for seed in 0..count {
        let (make, name) = models[seed % models.len()];
        let cab = generate_cab(make, name, seed);

        if let Err(e) = db.cabs().create(&cab).await {
            eprintln!("Failed to insert {}: {}", cab.name, e);
            continue;
        }
        generated += 1;
    }
    println!("✓ Generated {} cabs in {:?}", generated, start.elapsed());

    for (name, make, price_cents, quantity) in ACCESSORIES {
        db.accessories()
            .create(&NewStockItem {
                name: name.to_string(),
                make: make.to_string(),
                unit_color: String::new(),
                price_cents: *price_cents,
                quantity: *quantity,
                image: None,
            })
            .await?;
    }
    println!("✓ Generated {} accessories", ACCESSORIES.len());

    for (name, category, supplier, unit, quantity, cost_cents) in MATERIALS {
        db.materials()
            .create(&NewMaterial {
                name: name.to_string(),
                category: category.to_string(),
                supplier: supplier.to_string(),
                unit: unit.to_string(),
                quantity: *quantity,
                cost_cents: *cost_cents,
            })
            .await?;
    }
    println!("✓ Generated {} materials", MATERIALS.len());

    for (name, email) in CUSTOMERS {
        db.customers()
            .create(&NewCustomer {
                name: name.to_string(),
                email: Some(email.to_string()),
                phone: None,
                address: None,
            })
            .await?;
    }
    println!("✓ Generated {} customers", CUSTOMERS.len());

    println!();
    println!("Verifying filters...");
    for status in [StockStatus::OutOfStock, StockStatus::Available] {
        let found = db
            .cabs()
            .list(
                &FilterQuery::new().with("status", status.label()),
                Page::new(Some(500), None),
            )
            .await?;
        println!("  status = {:<13} {} cabs", status.label(), found.len());
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates a single cab with deterministic pseudo-random details.
fn generate_cab(make: &str, name: &str, seed: usize) -> NewStockItem {
    // ₱120,000 - ₱359,000 in steps of ₱1,000
    let price_cents = (120_000 + ((seed * 7_919) % 240) as i64 * 1_000) * 100;

    NewStockItem {
        name: name.to_string(),
        make: make.to_string(),
        unit_color: COLORS[seed % COLORS.len()].to_string(),
        price_cents,
        quantity: (seed % 10) as i64,
        image: None,
    }
}
