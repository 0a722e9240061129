//! # Seed Data Generator
//!
//! Fills an empty catalog with generated clothing products.
//!
//! ## Usage
//! ```bash
//! # Generate 50 products (default)
//! cargo run -p storefront-db --bin seed
//!
//! # Custom amount and database
//! cargo run -p storefront-db --bin seed -- --count 200 --db ./data/storefront.db
//! ```
//!
//! ## Generated Products
//! Each product is a `{Gender}'s {Type} - {Color}` garment priced ₹999,
//! discounted to ₹499, with a few categories, tags, sizes and colors.
//! Values are derived from the product index, so runs are reproducible.

use chrono::{DateTime, Duration, Utc};
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;
use storefront_core::{Gender, Money, Product, ProductStatus, DEFAULT_CURRENCY};
use storefront_db::{Database, DbConfig};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

const CLOTHING_TYPES: &[&str] = &["T-Shirts", "Hoodies", "Jackets", "Dresses", "Pants"];
const GENDERS: &[Gender] = &[Gender::Men, Gender::Women, Gender::Unisex];
const CATEGORIES: &[&str] = &["topware", "bottomware", "footware", "winterware", "summerware"];
const TAGS: &[&str] = &[
    "Casual",
    "Trending",
    "Summer",
    "Winter",
    "Best Seller",
    "shirts",
    "hoodies",
    "jackets",
    "dresses",
    "pants",
    "t-shirts",
];
const SIZES: &[&str] = &["S", "M", "L", "XL"];
const COLORS: &[&str] = &["Black", "White", "Navy", "Grey"];
const BRANDS: &[&str] = &["Northloom", "Urban Thread", "Kaveri Mills", "Monsoon Co"];
const MATERIALS: &[&str] = &["Cotton", "Linen", "Polyester", "Wool", "Denim"];

const LIST_PRICE_MAJOR: i64 = 999;
const SALE_PRICE_MAJOR: i64 = 499;

#[derive(Debug, Parser)]
#[command(name = "seed", about = "Storefront seed data generator")]
struct Args {
    /// Number of products to generate
    #[arg(short, long, default_value_t = 50)]
    count: usize,

    /// Database file path
    #[arg(short, long, default_value = "./storefront_dev.db")]
    db: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    println!("🌱 Storefront Seed Data Generator");
    println!("=================================");
    println!("Database: {}", args.db.display());
    println!("Products: {}", args.count);
    println!();

    let db = Database::new(DbConfig::new(&args.db)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Catalog already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating products...");

    let start = Instant::now();
    let mut generated = 0usize;

    // Spread creation times one minute apart, oldest first, ending now
    let first_created = Utc::now() - Duration::minutes(args.count as i64);

    for index in 0..args.count {
        let created_at = first_created + Duration::minutes(index as i64);
        let product = generate_product(index, created_at);

        if let Err(e) = db.products().insert(&product).await {
            eprintln!("Failed to insert {}: {}", product.name, e);
            continue;
        }

        generated += 1;
        println!("  ✅ Inserted product {}", generated);
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} products in {:?}", generated, elapsed);

    let catalog = db.products().list().await?;
    let bestsellers = catalog.iter().filter(|p| p.bestseller).count();
    println!("  Catalog size: {}", catalog.len());
    println!("  Bestsellers:  {}", bestsellers);

    db.close().await;

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Picks `count` entries from `items`, starting at an index-dependent
/// offset and stepping so that neighbours differ.
fn pick(items: &[&str], index: usize, count: usize) -> Vec<String> {
    let mut picked: Vec<String> = Vec::with_capacity(count);
    for step in 0..count {
        let item = items[(index * 7 + step * 3) % items.len()];
        if !picked.iter().any(|p| p == item) {
            picked.push(item.to_string());
        }
    }
    picked
}

fn generate_product(index: usize, created_at: DateTime<Utc>) -> Product {
    let clothing = CLOTHING_TYPES[index % CLOTHING_TYPES.len()];
    let gender = GENDERS[(index / CLOTHING_TYPES.len()) % GENDERS.len()];
    let colors = pick(COLORS, index, 3);
    let headline_color = colors.first().map(String::as_str).unwrap_or("Black");

    let possessive = match gender {
        Gender::Men => "Men's",
        Gender::Women => "Women's",
        Gender::Unisex => "Unisex",
        Gender::Kids => "Kids'",
    };

    let price = Money::from_major(LIST_PRICE_MAJOR);
    let discounted = Money::from_major(SALE_PRICE_MAJOR);

    Product {
        id: Uuid::new_v4().to_string(),
        name: format!("{} {} - {}", possessive, clothing, headline_color),
        description: format!(
            "A {} {} cut for everyday wear. Machine washable.",
            MATERIALS[index % MATERIALS.len()].to_lowercase(),
            clothing.to_lowercase()
        ),
        price,
        discounted_price: Some(discounted),
        discount_percentage: price.percent_off(discounted),
        currency: DEFAULT_CURRENCY.to_string(),
        quantity: 10 + (index * 37 % 91) as i64,
        categories: pick(CATEGORIES, index, 3),
        subcategories: vec![clothing.to_lowercase()],
        tags: pick(TAGS, index, 3),
        sizes: pick(SIZES, index, 3),
        colors,
        brand: Some(BRANDS[index % BRANDS.len()].to_string()),
        material: Some(MATERIALS[index % MATERIALS.len()].to_string()),
        gender: Some(gender),
        image_urls: vec![
            format!("https://loremflickr.com/640/480/fashion?lock={}", index * 2),
            format!("https://loremflickr.com/640/480/fashion?lock={}", index * 2 + 1),
        ],
        bestseller: index % 3 == 0,
        featured: index % 4 == 0,
        new_arrival: index % 5 == 0,
        is_deleted: false,
        status: ProductStatus::Active,
        created_at,
        updated_at: created_at,
    }
}
