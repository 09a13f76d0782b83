//! Sample Command
//!
//! Writes a synthetic sales export for trying the dashboard without real
//! data. Output is a pure function of the seed, so the same command always
//! produces the same file.

use std::path::Path;

use chrono::{Duration, NaiveDate};
use rand::prelude::*;
use rand_chacha::ChaCha20Rng;

use crate::cli::render::Output;
use crate::types::Result;

/// Catalog of products with fixed unit prices, loosely modeled on a
/// UK-based giftware retailer
const PRODUCTS: &[(&str, f64)] = &[
    ("WHITE HANGING HEART T-LIGHT HOLDER", 2.55),
    ("REGENCY CAKESTAND 3 TIER", 12.75),
    ("JUMBO BAG RED RETROSPOT", 1.95),
    ("ASSORTED COLOUR BIRD ORNAMENT", 1.69),
    ("PARTY BUNTING", 4.95),
    ("LUNCH BAG RED RETROSPOT", 1.65),
    ("SET OF 3 CAKE TINS PANTRY DESIGN", 4.95),
    ("PAPER CHAIN KIT VINTAGE CHRISTMAS", 2.95),
    ("SPOTTY BUNTING", 4.25),
    ("CHILLI LIGHTS", 5.75),
];

/// Repeated entries weight the draw toward the home market
const COUNTRIES: &[&str] = &[
    "United Kingdom",
    "United Kingdom",
    "United Kingdom",
    "United Kingdom",
    "United Kingdom",
    "Germany",
    "France",
    "Netherlands",
    "Ireland",
    "Spain",
];

const SPAN_DAYS: i64 = 168;

pub fn run(out_path: &Path, rows: usize, seed: u64) -> Result<()> {
    let out = Output::new();

    write_sample(out_path, rows, seed)?;

    out.success(&format!("Wrote {} rows to {}", rows, out_path.display()));
    out.info(&format!("Try: revlens analyze {}", out_path.display()));
    Ok(())
}

pub(crate) fn write_sample(path: &Path, rows: usize, seed: u64) -> Result<()> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let mut writer = csv::Writer::from_path(path)?;

    writer.write_record([
        "InvoiceDate",
        "Quantity",
        "UnitPrice",
        "Country",
        "Description",
        "CustomerID",
    ])?;

    let start = NaiveDate::from_ymd_opt(2011, 1, 3).unwrap_or_default();

    for _ in 0..rows {
        let date = start + Duration::days(rng.random_range(0..SPAN_DAYS));
        let timestamp = date
            .and_hms_opt(rng.random_range(7..20), rng.random_range(0..60), 0)
            .unwrap_or_default();

        let (description, unit_price) = PRODUCTS[rng.random_range(0..PRODUCTS.len())];
        let country = COUNTRIES[rng.random_range(0..COUNTRIES.len())];

        // Occasional wholesale orders give the detector something to find
        let quantity = if rng.random_range(0..100) < 3 {
            rng.random_range(100..400)
        } else {
            rng.random_range(1..=24)
        };

        // A slice of orders arrives with no customer reference, as real
        // exports do
        let customer_id = if rng.random_range(0..100) < 8 {
            String::new()
        } else {
            rng.random_range(12000..18500).to_string()
        };

        writer.write_record([
            timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            quantity.to_string(),
            format!("{unit_price:.2}"),
            country.to_string(),
            description.to_string(),
            customer_id,
        ])?;
    }

    writer.flush()?;
    Ok(())
}
