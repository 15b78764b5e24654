// Inventory export to CSV

use anyhow::{Context, Result};
use serde::Serialize;

use crate::models::Listing;

#[derive(Serialize)]
struct InventoryRow<'a> {
    id: &'a str,
    manufacturer: &'a str,
    model: &'a str,
    year: Option<i32>,
    mileage: Option<f64>,
    price: Option<f64>,
    tax_rate: Option<f64>,
    price_with_tax: Option<f64>,
    engine: &'a str,
    transmission: &'a str,
    fuel_type: &'a str,
    status: String,
    showrooms: String,
    features: String,
}

impl<'a> From<&'a Listing> for InventoryRow<'a> {
    fn from(listing: &'a Listing) -> Self {
        InventoryRow {
            id: &listing.id,
            manufacturer: listing.manufacturer.as_deref().unwrap_or(""),
            model: listing.model.as_deref().unwrap_or(""),
            year: listing.year,
            mileage: listing.mileage,
            price: listing.price,
            tax_rate: listing.tax_rate,
            price_with_tax: listing.price_with_tax(),
            engine: listing.specification.engine.as_deref().unwrap_or(""),
            transmission: listing.specification.transmission.as_deref().unwrap_or(""),
            fuel_type: listing.specification.fuel_type.as_deref().unwrap_or(""),
            status: listing.status_bucket().map(|b| b.to_string()).unwrap_or_default(),
            showrooms: listing.showrooms.iter().map(|s| s.name.as_str()).collect::<Vec<_>>().join("; "),
            features: listing.features.join("; "),
        }
    }
}

/// Writes the listings as CSV (with header row) into memory.
pub fn inventory_csv(listings: &[Listing]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for listing in listings {
        writer
            .serialize(InventoryRow::from(listing))
            .with_context(|| format!("Failed to write CSV row for listing {}", listing.id))?;
    }
    writer.into_inner().context("Failed to flush CSV writer")
}
