//! Product listings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use farm_connect_core::{FarmerId, Price, ProductId};

/// A produce listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    /// Price per unit.
    pub price: Price,
    /// Unit of sale (e.g., "kg", "dozen").
    pub unit: String,
    pub quantity_available: u32,
    /// Stored image reference; may be malformed, sanitize before display.
    pub image_url: String,
    pub category: String,
    /// Owning farmer. Not checked against the farmer collection.
    pub farmer_id: FarmerId,
    pub date_listed: DateTime<Utc>,
}

impl Product {
    /// Create a listing with a generated ID, listed now.
    #[must_use]
    pub fn new(listing: NewProduct) -> Self {
        Self {
            id: ProductId::generate(),
            name: listing.name,
            description: listing.description,
            price: listing.price,
            unit: listing.unit,
            quantity_available: listing.quantity_available,
            image_url: listing.image_url,
            category: listing.category,
            farmer_id: listing.farmer_id,
            date_listed: Utc::now(),
        }
    }

    /// Price with its unit (e.g., "₹3.50 / kg").
    #[must_use]
    pub fn price_per_unit(&self) -> String {
        format!("{} / {}", self.price.display(), self.unit)
    }
}

/// Validated fields for a new listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub unit: String,
    pub quantity_available: u32,
    pub image_url: String,
    pub category: String,
    pub farmer_id: FarmerId,
}
