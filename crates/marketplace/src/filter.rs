//! Product filtering for the home page.

use serde::Deserialize;

use crate::models::{Farmer, Product};

/// Criteria from the home page filter bar.
///
/// Empty fields match everything; non-empty fields are combined with AND.
/// Input is matched as given, without trimming.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductFilter {
    /// Exact category match.
    pub category: String,
    /// Case-insensitive substring of the owning farmer's location.
    pub location: String,
    /// Case-insensitive substring of the product name or description.
    pub search_term: String,
}

impl ProductFilter {
    /// Whether no criteria are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.category.is_empty() && self.location.is_empty() && self.search_term.is_empty()
    }

    /// Apply the filter, preserving the order of `products`.
    ///
    /// `farmers` resolves each product's location. A product whose farmer is
    /// unknown never matches a non-empty location.
    #[must_use]
    pub fn apply(&self, products: &[Product], farmers: &[Farmer]) -> Vec<Product> {
        products
            .iter()
            .filter(|product| self.matches(product, farmers))
            .cloned()
            .collect()
    }

    /// Whether `product` satisfies every set criterion.
    #[must_use]
    pub fn matches(&self, product: &Product, farmers: &[Farmer]) -> bool {
        self.matches_category(product)
            && self.matches_location(product, farmers)
            && self.matches_search(product)
    }

    fn matches_category(&self, product: &Product) -> bool {
        self.category.is_empty() || product.category == self.category
    }

    fn matches_location(&self, product: &Product, farmers: &[Farmer]) -> bool {
        if self.location.is_empty() {
            return true;
        }
        let needle = self.location.to_lowercase();
        farmers
            .iter()
            .find(|farmer| farmer.id == product.farmer_id)
            .is_some_and(|farmer| farmer.location.to_lowercase().contains(&needle))
    }

    fn matches_search(&self, product: &Product) -> bool {
        if self.search_term.is_empty() {
            return true;
        }
        let needle = self.search_term.to_lowercase();
        product.name.to_lowercase().contains(&needle)
            || product.description.to_lowercase().contains(&needle)
    }
}
