//! Read-only catalog views: home page, product detail and profiles.
//!
//! Every image URL in these views has been sanitized for its display size.

use farm_connect_core::{FarmerId, PaymentMethod, ProductId};

use super::require_user;
use crate::error::{AppError, Resource, Result};
use crate::filter::ProductFilter;
use crate::images::{
    embedded_image_hint, image_hint_for_category, resolve_image_url, sanitize_image_url, sizes,
};
use crate::models::{Farmer, Product, User};
use crate::state::AppSession;
use crate::store::MockDataStore;

/// Shown when a product's farmer is not in the store.
pub const UNKNOWN_FARMER_NAME: &str = "A Local Farmer";

/// Shown on a farmer's own profile when the store has no bio for them.
pub const DEFAULT_BIO: &str = "Farmer bio not set.";

/// A product as shown in a card or on its detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCard {
    pub product: Product,
    pub image_url: String,
    pub image_hint: String,
    pub farmer_name: String,
    /// e.g. "₹3.50 / kg".
    pub price_label: String,
}

impl ProductCard {
    fn new(product: Product, farmers: &[Farmer], size: &str) -> Self {
        let farmer_name = farmers
            .iter()
            .find(|farmer| farmer.id == product.farmer_id)
            .map_or_else(|| UNKNOWN_FARMER_NAME.to_string(), |farmer| farmer.name.clone());
        let image_hint = embedded_image_hint(&product.image_url)
            .map_or_else(|| image_hint_for_category(&product.category), str::to_owned);

        Self {
            image_url: sanitize_image_url(Some(&product.image_url), size),
            image_hint,
            farmer_name,
            price_label: product.price_per_unit(),
            product,
        }
    }
}

/// The home page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomePage {
    pub cards: Vec<ProductCard>,
    /// Categories for the filter bar.
    pub categories: Vec<String>,
}

/// A product detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDetail {
    pub card: ProductCard,
    pub farmer: Option<Farmer>,
    pub payment_methods: [PaymentMethod; 4],
    /// False for the product's own farmer, who can neither buy nor chat.
    pub can_purchase: bool,
}

/// A farmer profile page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FarmerProfile {
    pub farmer_id: FarmerId,
    pub name: String,
    pub location: String,
    pub bio: String,
    pub portrait_url: String,
    pub listings: Vec<ProductCard>,
    /// Whether the logged-in farmer is viewing their own profile.
    pub is_own: bool,
}

/// The buyer profile page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuyerProfile {
    pub user: User,
    pub display_name: String,
    /// `None` renders as no image.
    pub picture_url: Option<String>,
}

/// Catalog service.
pub struct CatalogService<'a> {
    session: &'a AppSession,
    store: &'a MockDataStore,
}

impl<'a> CatalogService<'a> {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(session: &'a AppSession, store: &'a MockDataStore) -> Self {
        Self { session, store }
    }

    /// Product cards matching `filter`, in listing order.
    #[must_use]
    pub fn home(&self, filter: &ProductFilter) -> HomePage {
        let farmers = self.store.farmers();
        let products = filter.apply(&self.store.products(), &farmers);

        tracing::debug!(
            matched = products.len(),
            filtered = !filter.is_empty(),
            "Built home page"
        );

        HomePage {
            cards: products
                .into_iter()
                .map(|product| ProductCard::new(product, &farmers, sizes::PRODUCT_CARD))
                .collect(),
            categories: self.store.categories(),
        }
    }

    /// A single product.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the product does not exist.
    pub fn product(&self, id: &ProductId) -> Result<ProductDetail> {
        let product = self
            .store
            .find_product(id)
            .ok_or(AppError::NotFound(Resource::Product))?;
        let farmer = self.store.find_farmer(&product.farmer_id);
        let can_purchase = self
            .session
            .current_user()
            .is_none_or(|user| product.farmer_id != user.id);

        Ok(ProductDetail {
            card: ProductCard::new(product, &self.store.farmers(), sizes::PRODUCT_DETAIL),
            farmer,
            payment_methods: PaymentMethod::ALL,
            can_purchase,
        })
    }

    /// A farmer's public profile, or the logged-in farmer's own.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if `id` is neither the logged-in farmer
    /// nor a known farmer.
    pub fn farmer_profile(&self, id: &FarmerId) -> Result<FarmerProfile> {
        let farmers = self.store.farmers();
        let seed = farmers.iter().find(|farmer| farmer.id == *id);
        let listings = self
            .store
            .products_by_farmer(id)
            .into_iter()
            .map(|product| ProductCard::new(product, &farmers, sizes::PRODUCT_CARD))
            .collect();

        if let Some(user) = self
            .session
            .current_user()
            .filter(|user| user.is_farmer() && *id == user.id)
        {
            return Ok(FarmerProfile {
                farmer_id: id.clone(),
                name: user.resolved_farm_name(),
                location: user.location_summary(),
                bio: seed.map_or_else(|| DEFAULT_BIO.to_string(), |farmer| farmer.bio.clone()),
                portrait_url: sanitize_image_url(
                    user.profile_picture_url.as_deref(),
                    sizes::FARMER_PORTRAIT,
                ),
                listings,
                is_own: true,
            });
        }

        let farmer = seed.ok_or(AppError::NotFound(Resource::Farmer))?;
        Ok(FarmerProfile {
            farmer_id: farmer.id.clone(),
            name: farmer.name.clone(),
            location: farmer.location.clone(),
            bio: farmer.bio.clone(),
            portrait_url: sanitize_image_url(
                farmer.profile_picture_url.as_deref(),
                sizes::FARMER_PORTRAIT,
            ),
            listings,
            is_own: false,
        })
    }

    /// The logged-in user's profile page.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unauthorized` without a session.
    pub fn buyer_profile(&self) -> Result<BuyerProfile> {
        let user = require_user(self.session, "Please log in to view your profile.")?;
        Ok(BuyerProfile {
            display_name: user.display_name(),
            picture_url: resolve_image_url(user.profile_picture_url.as_deref()),
            user,
        })
    }
}
