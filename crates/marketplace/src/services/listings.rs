//! Farmer listings and the farmer dashboard.

use tracing::instrument;

use farm_connect_core::{Price, ProductId};

use super::{ImageFallback, require_farmer, store_image};
use crate::error::{AppError, Resource, Result, ValidationError};
use crate::images::{placeholder_url, sanitize_image_url, sizes};
use crate::models::{NewProduct, Notice, Order, Product, User};
use crate::route::Route;
use crate::state::AppSession;
use crate::store::MockDataStore;
use crate::upload::{ImageUpload, ImageUploader, PRODUCT_IMAGES_PREFIX};

/// Largest accepted listing image.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Units offered in addition to those already in use.
pub const DEFAULT_UNITS: [&str; 5] = ["piece", "bunch", "kg", "lb", "dozen"];

/// Category always offered last.
pub const OTHER_CATEGORY: &str = "Other";

const IMAGE_FALLBACK: ImageFallback = ImageFallback {
    failed: "Using placeholder.",
    skipped: "Using placeholder image.",
};

/// The new listing form, as entered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingForm {
    pub name: String,
    pub description: String,
    pub price: String,
    pub unit: String,
    pub quantity: String,
    pub category: String,
    pub image: Option<ImageUpload>,
}

/// A validated listing form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidListing {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub unit: String,
    pub quantity_available: u32,
    pub category: String,
}

impl ListingForm {
    /// Check that every field is filled and parse the numbers.
    ///
    /// # Errors
    ///
    /// Returns the first failing rule.
    pub fn validate(&self) -> std::result::Result<ValidListing, ValidationError> {
        let fields = [
            &self.name,
            &self.description,
            &self.price,
            &self.unit,
            &self.quantity,
            &self.category,
        ];
        if fields.iter().any(|field| field.trim().is_empty()) {
            return Err(ValidationError::MissingFields);
        }

        let price = Price::parse_positive(&self.price)?;
        let quantity_available = self
            .quantity
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|quantity| *quantity > 0)
            .ok_or(ValidationError::InvalidQuantity)?;

        if self
            .image
            .as_ref()
            .is_some_and(|image| image.size() > MAX_IMAGE_BYTES)
        {
            return Err(ValidationError::ImageTooLarge { max_mb: 5 });
        }

        Ok(ValidListing {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            price,
            unit: self.unit.trim().to_string(),
            quantity_available,
            category: self.category.trim().to_string(),
        })
    }
}

/// Choices for the listing form's select inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormOptions {
    pub categories: Vec<String>,
    pub units: Vec<String>,
}

/// A newly added listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingAdded {
    pub product: Product,
    /// Upload warnings first, then the confirmation.
    pub notices: Vec<Notice>,
    pub redirect: Route,
}

/// A listing row on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRow {
    pub product: Product,
    pub thumbnail_url: String,
}

/// A received order row on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRow {
    pub order: Order,
    pub thumbnail_url: String,
}

/// The farmer dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    pub farmer: User,
    pub listings: Vec<ListingRow>,
    /// Newest first.
    pub orders: Vec<OrderRow>,
}

/// Listing service.
pub struct ListingService<'a> {
    session: &'a AppSession,
    store: &'a MockDataStore,
    uploader: Option<&'a dyn ImageUploader>,
}

impl<'a> ListingService<'a> {
    /// Create a new listing service.
    #[must_use]
    pub fn new(
        session: &'a AppSession,
        store: &'a MockDataStore,
        uploader: Option<&'a dyn ImageUploader>,
    ) -> Self {
        Self {
            session,
            store,
            uploader,
        }
    }

    /// Categories in use plus "Other", and units in use plus the defaults.
    #[must_use]
    pub fn form_options(&self) -> FormOptions {
        let mut categories = self.store.categories();
        categories.retain(|category| category != OTHER_CATEGORY);
        categories.push(OTHER_CATEGORY.to_string());

        let mut units = self.store.units();
        for unit in DEFAULT_UNITS {
            if !units.iter().any(|u| u == unit) {
                units.push(unit.to_string());
            }
        }

        FormOptions { categories, units }
    }

    /// Validate the form and append a new listing for the logged-in farmer.
    ///
    /// Without a usable upload the listing gets a placeholder image.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unauthorized`/`Forbidden` unless a farmer is
    /// logged in, and `AppError::Validation` for invalid input.
    #[instrument(skip(self, form))]
    pub async fn add_listing(&self, form: ListingForm) -> Result<ListingAdded> {
        let farmer = require_farmer(self.session, "Only farmers can add listings.")?;
        let listing = form.validate()?;

        let mut notices = Vec::new();
        let image_url = match &form.image {
            Some(image) => match store_image(
                self.uploader,
                PRODUCT_IMAGES_PREFIX,
                farmer.id.as_str(),
                image,
                &IMAGE_FALLBACK,
            )
            .await
            {
                Ok(url) => url,
                Err(notice) => {
                    notices.push(notice);
                    placeholder_url(sizes::PRODUCT_CARD)
                }
            },
            None => placeholder_url(sizes::PRODUCT_CARD),
        };

        let product = Product::new(NewProduct {
            name: listing.name,
            description: listing.description,
            price: listing.price,
            unit: listing.unit,
            quantity_available: listing.quantity_available,
            image_url,
            category: listing.category,
            farmer_id: farmer.farmer_id(),
        });
        self.store.add_product(product.clone());

        tracing::info!(
            product_id = %product.id,
            farmer_id = %product.farmer_id,
            "Listing added"
        );
        notices.push(Notice::info(
            "Listing Added!",
            format!(
                "{} has been successfully added to your listings.",
                product.name
            ),
        ));

        Ok(ListingAdded {
            product,
            notices,
            redirect: Route::Dashboard,
        })
    }

    /// The logged-in farmer's own listing, for the edit page.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound(Resource::Listing)` if the listing does
    /// not exist or belongs to another farmer.
    pub fn listing_for_edit(&self, id: &ProductId) -> Result<Product> {
        let farmer = require_farmer(self.session, "Only farmers can edit listings.")?;
        self.store
            .find_product(id)
            .filter(|product| product.farmer_id == farmer.id)
            .ok_or(AppError::NotFound(Resource::Listing))
    }

    /// The logged-in farmer's listings and received orders.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unauthorized`/`Forbidden` unless a farmer is
    /// logged in.
    pub fn dashboard(&self) -> Result<Dashboard> {
        let farmer = require_farmer(self.session, "This page is for farmers only.")?;
        let farmer_id = farmer.farmer_id();

        let listings = self
            .store
            .products_by_farmer(&farmer_id)
            .into_iter()
            .map(|product| ListingRow {
                thumbnail_url: sanitize_image_url(Some(&product.image_url), sizes::LISTING_THUMB),
                product,
            })
            .collect();

        let orders = self
            .store
            .orders_for_farmer(&farmer_id)
            .into_iter()
            .map(|order| OrderRow {
                thumbnail_url: sanitize_image_url(
                    Some(&order.product_image_url),
                    sizes::ORDER_THUMB,
                ),
                order,
            })
            .collect();

        Ok(Dashboard {
            farmer,
            listings,
            orders,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use farm_connect_core::{
        FarmerId, OrderStatus, PaymentMethod, PhoneNumber, UserRole,
    };

    use super::*;
    use crate::models::{FieldUpdate, UserUpdate};
    use crate::services::testing::RecordingUploader;
    use crate::session::SessionStore;
    use crate::storage::MemoryStorage;

    fn session_as(role: Option<UserRole>) -> AppSession {
        let session: AppSession = SessionStore::new(Box::new(MemoryStorage::new()));
        session
            .login(&PhoneNumber::parse("9876543210").unwrap())
            .unwrap();
        session
            .update_user(UserUpdate {
                role: FieldUpdate::from_option(role),
                ..UserUpdate::default()
            })
            .unwrap();
        session
    }

    fn form() -> ListingForm {
        ListingForm {
            name: "Heirloom Tomatoes".to_string(),
            description: "Vine ripened".to_string(),
            price: "3.5".to_string(),
            unit: "kg".to_string(),
            quantity: "20".to_string(),
            category: "Vegetables".to_string(),
            image: None,
        }
    }

    #[test]
    fn test_validate_rules() {
        let mut missing = form();
        missing.unit = " ".to_string();
        assert_eq!(missing.validate(), Err(ValidationError::MissingFields));

        for price in ["abc", "0", "-2"] {
            let mut bad = form();
            bad.price = price.to_string();
            assert!(matches!(
                bad.validate(),
                Err(ValidationError::InvalidPrice(_))
            ));
        }

        for quantity in ["0", "-1", "2.5", "lots"] {
            let mut bad = form();
            bad.quantity = quantity.to_string();
            assert_eq!(bad.validate(), Err(ValidationError::InvalidQuantity));
        }

        let mut large = form();
        large.image = Some(ImageUpload::new(
            "big.jpg",
            "image/jpeg",
            vec![0u8; MAX_IMAGE_BYTES + 1],
        ));
        assert_eq!(
            large.validate(),
            Err(ValidationError::ImageTooLarge { max_mb: 5 })
        );

        let valid = form().validate().unwrap();
        assert_eq!(valid.quantity_available, 20);
        assert_eq!(valid.price.display(), "₹3.50");
    }

    #[tokio::test]
    async fn test_add_listing_requires_farmer() {
        let store = MockDataStore::seeded();

        let anonymous: AppSession = SessionStore::new(Box::new(MemoryStorage::new()));
        let err = ListingService::new(&anonymous, &store, None)
            .add_listing(form())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));

        let buyer = session_as(Some(UserRole::Buyer));
        let err = ListingService::new(&buyer, &store, None)
            .add_listing(form())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(ref m) if m == "Only farmers can add listings."));
        assert!(store.products().is_empty());
    }

    #[tokio::test]
    async fn test_add_listing_without_image_uses_placeholder() {
        let store = MockDataStore::seeded();
        let session = session_as(Some(UserRole::Farmer));
        let farmer = session.current_user().unwrap();

        let added = ListingService::new(&session, &store, None)
            .add_listing(form())
            .await
            .unwrap();

        assert!(added.product.id.as_str().starts_with("prod_"));
        assert_eq!(added.product.farmer_id, farmer.farmer_id());
        assert_eq!(added.product.image_url, "https://placehold.co/600x400.png");
        assert_eq!(added.redirect, Route::Dashboard);
        assert_eq!(added.notices.len(), 1);
        assert_eq!(
            added.notices[0].description,
            "Heirloom Tomatoes has been successfully added to your listings."
        );
        assert_eq!(store.products(), vec![added.product]);
    }

    #[tokio::test]
    async fn test_add_listing_upload_paths() {
        let store = MockDataStore::seeded();
        let session = session_as(Some(UserRole::Farmer));
        let farmer = session.current_user().unwrap();
        let mut with_image = form();
        with_image.image = Some(ImageUpload::new("t.jpg", "image/jpeg", vec![1u8; 8]));

        let uploader = RecordingUploader::default();
        let added = ListingService::new(&session, &store, Some(&uploader))
            .add_listing(with_image.clone())
            .await
            .unwrap();
        assert!(uploader.paths()[0].starts_with(&format!("product_images/{}/", farmer.id)));
        assert!(added.product.image_url.starts_with("https://storage.example.com/"));

        let failing = RecordingUploader::failing();
        let added = ListingService::new(&session, &store, Some(&failing))
            .add_listing(with_image)
            .await
            .unwrap();
        assert_eq!(added.product.image_url, "https://placehold.co/600x400.png");
        assert_eq!(added.notices[0].title, "Image Upload Error");
        assert!(added.notices[0].description.ends_with("Using placeholder."));
    }

    #[tokio::test]
    async fn test_listing_for_edit_only_own() {
        let store = MockDataStore::seeded();
        let session = session_as(Some(UserRole::Farmer));
        let service = ListingService::new(&session, &store, None);
        let own = service.add_listing(form()).await.unwrap().product;

        let mut other = own.clone();
        other.id = ProductId::new("prod_other");
        other.farmer_id = FarmerId::new("farmer1");
        store.add_product(other.clone());

        assert_eq!(service.listing_for_edit(&own.id).unwrap(), own);
        assert!(matches!(
            service.listing_for_edit(&other.id),
            Err(AppError::NotFound(Resource::Listing))
        ));
        assert!(matches!(
            service.listing_for_edit(&ProductId::new("prod_missing")),
            Err(AppError::NotFound(Resource::Listing))
        ));
    }

    #[tokio::test]
    async fn test_dashboard_rows() {
        let store = MockDataStore::seeded();
        let session = session_as(Some(UserRole::Farmer));
        let service = ListingService::new(&session, &store, None);
        let product = service.add_listing(form()).await.unwrap().product;

        let buyer = User::new(
            farm_connect_core::UserId::new("user_buyer"),
            PhoneNumber::parse("9123456789").unwrap(),
        );
        let mut order = Order::place(&product, &buyer, PaymentMethod::CashOnDelivery, OrderStatus::Confirmed);
        order.product_image_url = String::new();
        store.add_order(order.clone());

        let dashboard = service.dashboard().unwrap();
        assert_eq!(dashboard.listings.len(), 1);
        assert_eq!(
            dashboard.listings[0].thumbnail_url,
            "https://placehold.co/600x400.png"
        );
        assert_eq!(dashboard.orders.len(), 1);
        assert_eq!(
            dashboard.orders[0].thumbnail_url,
            "https://placehold.co/40x40.png"
        );
        assert_eq!(dashboard.orders[0].order, order);
    }

    #[test]
    fn test_dashboard_forbidden_for_buyer() {
        let store = MockDataStore::seeded();
        let session = session_as(Some(UserRole::Buyer));
        let err = ListingService::new(&session, &store, None)
            .dashboard()
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(ref m) if m == "This page is for farmers only."));
    }

    #[tokio::test]
    async fn test_form_options() {
        let store = MockDataStore::seeded();
        let session = session_as(Some(UserRole::Farmer));
        let service = ListingService::new(&session, &store, None);

        let options = service.form_options();
        assert_eq!(options.categories, ["Other"]);
        assert_eq!(options.units, DEFAULT_UNITS);

        let mut grams = form();
        grams.unit = "gram".to_string();
        service.add_listing(grams).await.unwrap();
        let options = service.form_options();
        assert_eq!(options.categories, ["Vegetables", "Other"]);
        assert_eq!(options.units[0], "gram");
        assert_eq!(options.units.len(), 6);
    }
}
