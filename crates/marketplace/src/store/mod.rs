//! In-memory mock data store for farmers, products and orders.
//!
//! # Lifecycle
//!
//! - **Development**: one store per process, shared by every
//!   [`MockDataStore::for_environment`] call so that listings and orders
//!   survive re-initialisation (e.g., a dev reload rebuilding `AppState`).
//! - **Production**: a fresh store from the fixed seed on every call.
//!
//! Seed: 3 farmers, 0 products, 0 orders. Records are only ever appended.

pub mod seed;

use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use farm_connect_core::{FarmerId, ProductId};

use crate::config::Environment;
use crate::models::{Farmer, Order, Product};

static DEV_STORE: OnceLock<Arc<MockDataStore>> = OnceLock::new();

/// Insertion-ordered collections of marketplace records.
#[derive(Debug)]
pub struct MockDataStore {
    farmers: RwLock<Vec<Farmer>>,
    products: RwLock<Vec<Product>>,
    orders: RwLock<Vec<Order>>,
}

impl Default for MockDataStore {
    fn default() -> Self {
        Self::seeded()
    }
}

impl MockDataStore {
    /// A new store holding only the seed farmers.
    #[must_use]
    pub fn seeded() -> Self {
        Self {
            farmers: RwLock::new(seed::farmers()),
            products: RwLock::new(Vec::new()),
            orders: RwLock::new(Vec::new()),
        }
    }

    /// The store to use in `environment`.
    #[must_use]
    pub fn for_environment(environment: Environment) -> Arc<Self> {
        match environment {
            Environment::Development => {
                let store = DEV_STORE.get_or_init(|| {
                    tracing::debug!("Creating shared development data store");
                    Arc::new(Self::seeded())
                });
                Arc::clone(store)
            }
            Environment::Production => Arc::new(Self::seeded()),
        }
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Append a product. IDs are not checked for uniqueness.
    pub fn add_product(&self, product: Product) {
        write(&self.products).push(product);
    }

    /// Append an order. IDs are not checked for uniqueness.
    pub fn add_order(&self, order: Order) {
        write(&self.orders).push(order);
    }

    // =========================================================================
    // Reads
    // =========================================================================

    #[must_use]
    pub fn farmers(&self) -> Vec<Farmer> {
        read(&self.farmers).clone()
    }

    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        read(&self.products).clone()
    }

    #[must_use]
    pub fn orders(&self) -> Vec<Order> {
        read(&self.orders).clone()
    }

    /// Products matching `predicate`, in insertion order.
    pub fn filter_products(&self, predicate: impl Fn(&Product) -> bool) -> Vec<Product> {
        read(&self.products)
            .iter()
            .filter(|product| predicate(product))
            .cloned()
            .collect()
    }

    /// Orders matching `predicate`, in insertion order.
    pub fn filter_orders(&self, predicate: impl Fn(&Order) -> bool) -> Vec<Order> {
        read(&self.orders)
            .iter()
            .filter(|order| predicate(order))
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn find_product(&self, id: &ProductId) -> Option<Product> {
        read(&self.products).iter().find(|p| p.id == *id).cloned()
    }

    #[must_use]
    pub fn find_farmer(&self, id: &FarmerId) -> Option<Farmer> {
        read(&self.farmers).iter().find(|f| f.id == *id).cloned()
    }

    /// Listings owned by `farmer_id`, in insertion order.
    #[must_use]
    pub fn products_by_farmer(&self, farmer_id: &FarmerId) -> Vec<Product> {
        self.filter_products(|product| product.farmer_id == *farmer_id)
    }

    /// Orders received by `farmer_id`, newest first.
    #[must_use]
    pub fn orders_for_farmer(&self, farmer_id: &FarmerId) -> Vec<Order> {
        let mut orders = self.filter_orders(|order| order.farmer_id == *farmer_id);
        orders.sort_by(|a, b| b.order_date.cmp(&a.order_date));
        orders
    }

    /// Distinct product categories in first-seen order.
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        distinct(read(&self.products).iter().map(|p| p.category.as_str()))
    }

    /// Distinct product units in first-seen order.
    #[must_use]
    pub fn units(&self) -> Vec<String> {
        distinct(read(&self.products).iter().map(|p| p.unit.as_str()))
    }
}

fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for value in values {
        if !seen.iter().any(|s| s == value) {
            seen.push(value.to_owned());
        }
    }
    seen
}
