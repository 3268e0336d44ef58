//! Integration tests for FarmConnect.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p farm-connect-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `session_lifecycle` - Login, profile merge, persistence and storage failures
//! - `marketplace_flow` - Seed data, OTP, listings, checkout and dashboard
//! - `image_urls` - Image URL sanitizing across views
//!
//! Each [`AppState`] built here stands for one browser: it has its own
//! session storage. Pass the same store to several states to model a farmer
//! and a buyer using the marketplace at once.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use farm_connect_core::UserRole;
use farm_connect_marketplace::config::{DelayConfig, Environment, MarketplaceConfig};
use farm_connect_marketplace::models::User;
use farm_connect_marketplace::services::auth::{AuthFlow, MOCK_OTP};
use farm_connect_marketplace::services::profile::ProfileForm;
use farm_connect_marketplace::storage::{KeyValueStorage, MemoryStorage};
use farm_connect_marketplace::store::MockDataStore;
use farm_connect_marketplace::{AppState, Result};

/// Production configuration without any simulated delays.
#[must_use]
pub fn test_config() -> MarketplaceConfig {
    MarketplaceConfig {
        environment: Environment::Production,
        delays: DelayConfig::none(),
        ..MarketplaceConfig::default()
    }
}

/// A fresh seeded store.
#[must_use]
pub fn test_store() -> Arc<MockDataStore> {
    MockDataStore::for_environment(Environment::Production)
}

/// State over `store` with in-memory session storage and no uploads.
#[must_use]
pub fn test_state(store: &Arc<MockDataStore>) -> AppState {
    state_with_storage(store, Box::new(MemoryStorage::new()))
}

/// State over `store` with the given session storage and no uploads.
#[must_use]
pub fn state_with_storage(
    store: &Arc<MockDataStore>,
    storage: Box<dyn KeyValueStorage>,
) -> AppState {
    AppState::from_parts(test_config(), Arc::clone(store), storage, None)
}

/// Sign up through the OTP and profile workflows.
///
/// Farmers get a farm name and a complete address.
///
/// # Errors
///
/// Returns the first workflow error.
pub async fn sign_up(
    state: &AppState,
    phone: &str,
    role: UserRole,
    first_name: &str,
    last_name: &str,
) -> Result<User> {
    let auth = state.auth();
    let challenge = auth.request_otp(phone, AuthFlow::Signup).await?;
    auth.verify_otp(&challenge, MOCK_OTP)?;

    let mut form = ProfileForm {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        role: Some(role),
        ..ProfileForm::default()
    };
    if role == UserRole::Farmer {
        form.farm_name = format!("{first_name}'s Fields");
        form.full_address = "4 Mill Road".to_string();
        form.pincode = "411001".to_string();
        form.state_and_district = "Maharashtra, Pune".to_string();
    }

    Ok(state.profile().save(form).await?.user)
}
