//! Application state shared across workflows.

use std::sync::Arc;

use crate::config::MarketplaceConfig;
use crate::services::{
    auth::AuthService, catalog::CatalogService, checkout::CheckoutService,
    listings::ListingService, profile::ProfileService,
};
use crate::session::SessionStore;
use crate::storage::{FileStorage, KeyValueStorage, MemoryStorage};
use crate::store::MockDataStore;
use crate::upload::{FirebaseStorageClient, ImageUploader, UploadError};

/// Session store over whichever storage backend the configuration selects.
pub type AppSession = SessionStore<Box<dyn KeyValueStorage>>;

/// Application state shared across all workflows.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// data store, the session and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: MarketplaceConfig,
    store: Arc<MockDataStore>,
    session: AppSession,
    uploader: Option<Arc<dyn ImageUploader>>,
}

impl AppState {
    /// Create application state from configuration.
    ///
    /// Picks the data store for the configured environment, file-backed
    /// session storage when a session directory is set (in-memory
    /// otherwise), and the Firebase uploader when storage is configured. A
    /// persisted session is restored.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload client cannot be built.
    pub fn new(config: MarketplaceConfig) -> Result<Self, UploadError> {
        let store = MockDataStore::for_environment(config.environment);

        let storage: Box<dyn KeyValueStorage> = match &config.session_dir {
            Some(dir) => Box::new(FileStorage::new(dir)),
            None => Box::new(MemoryStorage::new()),
        };

        let uploader = match &config.storage {
            Some(storage_config) => {
                let client: Arc<dyn ImageUploader> =
                    Arc::new(FirebaseStorageClient::new(storage_config)?);
                Some(client)
            }
            None => None,
        };

        Ok(Self::from_parts(config, store, storage, uploader))
    }

    /// Assemble state from explicit parts and restore any persisted session.
    #[must_use]
    pub fn from_parts(
        config: MarketplaceConfig,
        store: Arc<MockDataStore>,
        storage: Box<dyn KeyValueStorage>,
        uploader: Option<Arc<dyn ImageUploader>>,
    ) -> Self {
        let session = SessionStore::new(storage);
        if let Some(user) = session.load() {
            tracing::info!(user_id = %user.id, "Restored session");
        }

        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                session,
                uploader,
            }),
        }
    }

    /// Get a reference to the marketplace configuration.
    #[must_use]
    pub fn config(&self) -> &MarketplaceConfig {
        &self.inner.config
    }

    /// Get a reference to the mock data store.
    #[must_use]
    pub fn store(&self) -> &MockDataStore {
        &self.inner.store
    }

    /// Get a reference to the session store.
    #[must_use]
    pub fn session(&self) -> &AppSession {
        &self.inner.session
    }

    /// Get the image uploader, if storage is configured.
    #[must_use]
    pub fn uploader(&self) -> Option<&dyn ImageUploader> {
        self.inner.uploader.as_deref()
    }

    // =========================================================================
    // Services
    // =========================================================================

    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(self.session(), self.config().delays)
    }

    #[must_use]
    pub fn profile(&self) -> ProfileService<'_> {
        ProfileService::new(self.session(), self.uploader())
    }

    #[must_use]
    pub fn listings(&self) -> ListingService<'_> {
        ListingService::new(self.session(), self.store(), self.uploader())
    }

    #[must_use]
    pub fn checkout(&self) -> CheckoutService<'_> {
        CheckoutService::new(self.session(), self.store())
    }

    #[must_use]
    pub fn catalog(&self) -> CatalogService<'_> {
        CatalogService::new(self.session(), self.store())
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.inner.config)
            .field("session", &self.inner.session)
            .field("uploads_enabled", &self.inner.uploader.is_some())
            .finish_non_exhaustive()
    }
}
