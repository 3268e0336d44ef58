//! Unified error handling with Sentry integration.
//!
//! Every workflow returns `Result<T, AppError>`. Callers turn an error into a
//! user-facing [`Notice`] with [`AppError::notice`], and call
//! [`AppError::report`] once per failure to capture storage and internal
//! errors to Sentry. Building a notice has no side effects.

use thiserror::Error;

use farm_connect_core::PriceError;

use crate::models::Notice;
use crate::route::Route;
use crate::services::auth::AuthError;
use crate::session::SessionError;

/// Application-level error type for the marketplace.
#[derive(Debug, Error)]
pub enum AppError {
    /// Session persistence failed.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Form input was rejected.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(Resource),

    /// User is not logged in.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User's role may not perform the action.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A record a workflow looked up and did not find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Product,
    Farmer,
    /// A listing that does not exist or belongs to another farmer.
    Listing,
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Product => write!(f, "product"),
            Self::Farmer => write!(f, "farmer"),
            Self::Listing => write!(f, "listing"),
        }
    }
}

/// Form validation failures.
///
/// The `Display` text is shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter both first and last names.")]
    NameRequired,

    #[error("Please select if you are a farmer or a buyer.")]
    RoleRequired,

    #[error("Please enter your farm name.")]
    FarmNameRequired,

    #[error("Please complete your address details.")]
    AddressRequired,

    #[error("Please fill out all required fields.")]
    MissingFields,

    #[error("Price must be a positive number.")]
    InvalidPrice(#[from] PriceError),

    #[error("Quantity must be a positive whole number.")]
    InvalidQuantity,

    #[error("Please select an image smaller than {max_mb}MB.")]
    ImageTooLarge {
        /// Limit in megabytes.
        max_mb: usize,
    },
}

impl ValidationError {
    /// Short heading for the notice.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::NameRequired => "Name Required",
            Self::RoleRequired => "Role Required",
            Self::FarmNameRequired => "Farm Name Required",
            Self::AddressRequired => "Address Required for Farmers",
            Self::MissingFields => "Missing Fields",
            Self::InvalidPrice(_) => "Invalid Price",
            Self::InvalidQuantity => "Invalid Quantity",
            Self::ImageTooLarge { .. } => "Image Too Large",
        }
    }
}

const SESSION_SAVE_FAILED: &str =
    "Could not save session. Please ensure storage is enabled and not full.";

impl AppError {
    /// Whether this error is an operational failure worth reporting.
    #[must_use]
    pub const fn is_reportable(&self) -> bool {
        matches!(
            self,
            Self::Session(_) | Self::Auth(AuthError::Session(_)) | Self::Internal(_)
        )
    }

    /// Capture storage and internal failures to Sentry.
    ///
    /// Returns the Sentry event ID, or `None` for user-facing errors such as
    /// validation or missing records, which are not reported.
    pub fn report(&self) -> Option<sentry::types::Uuid> {
        if !self.is_reportable() {
            return None;
        }
        let event_id = sentry::capture_error(self);
        tracing::error!(
            error = %self,
            sentry_event_id = %event_id,
            "Workflow error"
        );
        Some(event_id)
    }

    /// Convert to a notice for the user.
    ///
    /// Details of storage and internal failures are not shown.
    #[must_use]
    pub fn notice(&self) -> Notice {

        match self {
            Self::Session(_) => Notice::error("Error", SESSION_SAVE_FAILED),
            Self::Auth(err) => match err {
                AuthError::InvalidPhone(_) => {
                    Notice::error("Invalid Phone Number", "Please enter a valid phone number.")
                }
                AuthError::NotRegistered => Notice::error(
                    "Login Failed",
                    "This phone number is not registered or your profile is incomplete. \
                     Please sign up to continue.",
                ),
                AuthError::InvalidOtp => {
                    Notice::error("Invalid OTP", "The OTP you entered is incorrect.")
                }
                AuthError::Session(_) => Notice::error("Error", SESSION_SAVE_FAILED),
            },
            Self::Validation(err) => Notice::error(err.title(), err.to_string()),
            Self::NotFound(resource) => match resource {
                Resource::Product => Notice::error(
                    "Product Not Found",
                    "This product does not exist or has been removed.",
                ),
                Resource::Farmer => {
                    Notice::error("Farmer Not Found", "This farmer profile does not exist.")
                }
                Resource::Listing => Notice::error(
                    "Listing Not Found",
                    "Could not find the listing or you don't have permission to edit it.",
                ),
            },
            Self::Unauthorized(message) => Notice::info("Login Required", message.clone()),
            Self::Forbidden(message) => Notice::error("Access Denied", message.clone()),
            Self::Internal(_) => Notice::error("Error", "An unexpected error occurred."),
        }
    }

    /// Where to send the user after this error, if anywhere.
    #[must_use]
    pub fn redirect(&self) -> Option<Route> {
        match self {
            Self::Unauthorized(_) => Some(Route::Login),
            Self::Forbidden(_) => Some(Route::Home),
            Self::NotFound(Resource::Listing) => Some(Route::Dashboard),
            _ => None,
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("checkout", "Placed order", Some(&[("product_id", "prod_1")][..]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
