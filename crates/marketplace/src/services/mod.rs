//! Marketplace workflows.
//!
//! # Services
//!
//! - `auth` - Phone OTP login and signup
//! - `profile` - Profile completion and updates
//! - `listings` - Farmer listings and dashboard
//! - `checkout` - Order placement
//! - `catalog` - Read-only views (home, product, farmer, profile)
//! - `chat` - Mock farmer chat
//!
//! Services borrow what they need from [`AppState`](crate::state::AppState)
//! and return data plus the notices to show; they never render anything.

pub mod auth;
pub mod catalog;
pub mod chat;
pub mod checkout;
pub mod listings;
pub mod profile;

use crate::error::{AppError, Result};
use crate::models::{Notice, User};
use crate::state::AppSession;
use crate::upload::{ImageUpload, ImageUploader, object_path};

/// The logged-in user, or `Unauthorized` with `message`.
fn require_user(session: &AppSession, message: &str) -> Result<User> {
    session
        .current_user()
        .ok_or_else(|| AppError::Unauthorized(message.to_string()))
}

/// The logged-in farmer, or `Unauthorized`/`Forbidden` with `message`.
fn require_farmer(session: &AppSession, message: &str) -> Result<User> {
    let user = require_user(session, "Please log in to continue.")?;
    if !user.is_farmer() {
        return Err(AppError::Forbidden(message.to_string()));
    }
    Ok(user)
}

/// What the user is told when a selected image cannot be stored.
struct ImageFallback {
    /// Appended to the upload error.
    failed: &'static str,
    /// Shown when storage is not configured.
    skipped: &'static str,
}

/// Upload `image` under `{prefix}/{owner_id}/`.
///
/// Returns the public URL, or the notice to show when the upload was
/// skipped or failed. Never fails the calling workflow.
async fn store_image(
    uploader: Option<&dyn ImageUploader>,
    prefix: &str,
    owner_id: &str,
    image: &ImageUpload,
    fallback: &ImageFallback,
) -> std::result::Result<String, Notice> {
    let Some(uploader) = uploader else {
        tracing::warn!(prefix, "Image storage not configured, upload skipped");
        return Err(Notice::error(
            "Image Upload Skipped",
            format!("Image storage is not configured correctly. {}", fallback.skipped),
        ));
    };

    let path = object_path(prefix, owner_id, &image.file_name);
    match uploader.upload(&path, image).await {
        Ok(url) => {
            tracing::info!(path = %path, "Image uploaded");
            Ok(url)
        }
        Err(e) => {
            tracing::warn!(error = %e, path = %path, "Image upload failed");
            Err(Notice::error(
                "Image Upload Error",
                format!("Could not upload image: {e}. {}", fallback.failed),
            ))
        }
    }
}
