//! Profile completion and updates.

use chrono::NaiveDate;
use tracing::instrument;

use farm_connect_core::{Gender, UserRole};

use super::{ImageFallback, require_user, store_image};
use crate::error::{Result, ValidationError};
use crate::models::{FieldUpdate, Notice, User, UserUpdate};
use crate::route::Route;
use crate::state::AppSession;
use crate::upload::{ImageUpload, ImageUploader, PROFILE_PICTURES_PREFIX};

/// Largest accepted profile picture.
pub const MAX_PICTURE_BYTES: usize = 2 * 1024 * 1024;

const PICTURE_FALLBACK: ImageFallback = ImageFallback {
    failed: "Previous image retained if any.",
    skipped: "Profile picture not updated.",
};

/// The signup/profile form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub first_name: String,
    pub last_name: String,
    /// Farmers only; ignored for buyers.
    pub farm_name: String,
    pub role: Option<UserRole>,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<NaiveDate>,
    pub alternate_phone_number: String,
    pub full_address: String,
    pub pincode: String,
    pub state_and_district: String,
    /// Newly selected picture, if any.
    pub picture: Option<ImageUpload>,
}

impl ProfileForm {
    /// Prefill the form from the stored profile.
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        Self {
            first_name: text(&user.first_name),
            last_name: text(&user.last_name),
            farm_name: text(&user.farm_name),
            role: user.role,
            gender: user.gender,
            date_of_birth: user.date_of_birth,
            alternate_phone_number: text(&user.alternate_phone_number),
            full_address: text(&user.full_address),
            pincode: text(&user.pincode),
            state_and_district: text(&user.state_and_district),
            picture: None,
        }
    }

    /// Check required fields for the chosen role.
    ///
    /// # Errors
    ///
    /// Returns the first failing rule.
    pub fn validate(&self) -> std::result::Result<UserRole, ValidationError> {
        if is_blank(&self.first_name) || is_blank(&self.last_name) {
            return Err(ValidationError::NameRequired);
        }
        let role = self.role.ok_or(ValidationError::RoleRequired)?;

        if role == UserRole::Farmer {
            if is_blank(&self.farm_name) {
                return Err(ValidationError::FarmNameRequired);
            }
            if [&self.full_address, &self.pincode, &self.state_and_district]
                .into_iter()
                .any(|field| is_blank(field))
            {
                return Err(ValidationError::AddressRequired);
            }
        }

        if self
            .picture
            .as_ref()
            .is_some_and(|picture| picture.size() > MAX_PICTURE_BYTES)
        {
            return Err(ValidationError::ImageTooLarge { max_mb: 2 });
        }

        Ok(role)
    }

    fn into_update(self, role: UserRole, picture_url: Option<String>) -> UserUpdate {
        let farm_name = match role {
            UserRole::Farmer => FieldUpdate::text(self.farm_name.trim()),
            UserRole::Buyer => FieldUpdate::Clear,
        };

        UserUpdate {
            first_name: FieldUpdate::text(self.first_name.trim()),
            last_name: FieldUpdate::text(self.last_name.trim()),
            farm_name,
            role: FieldUpdate::Set(role),
            gender: FieldUpdate::from_option(self.gender),
            date_of_birth: FieldUpdate::from_option(self.date_of_birth),
            alternate_phone_number: FieldUpdate::text(self.alternate_phone_number.trim()),
            full_address: FieldUpdate::text(self.full_address.trim()),
            pincode: FieldUpdate::text(self.pincode.trim()),
            state_and_district: FieldUpdate::text(self.state_and_district.trim()),
            profile_picture_url: picture_url.map_or(FieldUpdate::Unchanged, FieldUpdate::Set),
        }
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// A saved profile and where to go next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSaved {
    pub user: User,
    /// Upload warnings first, then the confirmation.
    pub notices: Vec<Notice>,
    pub redirect: Route,
}

/// Profile service.
pub struct ProfileService<'a> {
    session: &'a AppSession,
    uploader: Option<&'a dyn ImageUploader>,
}

impl<'a> ProfileService<'a> {
    /// Create a new profile service.
    #[must_use]
    pub fn new(session: &'a AppSession, uploader: Option<&'a dyn ImageUploader>) -> Self {
        Self { session, uploader }
    }

    /// The form prefilled for the logged-in user.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unauthorized` without a session.
    pub fn form(&self) -> Result<ProfileForm> {
        let user = require_user(
            self.session,
            "Please log in first to complete or update your profile.",
        )?;
        Ok(ProfileForm::from_user(&user))
    }

    /// Validate and save the profile, uploading a new picture if one was chosen.
    ///
    /// A failed or skipped upload keeps the previous picture and adds a
    /// notice; the rest of the profile is still saved.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unauthorized` without a session,
    /// `AppError::Validation` for invalid input and `AppError::Session` if
    /// the profile could not be persisted.
    #[instrument(skip(self, form))]
    pub async fn save(&self, mut form: ProfileForm) -> Result<ProfileSaved> {
        let user = require_user(
            self.session,
            "Please log in first to complete or update your profile.",
        )?;
        let role = form.validate()?;

        let mut notices = Vec::new();
        let picture_url = match form.picture.take() {
            Some(picture) => match store_image(
                self.uploader,
                PROFILE_PICTURES_PREFIX,
                user.id.as_str(),
                &picture,
                &PICTURE_FALLBACK,
            )
            .await
            {
                Ok(url) => Some(url),
                Err(notice) => {
                    notices.push(notice);
                    None
                }
            },
            None => None,
        };

        let first_name = form.first_name.trim().to_string();
        let updated = self
            .session
            .update_user(form.into_update(role, picture_url))?
            .unwrap_or(user);

        tracing::info!(user_id = %updated.id, role = %role, "Profile saved");
        notices.push(Notice::info(
            "Profile Updated!",
            format!("Your FarmConnect profile has been updated, {first_name}!"),
        ));

        let redirect = match role {
            UserRole::Farmer => Route::Dashboard,
            UserRole::Buyer => Route::Profile,
        };

        Ok(ProfileSaved {
            user: updated,
            notices,
            redirect,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use farm_connect_core::PhoneNumber;

    use super::*;
    use crate::error::AppError;
    use crate::services::testing::RecordingUploader;
    use crate::session::SessionStore;
    use crate::storage::MemoryStorage;

    fn logged_in() -> AppSession {
        let session: AppSession = SessionStore::new(Box::new(MemoryStorage::new()));
        session
            .login(&PhoneNumber::parse("9876543210").unwrap())
            .unwrap();
        session
    }

    fn buyer_form() -> ProfileForm {
        ProfileForm {
            first_name: "Asha".to_string(),
            last_name: "Rao".to_string(),
            role: Some(UserRole::Buyer),
            ..ProfileForm::default()
        }
    }

    fn farmer_form() -> ProfileForm {
        ProfileForm {
            farm_name: "Green Acres".to_string(),
            role: Some(UserRole::Farmer),
            full_address: "12 Orchard Lane".to_string(),
            pincode: "560001".to_string(),
            state_and_district: "Karnataka, Bengaluru".to_string(),
            ..buyer_form()
        }
    }

    fn picture(size: usize) -> ImageUpload {
        ImageUpload::new("me.png", "image/png", vec![0u8; size])
    }

    #[test]
    fn test_validate_rules() {
        let mut form = buyer_form();
        form.last_name = "  ".to_string();
        assert_eq!(form.validate(), Err(ValidationError::NameRequired));

        let mut form = buyer_form();
        form.role = None;
        assert_eq!(form.validate(), Err(ValidationError::RoleRequired));

        let mut form = farmer_form();
        form.farm_name.clear();
        assert_eq!(form.validate(), Err(ValidationError::FarmNameRequired));

        let mut form = farmer_form();
        form.pincode.clear();
        assert_eq!(form.validate(), Err(ValidationError::AddressRequired));

        let mut form = buyer_form();
        form.picture = Some(picture(MAX_PICTURE_BYTES + 1));
        assert_eq!(
            form.validate(),
            Err(ValidationError::ImageTooLarge { max_mb: 2 })
        );

        assert_eq!(buyer_form().validate(), Ok(UserRole::Buyer));
        assert_eq!(farmer_form().validate(), Ok(UserRole::Farmer));
    }

    #[tokio::test]
    async fn test_save_requires_session() {
        let session: AppSession = SessionStore::new(Box::new(MemoryStorage::new()));
        let err = ProfileService::new(&session, None)
            .save(buyer_form())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_save_buyer_clears_farm_name() {
        let session = logged_in();
        session
            .update_user(UserUpdate {
                farm_name: FieldUpdate::text("Old Farm"),
                ..UserUpdate::default()
            })
            .unwrap();

        let mut form = buyer_form();
        form.farm_name = "Ignored".to_string();
        let saved = ProfileService::new(&session, None).save(form).await.unwrap();

        assert_eq!(saved.redirect, Route::Profile);
        assert_eq!(saved.user.farm_name, None);
        assert_eq!(saved.user.role, Some(UserRole::Buyer));
        assert_eq!(saved.notices.len(), 1);
        assert_eq!(
            saved.notices[0].description,
            "Your FarmConnect profile has been updated, Asha!"
        );
        assert_eq!(session.stored_user().unwrap(), saved.user);
    }

    #[tokio::test]
    async fn test_save_farmer_uploads_picture() {
        let session = logged_in();
        let uploader = RecordingUploader::default();
        let mut form = farmer_form();
        form.picture = Some(picture(16));

        let saved = ProfileService::new(&session, Some(&uploader))
            .save(form)
            .await
            .unwrap();

        assert_eq!(saved.redirect, Route::Dashboard);
        assert_eq!(saved.user.farm_name.as_deref(), Some("Green Acres"));
        let paths = uploader.paths();
        assert_eq!(paths.len(), 1);
        assert!(paths[0].starts_with(&format!("profile_pictures/{}/", saved.user.id)));
        assert_eq!(
            saved.user.profile_picture_url,
            Some(format!("https://storage.example.com/{}", paths[0]))
        );
    }

    #[tokio::test]
    async fn test_failed_upload_keeps_previous_picture() {
        let session = logged_in();
        session
            .update_user(UserUpdate {
                profile_picture_url: FieldUpdate::text("https://cdn.example.com/old.png"),
                ..UserUpdate::default()
            })
            .unwrap();
        let uploader = RecordingUploader::failing();
        let mut form = buyer_form();
        form.picture = Some(picture(16));

        let saved = ProfileService::new(&session, Some(&uploader))
            .save(form)
            .await
            .unwrap();

        assert_eq!(
            saved.user.profile_picture_url.as_deref(),
            Some("https://cdn.example.com/old.png")
        );
        assert_eq!(saved.notices[0].title, "Image Upload Error");
        assert!(saved.notices[0].description.ends_with("Previous image retained if any."));
        assert_eq!(saved.notices[1].title, "Profile Updated!");
    }

    #[tokio::test]
    async fn test_upload_skipped_without_storage() {
        let session = logged_in();
        let mut form = buyer_form();
        form.picture = Some(picture(16));

        let saved = ProfileService::new(&session, None).save(form).await.unwrap();
        assert_eq!(saved.notices[0].title, "Image Upload Skipped");
        assert_eq!(saved.user.profile_picture_url, None);
    }

    #[test]
    fn test_form_prefills_from_user() {
        let session = logged_in();
        session
            .update_user(UserUpdate {
                first_name: FieldUpdate::text("Asha"),
                role: FieldUpdate::Set(UserRole::Farmer),
                ..UserUpdate::default()
            })
            .unwrap();

        let form = ProfileService::new(&session, None).form().unwrap();
        assert_eq!(form.first_name, "Asha");
        assert_eq!(form.last_name, "");
        assert_eq!(form.role, Some(UserRole::Farmer));
    }
}
