//! User domain types.
//!
//! `User` is the single record mirrored into persistent session storage, so
//! its serialized form (camelCase JSON) is the storage schema. There is no
//! version field: older records missing newer fields still load, and empty
//! strings are read back as absent fields.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use farm_connect_core::{FarmerId, Gender, PhoneNumber, UserId, UserRole};

/// Fallback display name when a user has not entered a name.
pub const ANONYMOUS_DISPLAY_NAME: &str = "Valued Customer";

/// Shown on a farmer profile when no address part is known.
pub const LOCATION_NOT_SET: &str = "Location not set";

/// A marketplace user identified by phone number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Phone number that verified this user (natural key).
    pub phone_number: PhoneNumber,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "non_empty")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "non_empty")]
    pub last_name: Option<String>,
    /// Farm name (farmers only).
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "non_empty")]
    pub farm_name: Option<String>,

    /// `None` until the profile is completed.
    #[serde(default, deserialize_with = "lenient")]
    pub role: Option<UserRole>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_date")]
    pub date_of_birth: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "non_empty")]
    pub alternate_phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "non_empty")]
    pub full_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "non_empty")]
    pub pincode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "non_empty")]
    pub state_and_district: Option<String>,

    /// Stored image reference; may be malformed, sanitize before display.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "non_empty")]
    pub profile_picture_url: Option<String>,

    /// Superseded by the address fields; kept so old records still load.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "non_empty")]
    pub location: Option<String>,
}

impl User {
    /// A freshly verified user with no profile yet.
    #[must_use]
    pub fn new(id: UserId, phone_number: PhoneNumber) -> Self {
        Self {
            id,
            phone_number,
            first_name: None,
            last_name: None,
            farm_name: None,
            role: None,
            gender: None,
            date_of_birth: None,
            alternate_phone_number: None,
            full_address: None,
            pincode: None,
            state_and_district: None,
            profile_picture_url: None,
            location: None,
        }
    }

    /// Whether the user has completed their profile by choosing a role.
    #[must_use]
    pub const fn is_registered(&self) -> bool {
        self.role.is_some()
    }

    #[must_use]
    pub fn is_farmer(&self) -> bool {
        self.role == Some(UserRole::Farmer)
    }

    /// The farmer ID under which this user's listings are stored.
    #[must_use]
    pub fn farmer_id(&self) -> FarmerId {
        FarmerId::from(&self.id)
    }

    /// "First Last", whichever name is set, or "Valued Customer".
    #[must_use]
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(name), None) | (None, Some(name)) => name.clone(),
            (None, None) => ANONYMOUS_DISPLAY_NAME.to_string(),
        }
    }

    /// Farm name, falling back to "First Last's Farm" and then "My Farm".
    #[must_use]
    pub fn resolved_farm_name(&self) -> String {
        if let Some(farm_name) = &self.farm_name {
            return farm_name.clone();
        }
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}'s Farm"),
            _ => "My Farm".to_string(),
        }
    }

    /// Address parts joined with ", ", or "Location not set".
    #[must_use]
    pub fn location_summary(&self) -> String {
        let parts: Vec<&str> = [
            &self.full_address,
            &self.state_and_district,
            &self.pincode,
        ]
        .into_iter()
        .filter_map(|part| part.as_deref())
        .collect();

        if parts.is_empty() {
            LOCATION_NOT_SET.to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Change to a single optional field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldUpdate<T> {
    /// Keep the current value.
    #[default]
    Unchanged,
    /// Overwrite with a new value.
    Set(T),
    /// Remove the value.
    Clear,
}

impl<T> FieldUpdate<T> {
    /// `Set` for `Some`, `Clear` for `None`.
    pub fn from_option(value: Option<T>) -> Self {
        value.map_or(Self::Clear, Self::Set)
    }

    fn apply(self, field: &mut Option<T>) {
        match self {
            Self::Unchanged => {}
            Self::Set(value) => *field = Some(value),
            Self::Clear => *field = None,
        }
    }
}

impl FieldUpdate<String> {
    /// Form input: blank text clears the field.
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.trim().is_empty() {
            Self::Clear
        } else {
            Self::Set(value)
        }
    }

    fn apply_text(self, field: &mut Option<String>) {
        match self {
            Self::Set(value) if value.trim().is_empty() => *field = None,
            other => other.apply(field),
        }
    }
}

/// Partial update merged into the active session user.
///
/// Fields left as [`FieldUpdate::Unchanged`] keep their prior values. The
/// user ID and phone number cannot be changed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserUpdate {
    pub first_name: FieldUpdate<String>,
    pub last_name: FieldUpdate<String>,
    pub farm_name: FieldUpdate<String>,
    pub role: FieldUpdate<UserRole>,
    pub gender: FieldUpdate<Gender>,
    pub date_of_birth: FieldUpdate<NaiveDate>,
    pub alternate_phone_number: FieldUpdate<String>,
    pub full_address: FieldUpdate<String>,
    pub pincode: FieldUpdate<String>,
    pub state_and_district: FieldUpdate<String>,
    pub profile_picture_url: FieldUpdate<String>,
}

impl UserUpdate {
    /// Left-biased shallow merge into `user`.
    pub fn apply_to(self, user: &mut User) {
        self.first_name.apply_text(&mut user.first_name);
        self.last_name.apply_text(&mut user.last_name);
        self.farm_name.apply_text(&mut user.farm_name);
        self.role.apply(&mut user.role);
        self.gender.apply(&mut user.gender);
        self.date_of_birth.apply(&mut user.date_of_birth);
        self.alternate_phone_number
            .apply_text(&mut user.alternate_phone_number);
        self.full_address.apply_text(&mut user.full_address);
        self.pincode.apply_text(&mut user.pincode);
        self.state_and_district
            .apply_text(&mut user.state_and_district);
        self.profile_picture_url
            .apply_text(&mut user.profile_picture_url);
    }
}

// =============================================================================
// Lenient deserializers
// =============================================================================

/// Read an optional string, treating blank strings as absent.
fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// Read an optional enum, treating blank or unknown values as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match &v {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) if s.trim().is_empty() => None,
        _ => serde_json::from_value(v).ok(),
    }))
}

/// Read a date stored as `yyyy-MM-dd` or as a full ISO timestamp.
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(|s| {
        let date_part = s.get(..10).unwrap_or(&s);
        NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
    }))
}
