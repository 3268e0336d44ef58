//! Farmer display projection.

use serde::{Deserialize, Serialize};

use farm_connect_core::FarmerId;

/// A farmer as shown on cards and profile pages.
///
/// Seed farmers are independent of any [`User`](super::User); a farmer's
/// listings are the products carrying its ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Farmer {
    pub id: FarmerId,
    pub name: String,
    pub location: String,
    /// Free-text contact number (seed data uses short local numbers).
    pub phone_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture_url: Option<String>,
    pub bio: String,
}
