//! Status and role enums for various entities.

use serde::{Deserialize, Serialize};

/// Role chosen by a user when completing their profile.
///
/// A freshly verified user has no role (`Option<UserRole>::None`) until the
/// profile form is submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Lists produce and receives orders.
    Farmer,
    /// Browses listings and places orders.
    Buyer,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Farmer => write!(f, "farmer"),
            Self::Buyer => write!(f, "buyer"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "farmer" => Ok(Self::Farmer),
            "buyer" => Ok(Self::Buyer),
            _ => Err(format!("invalid user role: {s}")),
        }
    }
}

/// Self-reported gender on the profile form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
    PreferNotToSay,
}

impl Gender {
    /// Human-readable label (e.g., "prefer not to say").
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Other => "other",
            Self::PreferNotToSay => "prefer not to say",
        }
    }
}

/// Order lifecycle status.
///
/// Checkout only ever produces [`OrderStatus::Confirmed`]; the remaining
/// variants exist in the stored schema for later fulfilment stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Pending => "Pending",
            Self::Confirmed => "Confirmed",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        };
        f.write_str(label)
    }
}

/// Payment method offered at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "Cash on Delivery")]
    CashOnDelivery,
    #[serde(rename = "UPI")]
    Upi,
    #[serde(rename = "Card")]
    Card,
    #[serde(rename = "Internet Banking")]
    InternetBanking,
}

impl PaymentMethod {
    /// All payment methods in the order they are offered.
    pub const ALL: [Self; 4] = [
        Self::CashOnDelivery,
        Self::Upi,
        Self::Card,
        Self::InternetBanking,
    ];

    /// Display label, identical to the serialized form.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CashOnDelivery => "Cash on Delivery",
            Self::Upi => "UPI",
            Self::Card => "Card",
            Self::InternetBanking => "Internet Banking",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.label() == s)
            .ok_or_else(|| format!("invalid payment method: {s}"))
    }
}
