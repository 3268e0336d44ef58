//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types.
//!
//! IDs are strings because records are keyed by ids such as `farmer1` (seed
//! data) or `prod_<uuid>` (generated at submission time).

use crate::types::phone::PhoneNumber;

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `generate()` producing `<prefix>_<uuid>`
/// - `From<&str>`, `From<String>` and `Into<String>` implementations
///
/// # Example
///
/// ```rust
/// # use farm_connect_core::define_id;
/// define_id!(ListingId, "listing");
/// define_id!(InvoiceId, "invoice");
///
/// let listing_id = ListingId::new("listing_1");
/// let generated = InvoiceId::generate();
/// assert!(generated.as_str().starts_with("invoice_"));
///
/// // These are different types, so this won't compile:
/// // let _: ListingId = generated;
/// # let _ = listing_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Prefix used by [`Self::generate`].
            pub const PREFIX: &'static str = $prefix;

            /// Create an ID from an existing value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a new unique ID of the form `<prefix>_<uuid>`.
            #[must_use]
            pub fn generate() -> Self {
                Self(format!("{}_{}", $prefix, ::uuid::Uuid::new_v4().simple()))
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Define standard entity IDs
define_id!(UserId, "user");
define_id!(FarmerId, "farmer");
define_id!(ProductId, "prod");
define_id!(OrderId, "order");
define_id!(MessageId, "msg");

impl UserId {
    /// Generate a user ID bound to the phone number that verified it.
    ///
    /// The uuid suffix keeps two sign-ups with the same phone distinct.
    #[must_use]
    pub fn for_phone(phone: &PhoneNumber) -> Self {
        Self(format!(
            "{}_{}_{}",
            Self::PREFIX,
            phone.as_str(),
            uuid::Uuid::new_v4().simple()
        ))
    }
}

/// A user who lists produce owns those listings under their own user ID.
impl From<&UserId> for FarmerId {
    fn from(id: &UserId) -> Self {
        Self(id.0.clone())
    }
}

impl PartialEq<UserId> for FarmerId {
    fn eq(&self, other: &UserId) -> bool {
        self.0 == other.0
    }
}
