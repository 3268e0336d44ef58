//! Pages a workflow can send the user to next.

use core::fmt;

use farm_connect_core::{FarmerId, ProductId, UserRole};

/// A navigation target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Signup,
    Profile,
    Dashboard,
    NewListing,
    Product(ProductId),
    Farmer(FarmerId),
}

impl Route {
    /// Landing page for a user with `role`.
    #[must_use]
    pub const fn home_for(role: Option<UserRole>) -> Self {
        match role {
            Some(UserRole::Farmer) => Self::Dashboard,
            _ => Self::Home,
        }
    }

    /// URL path of the page.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Login => "/login".to_string(),
            Self::Signup => "/signup".to_string(),
            Self::Profile => "/profile".to_string(),
            Self::Dashboard => "/dashboard".to_string(),
            Self::NewListing => "/dashboard/listings/new".to_string(),
            Self::Product(id) => format!("/products/{id}"),
            Self::Farmer(id) => format!("/farmers/{id}"),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
