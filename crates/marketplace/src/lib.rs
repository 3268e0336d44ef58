//! FarmConnect marketplace library.
//!
//! The session layer, mock data store, image URL sanitizing and the page
//! workflows of the FarmConnect produce marketplace. There is no UI here:
//! workflows return data and notices for a front end to render.
//!
//! Start from [`state::AppState`], built from a
//! [`config::MarketplaceConfig`], and call [`telemetry::init_tracing`] once
//! at startup.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod filter;
pub mod images;
pub mod models;
pub mod route;
pub mod services;
pub mod session;
pub mod state;
pub mod storage;
pub mod store;
pub mod telemetry;
pub mod upload;

pub use config::MarketplaceConfig;
pub use error::{AppError, Result};
pub use state::AppState;
