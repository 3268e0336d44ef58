//! Domain models for the marketplace.
//!
//! - [`User`] is the only record that outlives the process (via the session
//!   store).
//! - [`Farmer`], [`Product`] and [`Order`] live in the mock data store.
//! - [`ChatMessage`] is held by an open chat session and never stored.

pub mod chat;
pub mod farmer;
pub mod notice;
pub mod order;
pub mod product;
pub mod user;

pub use chat::{ChatMessage, ChatSender};
pub use farmer::Farmer;
pub use notice::{Notice, NoticeVariant};
pub use order::Order;
pub use product::{NewProduct, Product};
pub use user::{FieldUpdate, User, UserUpdate};
