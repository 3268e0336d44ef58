//! Orders placed at checkout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use farm_connect_core::{FarmerId, OrderId, OrderStatus, PaymentMethod, Price, ProductId, UserId};

use super::{Product, User};

/// An immutable order with snapshots of the product and the buyer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub product_id: ProductId,
    pub product_name: String,
    pub product_image_url: String,
    pub product_price: Price,
    pub product_unit: String,
    pub farmer_id: FarmerId,
    pub buyer_id: UserId,
    pub buyer_name: String,
    pub buyer_phone_number: String,
    pub order_date: DateTime<Utc>,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub quantity_ordered: u32,
}

impl Order {
    /// Snapshot `product` and `buyer` into a new order dated now.
    ///
    /// Always orders a single unit.
    #[must_use]
    pub fn place(
        product: &Product,
        buyer: &User,
        payment_method: PaymentMethod,
        status: OrderStatus,
    ) -> Self {
        Self {
            id: OrderId::generate(),
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            product_image_url: product.image_url.clone(),
            product_price: product.price,
            product_unit: product.unit.clone(),
            farmer_id: product.farmer_id.clone(),
            buyer_id: buyer.id.clone(),
            buyer_name: buyer.display_name(),
            buyer_phone_number: buyer.phone_number.to_string(),
            order_date: Utc::now(),
            payment_method,
            status,
            quantity_ordered: 1,
        }
    }
}
