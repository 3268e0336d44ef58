//! Mock checkout.
//!
//! Only Cash on Delivery records an order. Other payment methods answer
//! with a notice and change nothing.

use tracing::instrument;

use farm_connect_core::{OrderStatus, PaymentMethod, ProductId};

use super::require_user;
use crate::error::{AppError, Resource, Result, add_breadcrumb};
use crate::models::{Notice, Order};
use crate::state::AppSession;
use crate::store::MockDataStore;

/// Outcome of a checkout attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutOutcome {
    /// The recorded order, for Cash on Delivery.
    pub order: Option<Order>,
    pub notice: Notice,
}

/// Checkout service.
pub struct CheckoutService<'a> {
    session: &'a AppSession,
    store: &'a MockDataStore,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(session: &'a AppSession, store: &'a MockDataStore) -> Self {
        Self { session, store }
    }

    /// Buy one unit of a product.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unauthorized` without a session,
    /// `AppError::NotFound` for an unknown product and `AppError::Forbidden`
    /// when a farmer tries to buy their own listing.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub fn place_order(
        &self,
        product_id: &ProductId,
        payment_method: PaymentMethod,
    ) -> Result<CheckoutOutcome> {
        let buyer = require_user(self.session, "Please log in to purchase products.")?;
        let product = self
            .store
            .find_product(product_id)
            .ok_or(AppError::NotFound(Resource::Product))?;

        if product.farmer_id == buyer.id {
            return Err(AppError::Forbidden(
                "You cannot buy your own product.".to_string(),
            ));
        }

        if payment_method != PaymentMethod::CashOnDelivery {
            return Ok(CheckoutOutcome {
                order: None,
                notice: Notice::info(
                    "Payment Method Selected (Mock)",
                    format!("Proceeding with {payment_method}. This is a mock action."),
                ),
            });
        }

        let order = Order::place(&product, &buyer, payment_method, OrderStatus::Confirmed);
        self.store.add_order(order.clone());

        tracing::info!(
            order_id = %order.id,
            farmer_id = %order.farmer_id,
            buyer_id = %order.buyer_id,
            "Order placed"
        );
        add_breadcrumb(
            "checkout",
            "Placed order",
            Some(&[
                ("order_id", order.id.as_str()),
                ("product_id", product.id.as_str()),
            ][..]),
        );

        Ok(CheckoutOutcome {
            notice: Notice::info(
                "Order Confirmed!",
                format!(
                    "Your Cash on Delivery order for {} has been placed. \
                     The farmer will be notified.",
                    product.name
                ),
            ),
            order: Some(order),
        })
    }
}
