//! Checkout Aggregate
//!
//! Turns the current quote into a simulated order: totals with ITBIS, an
//! order number, and an emptied quote. Nothing is charged or stored.

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use crate::domain::aggregates::quote::{QuoteItem, QuoteStore};
use crate::domain::value_objects::Money;
use crate::storage::Storage;

/// ITBIS, 18%.
pub const TAX_RATE: Decimal = Decimal::from_parts(18, 0, 0, false, 2);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub total_items: u64,
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
}

impl OrderSummary {
    pub fn for_quote<S: Storage>(quote: &QuoteStore<S>) -> Self {
        let subtotal = quote.total_price();
        let tax = subtotal.percent(TAX_RATE);
        Self { total_items: quote.total_item_count(), subtotal, tax, total: subtotal.add(&tax) }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod { #[default] Azul, Cardnet, Qr, Cash }

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    pub order_number: String,
    pub payment_method: PaymentMethod,
    pub items: Vec<QuoteItem>,
    pub summary: OrderSummary,
    pub placed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("the quote is empty")]
    EmptyQuote,
}

/// `MADE-` followed by five digits.
pub fn generate_order_number() -> String {
    format!("MADE-{}", rand::thread_rng().gen_range(10000..=99999))
}

/// Confirms the quote as an order and clears it.
pub fn place_order<S: Storage>(quote: &mut QuoteStore<S>, payment_method: PaymentMethod) -> Result<OrderConfirmation, CheckoutError> {
    if quote.is_empty() { return Err(CheckoutError::EmptyQuote); }
    let confirmation = OrderConfirmation {
        order_number: generate_order_number(),
        payment_method,
        items: quote.items().to_vec(),
        summary: OrderSummary::for_quote(quote),
        placed_at: Utc::now(),
    };
    quote.clear();
    info!(
        order_number = %confirmation.order_number,
        total = %confirmation.summary.total,
        items = confirmation.summary.total_items,
        "order placed"
    );
    Ok(confirmation)
}
