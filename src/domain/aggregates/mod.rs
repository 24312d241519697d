//! Aggregates module
pub mod product;
pub mod quote;
pub mod checkout;

pub use product::{Axis, AxisSelection, OptionAxis, ProductConfiguration, ProductDetail, ProductError, ProductOption, compose_item_id, unit_price};
pub use quote::{ItemSnapshot, QuoteItem, QuoteStore, QUOTE_STORAGE_KEY};
pub use checkout::{CheckoutError, OrderConfirmation, OrderSummary, PaymentMethod, TAX_RATE, place_order};
