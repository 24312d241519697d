//! Made Timber quote engine
//!
//! Quote (cart) accumulation and option-based pricing for a lumber
//! storefront.
//!
//! ## Features
//! - Catalog lookup with medida/acabado option axes
//! - Per-unit price derivation and variant identity
//! - De-duplicating quote store persisted to key-value storage
//! - Checkout summary with ITBIS and simulated order placement
//! - JSON HTTP API over all of the above

pub mod api;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod storage;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

pub use catalog::{CatalogProvider, StaticCatalog};
pub use config::{AppConfig, ConfigError, StorageBackend};
pub use domain::aggregates::{
    CheckoutError, ItemSnapshot, OrderConfirmation, OrderSummary, PaymentMethod, ProductConfiguration, ProductDetail,
    ProductError, QuoteItem, QuoteStore,
};
pub use domain::events::QuoteEvent;
pub use domain::value_objects::{Money, Quantity, Slug};
pub use storage::{FileStorage, MemoryStorage, SessionId, Storage, StorageError, StorageProvider};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error(transparent)]
    Product(#[from] ProductError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl StorefrontError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Product(ProductError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Product(ProductError::SelectionRequired(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Product(_) => StatusCode::BAD_REQUEST,
            Self::Checkout(CheckoutError::EmptyQuote) => StatusCode::CONFLICT,
            Self::Storage(StorageError::InvalidKey(_)) => StatusCode::BAD_REQUEST,
            Self::Storage(_) | Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for StorefrontError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
