//! JSON HTTP API.
//!
//! Every quote request rehydrates the session's [`QuoteStore`] from storage,
//! applies one operation and lets the store persist it before responding.
//! Concurrent writers to the same session follow last-writer-wins.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::catalog::CatalogProvider;
use crate::domain::aggregates::{
    checkout, OrderConfirmation, OrderSummary, PaymentMethod, ProductConfiguration, ProductDetail, ProductError,
    QuoteItem, QuoteStore,
};
use crate::domain::events::QuoteEvent;
use crate::domain::value_objects::{Money, Quantity};
use crate::storage::{SessionId, Storage, StorageProvider};
use crate::Result;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogProvider>,
    pub storage: Arc<dyn StorageProvider>,
}

impl AppState {
    fn product(&self, slug: &str) -> Result<&ProductDetail> {
        Ok(self.catalog.product_by_slug(slug).ok_or_else(|| ProductError::NotFound(slug.to_string()))?)
    }

    fn open_quote(&self, session: &str) -> Result<(SessionId, QuoteStore<Box<dyn Storage>>)> {
        let session = SessionId::parse(session)?;
        let quote = QuoteStore::load(self.storage.for_session(&session));
        Ok((session, quote))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "made-timber-quote"})) }))
        .route("/api/v1/products", get(list_products))
        .route("/api/v1/products/:slug", get(get_product))
        .route("/api/v1/products/:slug/price", get(price_product))
        .route("/api/v1/sessions", post(create_session))
        .route("/api/v1/quote/:session", get(get_quote).delete(clear_quote))
        .route("/api/v1/quote/:session/items", post(add_quote_item))
        .route("/api/v1/quote/:session/items/:item_id", put(update_quote_item).delete(remove_quote_item))
        .route("/api/v1/checkout/:session", get(checkout_summary).post(place_order))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary { pub slug: String, pub name: String, pub price: Money, pub image_url: Option<String> }

async fn list_products(State(s): State<AppState>) -> Json<Vec<ProductSummary>> {
    Json(s.catalog.products().map(|p| ProductSummary {
        slug: p.slug.to_string(),
        name: p.name.clone(),
        price: p.price,
        image_url: p.images.first().map(|i| i.src.clone()),
    }).collect())
}

async fn get_product(State(s): State<AppState>, Path(slug): Path<String>) -> Result<Json<ProductDetail>> {
    Ok(Json(s.product(&slug)?.clone()))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection { pub medida: Option<String>, pub acabado: Option<String>, pub quantity: Option<i64> }

impl Selection {
    fn apply<'a>(&self, product: &'a ProductDetail) -> std::result::Result<ProductConfiguration<'a>, ProductError> {
        let mut config = product.configure();
        if let Some(medida) = &self.medida { config.select_medida(medida)?; }
        if let Some(acabado) = &self.acabado { config.select_acabado(acabado)?; }
        if let Some(quantity) = self.quantity { config.set_quantity(quantity)?; }
        Ok(config)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub item_id: String,
    pub price_per_unit: Money,
    pub quantity: Quantity,
    pub line_total: Money,
    pub can_add_to_quote: bool,
}

async fn price_product(State(s): State<AppState>, Path(slug): Path<String>, Query(sel): Query<Selection>) -> Result<Json<PriceQuote>> {
    let config = sel.apply(s.product(&slug)?)?;
    Ok(Json(PriceQuote {
        item_id: config.item_id(),
        price_per_unit: config.price_per_unit(),
        quantity: config.quantity(),
        line_total: config.line_total(),
        can_add_to_quote: config.can_add_to_quote(),
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSession { pub session_id: SessionId }

async fn create_session() -> (StatusCode, Json<NewSession>) {
    (StatusCode::CREATED, Json(NewSession { session_id: SessionId::generate() }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteView {
    pub items: Vec<QuoteItem>,
    pub total_items: u64,
    pub total_price: Money,
    /// What the request changed, for confirmation toasts.
    pub events: Vec<QuoteEvent>,
}

impl QuoteView {
    fn drain<S: Storage>(session: &SessionId, quote: &mut QuoteStore<S>) -> Self {
        let events = quote.take_events();
        for event in &events {
            debug!(%session, ?event, "quote event");
        }
        Self { items: quote.items().to_vec(), total_items: quote.total_item_count(), total_price: quote.total_price(), events }
    }
}

async fn get_quote(State(s): State<AppState>, Path(session): Path<String>) -> Result<Json<QuoteView>> {
    let (session, mut quote) = s.open_quote(&session)?;
    Ok(Json(QuoteView::drain(&session, &mut quote)))
}

async fn clear_quote(State(s): State<AppState>, Path(session): Path<String>) -> Result<StatusCode> {
    let (_, mut quote) = s.open_quote(&session)?;
    quote.clear();
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub slug: String,
    #[serde(flatten)]
    pub selection: Selection,
}

async fn add_quote_item(State(s): State<AppState>, Path(session): Path<String>, Json(r): Json<AddItemRequest>) -> Result<(StatusCode, Json<QuoteView>)> {
    let config = r.selection.apply(s.product(&r.slug)?)?;
    let snapshot = config.snapshot()?;
    let (session, mut quote) = s.open_quote(&session)?;
    quote.add_item(snapshot, i64::from(config.quantity().value()));
    Ok((StatusCode::CREATED, Json(QuoteView::drain(&session, &mut quote))))
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest { pub quantity: i64 }

async fn update_quote_item(State(s): State<AppState>, Path((session, item_id)): Path<(String, String)>, Json(r): Json<UpdateQuantityRequest>) -> Result<Json<QuoteView>> {
    let (session, mut quote) = s.open_quote(&session)?;
    quote.update_quantity(&item_id, r.quantity);
    Ok(Json(QuoteView::drain(&session, &mut quote)))
}

async fn remove_quote_item(State(s): State<AppState>, Path((session, item_id)): Path<(String, String)>) -> Result<Json<QuoteView>> {
    let (session, mut quote) = s.open_quote(&session)?;
    quote.remove_item(&item_id);
    Ok(Json(QuoteView::drain(&session, &mut quote)))
}

async fn checkout_summary(State(s): State<AppState>, Path(session): Path<String>) -> Result<Json<OrderSummary>> {
    let (_, quote) = s.open_quote(&session)?;
    Ok(Json(OrderSummary::for_quote(&quote)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

async fn place_order(State(s): State<AppState>, Path(session): Path<String>, Json(r): Json<PlaceOrderRequest>) -> Result<(StatusCode, Json<OrderConfirmation>)> {
    let (_, mut quote) = s.open_quote(&session)?;
    let confirmation = checkout::place_order(&mut quote, r.payment_method)?;
    Ok((StatusCode::CREATED, Json(confirmation)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::storage::MemoryStorageProvider;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        router(AppState {
            catalog: Arc::new(StaticCatalog::lumber().unwrap()),
            storage: Arc::new(MemoryStorageProvider::new()),
        })
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&app(), Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_product_lookup() {
        let app = app();
        let (status, body) = send(&app, Method::GET, "/api/v1/products", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 20);

        let (status, body) = send(&app, Method::GET, "/api/v1/products/caoba-andina", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["medidas"]["kind"], "multipleChoices");
        assert_eq!(body["acabado"]["kind"], "noOptions");

        let (status, _) = send(&app, Method::GET, "/api/v1/products/ebano", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_live_price() {
        let app = app();
        let (status, body) = send(&app, Method::GET, "/api/v1/products/caoba-andina/price", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pricePerUnit"], 2800.0);
        assert_eq!(body["canAddToQuote"], false);

        let (_, body) = send(&app, Method::GET, "/api/v1/products/caoba-andina/price?medida=largo&quantity=2", None).await;
        assert_eq!(body["itemId"], "caoba-andina-largo");
        assert_eq!(body["pricePerUnit"], 3150.0);
        assert_eq!(body["lineTotal"], 6300.0);
        assert_eq!(body["canAddToQuote"], true);

        let (status, _) = send(&app, Method::GET, "/api/v1/products/caoba-andina/price?medida=medio", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_quote_flow() {
        let app = app();
        let (status, body) = send(&app, Method::POST, "/api/v1/sessions", None).await;
        assert_eq!(status, StatusCode::CREATED);
        let session = body["sessionId"].as_str().unwrap().to_string();
        let items = format!("/api/v1/quote/{session}/items");

        let add = json!({"slug": "caoba-andina", "medida": "largo", "quantity": 2});
        let (status, body) = send(&app, Method::POST, &items, Some(add)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["events"][0]["type"], "itemAdded");

        let add = json!({"slug": "caoba-andina", "medida": "largo", "quantity": 3});
        send(&app, Method::POST, &items, Some(add)).await;
        send(&app, Method::POST, &items, Some(json!({"slug": "mdf-9mm"}))).await;

        let (_, body) = send(&app, Method::GET, &format!("/api/v1/quote/{session}"), None).await;
        assert_eq!(body["items"].as_array().unwrap().len(), 2);
        assert_eq!(body["items"][0]["id"], "caoba-andina-largo");
        assert_eq!(body["items"][0]["quantity"], 5);
        assert_eq!(body["items"][0]["selectedMedidaLabel"], "Largo (+RD$350)");
        assert_eq!(body["totalItems"], 6);
        assert_eq!(body["totalPrice"], 16650.0);
        assert!(body["events"].as_array().unwrap().is_empty());

        let (_, body) = send(&app, Method::PUT, &format!("{items}/mdf-9mm"), Some(json!({"quantity": 0}))).await;
        assert_eq!(body["items"].as_array().unwrap().len(), 1);
        assert_eq!(body["events"][0]["type"], "itemRemoved");

        let (_, body) = send(&app, Method::DELETE, &format!("{items}/caoba-andina-largo"), None).await;
        assert_eq!(body["totalItems"], 0);
    }

    #[tokio::test]
    async fn test_add_requires_explicit_choice() {
        let app = app();
        let (status, body) = send(&app, Method::POST, "/api/v1/quote/s1/items", Some(json!({"slug": "playwood"}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("medida"));

        let (status, _) = send(&app, Method::POST, "/api/v1/quote/s1/items", Some(json!({"slug": "mdf-9mm", "quantity": 0}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_invalid_session() {
        let (status, _) = send(&app(), Method::GET, "/api/v1/quote/bad%20session", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_checkout() {
        let app = app();
        let (status, _) = send(&app, Method::POST, "/api/v1/checkout/s2", Some(json!({}))).await;
        assert_eq!(status, StatusCode::CONFLICT);

        send(&app, Method::POST, "/api/v1/quote/s2/items", Some(json!({"slug": "mdf-9mm", "quantity": 2}))).await;
        let (_, summary) = send(&app, Method::GET, "/api/v1/checkout/s2", None).await;
        assert_eq!(summary["subtotal"], 1800.0);
        assert_eq!(summary["tax"], 324.0);
        assert_eq!(summary["total"], 2124.0);

        let (status, body) = send(&app, Method::POST, "/api/v1/checkout/s2", Some(json!({"paymentMethod": "qr"}))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(body["orderNumber"].as_str().unwrap().starts_with("MADE-"));
        assert_eq!(body["paymentMethod"], "qr");

        let (_, body) = send(&app, Method::GET, "/api/v1/quote/s2", None).await;
        assert_eq!(body["totalItems"], 0);
    }

    #[tokio::test]
    async fn test_clear_quote() {
        let app = app();
        send(&app, Method::POST, "/api/v1/quote/s3/items", Some(json!({"slug": "mdf-3mm"}))).await;
        let (status, _) = send(&app, Method::DELETE, "/api/v1/quote/s3", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, body) = send(&app, Method::GET, "/api/v1/quote/s3", None).await;
        assert_eq!(body["items"], json!([]));
    }
}
