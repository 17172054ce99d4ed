//! Unauthenticated storefront reads: catalog, content, stores, events.

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::ok;
use crate::error::Result;
use crate::pagination::PageQuery;
use crate::services::banners::BannerService;
use crate::services::events::EventService;
use crate::services::products::{ProductListFilter, ProductService};
use crate::services::reels::ReelService;
use crate::services::reviews::ReviewService;
use crate::services::stores::StoreService;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/all", get(list_all_products))
        .route("/products/:id", get(get_product))
        .route("/products/:id/reviews", get(product_reviews))
        .route("/banners", get(list_banners))
        .route("/stores", get(list_stores))
        .route("/stores/nearby", get(nearby_stores))
        .route("/stores/:id", get(get_store))
        .route("/events", get(list_events))
        .route("/events/:id", get(get_event))
        .route("/reels", get(list_reels))
}

// serde_urlencoded cannot flatten typed sub-structs, so every query struct
// spells out page/limit itself.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductQuery {
    page: Option<u32>,
    limit: Option<u32>,
    stock_status: Option<String>,
    delivery_status: Option<String>,
    is_active: Option<bool>,
    search: Option<String>,
}

async fn list_products(State(s): State<AppState>, Query(q): Query<ProductQuery>) -> Result<Json<Value>> {
    let filter = ProductListFilter {
        stock_status: q.stock_status,
        delivery_status: q.delivery_status,
        is_active: q.is_active,
        search: q.search,
    };
    let page = PageQuery { page: q.page, limit: q.limit };
    let products = ProductService::new(s.db.clone(), s.storage.clone()).list(&filter, page).await?;
    Ok(ok("Products fetched successfully", products))
}

async fn list_all_products(State(s): State<AppState>) -> Result<Json<Value>> {
    let products = ProductService::new(s.db.clone(), s.storage.clone()).list_all_active().await?;
    Ok(ok("Products fetched successfully", products))
}

async fn get_product(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Value>> {
    let product = ProductService::new(s.db.clone(), s.storage.clone()).get(id).await?;
    Ok(ok("Product fetched successfully", product))
}

async fn product_reviews(
    State(s): State<AppState>,
    Path(id): Path<Uuid>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Value>> {
    let (reviews, summary) = ReviewService::new(s.db.clone()).for_subject("product", id, page).await?;
    Ok(ok("Reviews fetched successfully", json!({ "reviews": reviews, "summary": summary })))
}

async fn list_banners(State(s): State<AppState>) -> Result<Json<Value>> {
    let banners = BannerService::new(s.db.clone(), s.storage.clone()).list_active().await?;
    Ok(ok("Banners fetched successfully", banners))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreListQuery {
    page: Option<u32>,
    limit: Option<u32>,
    is_active: Option<bool>,
    search: Option<String>,
}

async fn list_stores(State(s): State<AppState>, Query(q): Query<StoreListQuery>) -> Result<Json<Value>> {
    let page = PageQuery { page: q.page, limit: q.limit };
    let stores =
        StoreService::new(s.db.clone(), s.storage.clone()).list(page, q.is_active, q.search.as_deref()).await?;
    Ok(ok("Stores fetched successfully", stores))
}

#[derive(Debug, Deserialize)]
struct NearbyQuery {
    page: Option<u32>,
    limit: Option<u32>,
    latitude: f64,
    longitude: f64,
}

async fn nearby_stores(State(s): State<AppState>, Query(q): Query<NearbyQuery>) -> Result<Json<Value>> {
    let page = PageQuery { page: q.page, limit: q.limit };
    let stores = StoreService::new(s.db.clone(), s.storage.clone()).nearby(q.latitude, q.longitude, page).await?;
    Ok(ok("Stores fetched successfully, sorted by distance", stores))
}

async fn get_store(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Value>> {
    let store = StoreService::new(s.db.clone(), s.storage.clone()).get(id).await?;
    Ok(ok("Store fetched successfully", store))
}

#[derive(Debug, Deserialize)]
struct EventListQuery {
    page: Option<u32>,
    limit: Option<u32>,
    status: Option<String>,
    search: Option<String>,
}

async fn list_events(State(s): State<AppState>, Query(q): Query<EventListQuery>) -> Result<Json<Value>> {
    let page = PageQuery { page: q.page, limit: q.limit };
    let events =
        EventService::new(s.db.clone(), s.storage.clone()).list(page, q.status.as_deref(), q.search.as_deref()).await?;
    Ok(ok("Events fetched successfully", events))
}

async fn get_event(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Value>> {
    let event = EventService::new(s.db.clone(), s.storage.clone()).get(id).await?;
    Ok(ok("Event fetched successfully", event))
}

async fn list_reels(State(s): State<AppState>, Query(page): Query<PageQuery>) -> Result<Json<Value>> {
    let reels = ReelService::new(s.db.clone(), s.storage.clone()).list(page, false).await?;
    Ok(ok("Reels fetched successfully", reels))
}
