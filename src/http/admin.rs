//! Admin management endpoints. Everything here sits behind the admin-role
//! bearer token.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{delete, get, patch, post, put};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::{ok, MultipartBody};
use crate::auth::{AuthAdmin, ROLE_ADMIN};
use crate::error::{AppError, Result};
use crate::pagination::PageQuery;
use crate::services::accounts::AccountService;
use crate::services::banners::BannerService;
use crate::services::boxes::{BoxInput, BoxService};
use crate::services::coupons::{CouponInput, CouponService};
use crate::services::events::{EventInput, EventService};
use crate::services::orders::{AdminOrderFilter, OrderService};
use crate::services::products::{CreateProductInput, ProductService, UpdateProductInput};
use crate::services::reels::ReelService;
use crate::services::reviews::ReviewService;
use crate::services::stores::{StoreInput, StoreService};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/products", get(list_products).post(create_product))
        .route("/products/:id", get(get_product).put(update_product).delete(delete_product))
        .route("/products/:id/toggle", patch(toggle_product))
        .route("/coupons", get(list_coupons).post(create_coupon))
        .route("/coupons/:id", get(get_coupon).put(update_coupon).delete(delete_coupon))
        .route("/coupons/:id/toggle", patch(toggle_coupon))
        .route("/boxes", get(list_boxes).post(create_box))
        .route("/boxes/:id", get(get_box).put(update_box).delete(delete_box))
        .route("/orders", get(list_orders))
        .route("/orders/export", get(export_orders))
        .route("/orders/:id", get(get_order))
        .route("/users", get(list_users))
        .route("/users/:id/toggle", patch(toggle_user))
        .route("/reels", get(list_reels).post(create_reel))
        .route("/reels/:id", put(update_reel).delete(delete_reel))
        .route("/reels/:id/toggle", patch(toggle_reel))
        .route("/reviews", get(list_reviews))
        .route("/reviews/:id", patch(moderate_review).delete(delete_review))
        .route("/banners", get(list_banners).post(create_banner))
        .route("/banners/:id", delete(delete_banner))
        .route("/banners/:id/toggle", patch(toggle_banner))
        .route("/stores", post(create_store))
        .route("/stores/:id", put(update_store).delete(delete_store))
        .route("/stores/:id/toggle", patch(toggle_store))
        .route("/events", post(create_event))
        .route("/events/:id", put(update_event).delete(delete_event))
        .route("/events/:id/status", patch(set_event_status))
        .route("/events/:id/toggle", patch(toggle_event))
}

#[derive(Debug, Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

async fn login(State(s): State<AppState>, Json(body): Json<LoginBody>) -> Result<Json<Value>> {
    let response = AccountService::new(s).login(&body.email, &body.password).await?;
    if response.user.role != ROLE_ADMIN {
        return Err(AppError::Forbidden("You do not have permission to perform this action".into()));
    }
    Ok(ok("Login successful", response))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductListQuery {
    page: Option<u32>,
    limit: Option<u32>,
    stock_status: Option<String>,
    delivery_status: Option<String>,
    is_active: Option<bool>,
    search: Option<String>,
}

async fn list_products(
    State(s): State<AppState>,
    AuthAdmin(_): AuthAdmin,
    Query(q): Query<ProductListQuery>,
) -> Result<Json<Value>> {
    let filter = crate::services::products::ProductListFilter {
        stock_status: q.stock_status,
        delivery_status: q.delivery_status,
        is_active: q.is_active,
        search: q.search,
    };
    let page = PageQuery { page: q.page, limit: q.limit };
    let products = ProductService::new(s.db.clone(), s.storage.clone()).list(&filter, page).await?;
    Ok(ok("Products fetched successfully", products))
}

async fn create_product(
    State(s): State<AppState>,
    AuthAdmin(_): AuthAdmin,
    multipart: Multipart,
) -> Result<Json<Value>> {
    let mut body = MultipartBody::read(multipart).await?;
    let input = CreateProductInput {
        name: body.text("name")?.to_string(),
        description: body.text("description")?.to_string(),
        variants: if body.fields.contains_key("variants") { body.json_field("variants")? } else { vec![] },
        delivery_status: body.fields.get("deliveryStatus").cloned(),
        stock_status: body.fields.get("stockStatus").cloned(),
    };
    let images = body.take_files("images");
    let banner_images = body.take_files("bannerImages");
    let product = ProductService::new(s.db.clone(), s.storage.clone()).create(input, images, banner_images).await?;
    Ok(ok("Product created successfully", product))
}

async fn update_product(
    State(s): State<AppState>,
    AuthAdmin(_): AuthAdmin,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<Value>> {
    let mut body = MultipartBody::read(multipart).await?;
    let input = UpdateProductInput {
        name: body.fields.get("name").cloned(),
        description: body.fields.get("description").cloned(),
        variants: if body.fields.contains_key("variants") { Some(body.json_field("variants")?) } else { None },
        delivery_status: body.fields.get("deliveryStatus").cloned(),
        stock_status: body.fields.get("stockStatus").cloned(),
        is_active: body.fields.get("isActive").and_then(|v| v.parse().ok()),
        existing_images: if body.fields.contains_key("existingImages") {
            body.json_field("existingImages")?
        } else {
            vec![]
        },
        existing_banner_images: if body.fields.contains_key("existingBannerImages") {
            body.json_field("existingBannerImages")?
        } else {
            vec![]
        },
    };
    let new_images = body.take_files("newImages");
    let new_banner_images = body.take_files("newBannerImages");
    let product =
        ProductService::new(s.db.clone(), s.storage.clone()).update(id, input, new_images, new_banner_images).await?;
    Ok(ok("Product updated successfully", product))
}

async fn get_product(State(s): State<AppState>, AuthAdmin(_): AuthAdmin, Path(id): Path<Uuid>) -> Result<Json<Value>> {
    let product = ProductService::new(s.db.clone(), s.storage.clone()).get(id).await?;
    Ok(ok("Product fetched successfully", product))
}

async fn toggle_product(State(s): State<AppState>, AuthAdmin(_): AuthAdmin, Path(id): Path<Uuid>) -> Result<Json<Value>> {
    let product = ProductService::new(s.db.clone(), s.storage.clone()).toggle_status(id).await?;
    Ok(ok("Product status updated", product))
}

async fn delete_product(State(s): State<AppState>, AuthAdmin(_): AuthAdmin, Path(id): Path<Uuid>) -> Result<Json<Value>> {
    ProductService::new(s.db.clone(), s.storage.clone()).delete(id).await?;
    Ok(ok("Product deleted successfully", json!(null)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CouponListQuery {
    page: Option<u32>,
    limit: Option<u32>,
    is_active: Option<bool>,
    search: Option<String>,
}

async fn list_coupons(
    State(s): State<AppState>,
    AuthAdmin(_): AuthAdmin,
    Query(q): Query<CouponListQuery>,
) -> Result<Json<Value>> {
    let page = PageQuery { page: q.page, limit: q.limit };
    let coupons = CouponService::new(s.db.clone()).list(page, q.is_active, q.search.as_deref()).await?;
    Ok(ok("Coupons fetched successfully", coupons))
}

async fn create_coupon(
    State(s): State<AppState>,
    AuthAdmin(_): AuthAdmin,
    Json(body): Json<CouponInput>,
) -> Result<Json<Value>> {
    let coupon = CouponService::new(s.db.clone()).create(body).await?;
    Ok(ok("Coupon created successfully", coupon))
}

async fn get_coupon(State(s): State<AppState>, AuthAdmin(_): AuthAdmin, Path(id): Path<Uuid>) -> Result<Json<Value>> {
    let coupon = CouponService::new(s.db.clone()).get(id).await?;
    Ok(ok("Coupon fetched successfully", coupon))
}

async fn update_coupon(
    State(s): State<AppState>,
    AuthAdmin(_): AuthAdmin,
    Path(id): Path<Uuid>,
    Json(body): Json<CouponInput>,
) -> Result<Json<Value>> {
    let coupon = CouponService::new(s.db.clone()).update(id, body).await?;
    Ok(ok("Coupon updated successfully", coupon))
}

async fn toggle_coupon(State(s): State<AppState>, AuthAdmin(_): AuthAdmin, Path(id): Path<Uuid>) -> Result<Json<Value>> {
    let coupon = CouponService::new(s.db.clone()).toggle_status(id).await?;
    Ok(ok("Coupon status updated", coupon))
}

async fn delete_coupon(State(s): State<AppState>, AuthAdmin(_): AuthAdmin, Path(id): Path<Uuid>) -> Result<Json<Value>> {
    CouponService::new(s.db.clone()).delete(id).await?;
    Ok(ok("Coupon deleted successfully", json!(null)))
}

async fn list_boxes(
    State(s): State<AppState>,
    AuthAdmin(_): AuthAdmin,
    Query(page): Query<PageQuery>,
) -> Result<Json<Value>> {
    let boxes = BoxService::new(s.db.clone()).list(page).await?;
    Ok(ok("Boxes fetched successfully", boxes))
}

async fn create_box(
    State(s): State<AppState>,
    AuthAdmin(_): AuthAdmin,
    Json(body): Json<BoxInput>,
) -> Result<Json<Value>> {
    let created = BoxService::new(s.db.clone()).create(body).await?;
    Ok(ok("Box created successfully", created))
}

async fn get_box(State(s): State<AppState>, AuthAdmin(_): AuthAdmin, Path(id): Path<Uuid>) -> Result<Json<Value>> {
    let found = BoxService::new(s.db.clone()).get(id).await?;
    Ok(ok("Box fetched successfully", found))
}

async fn update_box(
    State(s): State<AppState>,
    AuthAdmin(_): AuthAdmin,
    Path(id): Path<Uuid>,
    Json(body): Json<BoxInput>,
) -> Result<Json<Value>> {
    let updated = BoxService::new(s.db.clone()).update(id, body).await?;
    Ok(ok("Box updated successfully", updated))
}

async fn delete_box(State(s): State<AppState>, AuthAdmin(_): AuthAdmin, Path(id): Path<Uuid>) -> Result<Json<Value>> {
    BoxService::new(s.db.clone()).delete(id).await?;
    Ok(ok("Box deleted successfully", json!(null)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderListQuery {
    page: Option<u32>,
    limit: Option<u32>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    status: Option<String>,
    payment_status: Option<String>,
    payment_method: Option<String>,
    search: Option<String>,
}

impl OrderListQuery {
    fn filter(&self) -> AdminOrderFilter {
        AdminOrderFilter {
            start_date: self.start_date,
            end_date: self.end_date,
            status: self.status.clone(),
            payment_status: self.payment_status.clone(),
            payment_method: self.payment_method.clone(),
            search: self.search.clone(),
        }
    }
}

async fn list_orders(
    State(s): State<AppState>,
    AuthAdmin(_): AuthAdmin,
    Query(q): Query<OrderListQuery>,
) -> Result<Json<Value>> {
    let page = PageQuery { page: q.page, limit: q.limit };
    let orders = OrderService::new(s).admin_orders(&q.filter(), page).await?;
    Ok(ok("Orders fetched successfully", orders))
}

async fn get_order(State(s): State<AppState>, AuthAdmin(_): AuthAdmin, Path(id): Path<Uuid>) -> Result<Json<Value>> {
    let order = OrderService::new(s).admin_order(id).await?;
    Ok(ok("Order fetched successfully", order))
}

async fn export_orders(
    State(s): State<AppState>,
    AuthAdmin(_): AuthAdmin,
    Query(q): Query<OrderListQuery>,
) -> Result<impl IntoResponse> {
    let workbook = OrderService::new(s).export_excel(&q.filter()).await?;
    Ok((
        [
            (
                header::CONTENT_TYPE,
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet".to_string(),
            ),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"orders.xlsx\"".to_string()),
        ],
        workbook,
    ))
}

#[derive(Debug, Deserialize)]
struct UserListQuery {
    page: Option<u32>,
    limit: Option<u32>,
    search: Option<String>,
}

async fn list_users(
    State(s): State<AppState>,
    AuthAdmin(_): AuthAdmin,
    Query(q): Query<UserListQuery>,
) -> Result<Json<Value>> {
    let page = PageQuery { page: q.page, limit: q.limit };
    let users = AccountService::new(s).list_users(page, q.search.as_deref()).await?;
    Ok(ok("Users fetched successfully", users))
}

async fn toggle_user(State(s): State<AppState>, AuthAdmin(_): AuthAdmin, Path(id): Path<Uuid>) -> Result<Json<Value>> {
    let user = AccountService::new(s).toggle_user_status(id).await?;
    Ok(ok("User status updated", user))
}

async fn list_reels(
    State(s): State<AppState>,
    AuthAdmin(_): AuthAdmin,
    Query(page): Query<PageQuery>,
) -> Result<Json<Value>> {
    let reels = ReelService::new(s.db.clone(), s.storage.clone()).list(page, true).await?;
    Ok(ok("Reels fetched successfully", reels))
}

async fn create_reel(State(s): State<AppState>, AuthAdmin(_): AuthAdmin, multipart: Multipart) -> Result<Json<Value>> {
    let mut body = MultipartBody::read(multipart).await?;
    let title = body.text("title")?.to_string();
    let subtitle = body.fields.get("subtitle").cloned();
    let video = body.take_file("video")?;
    let thumbnail = body.take_file("thumbnail")?;
    let reel =
        ReelService::new(s.db.clone(), s.storage.clone()).create(&title, subtitle.as_deref(), video, thumbnail).await?;
    Ok(ok("Reel created successfully", reel))
}

async fn update_reel(
    State(s): State<AppState>,
    AuthAdmin(_): AuthAdmin,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<Value>> {
    let mut body = MultipartBody::read(multipart).await?;
    let title = body.fields.get("title").cloned();
    let subtitle = body.fields.get("subtitle").cloned();
    let video = body.take_files("video").into_iter().next();
    let thumbnail = body.take_files("thumbnail").into_iter().next();
    let reel = ReelService::new(s.db.clone(), s.storage.clone())
        .update(id, title.as_deref(), subtitle.as_deref(), video, thumbnail)
        .await?;
    Ok(ok("Reel updated successfully", reel))
}

async fn toggle_reel(State(s): State<AppState>, AuthAdmin(_): AuthAdmin, Path(id): Path<Uuid>) -> Result<Json<Value>> {
    let reel = ReelService::new(s.db.clone(), s.storage.clone()).toggle_status(id).await?;
    Ok(ok("Reel status updated", reel))
}

async fn delete_reel(State(s): State<AppState>, AuthAdmin(_): AuthAdmin, Path(id): Path<Uuid>) -> Result<Json<Value>> {
    ReelService::new(s.db.clone(), s.storage.clone()).delete(id).await?;
    Ok(ok("Reel deleted successfully", json!(null)))
}

#[derive(Debug, Deserialize)]
struct ReviewListQuery {
    page: Option<u32>,
    limit: Option<u32>,
    approved: Option<bool>,
}

async fn list_reviews(
    State(s): State<AppState>,
    AuthAdmin(_): AuthAdmin,
    Query(q): Query<ReviewListQuery>,
) -> Result<Json<Value>> {
    let page = PageQuery { page: q.page, limit: q.limit };
    let reviews = ReviewService::new(s.db.clone()).list(page, q.approved).await?;
    Ok(ok("Reviews fetched successfully", reviews))
}

#[derive(Debug, Deserialize)]
struct ModerateReviewBody {
    approved: bool,
}

async fn moderate_review(
    State(s): State<AppState>,
    AuthAdmin(_): AuthAdmin,
    Path(id): Path<Uuid>,
    Json(body): Json<ModerateReviewBody>,
) -> Result<Json<Value>> {
    let review = ReviewService::new(s.db.clone()).set_approval(id, body.approved).await?;
    Ok(ok("Review updated successfully", review))
}

async fn delete_review(State(s): State<AppState>, AuthAdmin(_): AuthAdmin, Path(id): Path<Uuid>) -> Result<Json<Value>> {
    ReviewService::new(s.db.clone()).delete(id).await?;
    Ok(ok("Review deleted successfully", json!(null)))
}

async fn list_banners(State(s): State<AppState>, AuthAdmin(_): AuthAdmin) -> Result<Json<Value>> {
    let banners = BannerService::new(s.db.clone(), s.storage.clone()).list_all().await?;
    Ok(ok("Banners fetched successfully", banners))
}

async fn create_banner(State(s): State<AppState>, AuthAdmin(_): AuthAdmin, multipart: Multipart) -> Result<Json<Value>> {
    let mut body = MultipartBody::read(multipart).await?;
    let image = body.take_file("image")?;
    let banner = BannerService::new(s.db.clone(), s.storage.clone()).create(image).await?;
    Ok(ok("Banner created successfully", banner))
}

async fn toggle_banner(State(s): State<AppState>, AuthAdmin(_): AuthAdmin, Path(id): Path<Uuid>) -> Result<Json<Value>> {
    let banner = BannerService::new(s.db.clone(), s.storage.clone()).toggle_status(id).await?;
    Ok(ok("Banner status updated", banner))
}

async fn delete_banner(State(s): State<AppState>, AuthAdmin(_): AuthAdmin, Path(id): Path<Uuid>) -> Result<Json<Value>> {
    BannerService::new(s.db.clone(), s.storage.clone()).delete(id).await?;
    Ok(ok("Banner deleted successfully", json!(null)))
}

async fn create_store(State(s): State<AppState>, AuthAdmin(_): AuthAdmin, multipart: Multipart) -> Result<Json<Value>> {
    let mut body = MultipartBody::read(multipart).await?;
    let input: StoreInput = body.json_field("store")?;
    let images = body.take_files("images");
    let store = StoreService::new(s.db.clone(), s.storage.clone()).create(input, images).await?;
    Ok(ok("Store created successfully", store))
}

async fn update_store(
    State(s): State<AppState>,
    AuthAdmin(_): AuthAdmin,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<Value>> {
    let mut body = MultipartBody::read(multipart).await?;
    let input: StoreInput = body.json_field("store")?;
    let images = body.take_files("images");
    let store = StoreService::new(s.db.clone(), s.storage.clone()).update(id, input, images).await?;
    Ok(ok("Store updated successfully", store))
}

async fn toggle_store(State(s): State<AppState>, AuthAdmin(_): AuthAdmin, Path(id): Path<Uuid>) -> Result<Json<Value>> {
    let store = StoreService::new(s.db.clone(), s.storage.clone()).toggle_status(id).await?;
    Ok(ok("Store status updated", store))
}

async fn delete_store(State(s): State<AppState>, AuthAdmin(_): AuthAdmin, Path(id): Path<Uuid>) -> Result<Json<Value>> {
    StoreService::new(s.db.clone(), s.storage.clone()).delete(id).await?;
    Ok(ok("Store deleted successfully", json!(null)))
}

async fn create_event(State(s): State<AppState>, AuthAdmin(_): AuthAdmin, multipart: Multipart) -> Result<Json<Value>> {
    let mut body = MultipartBody::read(multipart).await?;
    let input: EventInput = body.json_field("event")?;
    let images = body.take_files("images");
    let event = EventService::new(s.db.clone(), s.storage.clone()).create(input, images).await?;
    Ok(ok("Event created successfully", event))
}

async fn update_event(
    State(s): State<AppState>,
    AuthAdmin(_): AuthAdmin,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<Value>> {
    let mut body = MultipartBody::read(multipart).await?;
    let input: EventInput = body.json_field("event")?;
    let images = body.take_files("images");
    let event = EventService::new(s.db.clone(), s.storage.clone()).update(id, input, images).await?;
    Ok(ok("Event updated successfully", event))
}

#[derive(Debug, Deserialize)]
struct EventStatusBody {
    status: String,
}

async fn set_event_status(
    State(s): State<AppState>,
    AuthAdmin(_): AuthAdmin,
    Path(id): Path<Uuid>,
    Json(body): Json<EventStatusBody>,
) -> Result<Json<Value>> {
    let event = EventService::new(s.db.clone(), s.storage.clone()).set_status(id, &body.status).await?;
    Ok(ok("Event status updated", event))
}

async fn toggle_event(State(s): State<AppState>, AuthAdmin(_): AuthAdmin, Path(id): Path<Uuid>) -> Result<Json<Value>> {
    let event = EventService::new(s.db.clone(), s.storage.clone()).toggle_status(id).await?;
    Ok(ok("Event visibility updated", event))
}

async fn delete_event(State(s): State<AppState>, AuthAdmin(_): AuthAdmin, Path(id): Path<Uuid>) -> Result<Json<Value>> {
    EventService::new(s.db.clone(), s.storage.clone()).delete(id).await?;
    Ok(ok("Event deleted successfully", json!(null)))
}
