//! Customer-facing endpoints: auth, profile, addresses, cart, coupons,
//! loyalty, reels engagement, reviews, and orders.

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::ok;
use crate::auth::AuthUser;
use crate::error::Result;
use crate::pagination::PageQuery;
use crate::services::accounts::{AccountService, RegisterInput};
use crate::services::addresses::{AddressInput, AddressService};
use crate::services::carts::CartService;
use crate::services::coupons::CouponService;
use crate::services::loyalty::LoyaltyService;
use crate::services::orders::{CreateOrderInput, OrderService, VerifyPaymentInput};
use crate::services::reels::ReelService;
use crate::services::reviews::{ReviewInput, ReviewService};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/verify-otp", post(verify_otp))
        .route("/profile", get(profile))
        .route("/addresses", get(list_addresses).post(create_address))
        .route("/addresses/:id", put(update_address).delete(delete_address))
        .route("/cart", get(get_cart).post(add_to_cart).patch(update_cart))
        .route("/cart/count", get(cart_count))
        .route("/cart/item", delete(remove_cart_item))
        .route("/coupons/apply", post(apply_coupon))
        .route("/brownie-points", get(points_balance))
        .route("/brownie-points/history", get(points_history))
        .route("/reels/:id/like", post(like_reel))
        .route("/reels/:id/view", post(view_reel))
        .route("/reels/:id/watched", post(reel_watched))
        .route("/reviews", post(create_review))
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/verify-payment", post(verify_payment))
        .route("/orders/invoice-download", post(download_invoice))
        .route("/orders/:orderId", get(get_order))
}

#[derive(Debug, Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

async fn login(State(s): State<AppState>, Json(body): Json<LoginBody>) -> Result<Json<Value>> {
    let response = AccountService::new(s).login(&body.email, &body.password).await?;
    Ok(ok("Login successful", response))
}

async fn register(State(s): State<AppState>, Json(body): Json<RegisterInput>) -> Result<Json<Value>> {
    let resent = AccountService::new(s).send_registration_otp(body).await?;
    let message = if resent { "OTP resent successfully" } else { "OTP sent successfully" };
    Ok(ok(message, json!(null)))
}

#[derive(Debug, Deserialize)]
struct VerifyOtpBody {
    email: String,
    otp: String,
}

async fn verify_otp(State(s): State<AppState>, Json(body): Json<VerifyOtpBody>) -> Result<Json<Value>> {
    let response = AccountService::new(s).verify_registration_otp(&body.email, &body.otp).await?;
    Ok(ok("Registration successful", response))
}

async fn profile(AuthUser(user): AuthUser) -> Json<Value> {
    ok("Profile fetched successfully", user)
}

async fn list_addresses(State(s): State<AppState>, AuthUser(user): AuthUser) -> Result<Json<Value>> {
    let addresses = AddressService::new(s.db.clone()).list(user.id).await?;
    Ok(ok("Addresses fetched successfully", addresses))
}

async fn create_address(
    State(s): State<AppState>,
    AuthUser(user): AuthUser,
    Json(body): Json<AddressInput>,
) -> Result<Json<Value>> {
    let address = AddressService::new(s.db.clone()).create(user.id, body).await?;
    Ok(ok("Address created successfully", address))
}

async fn update_address(
    State(s): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<AddressInput>,
) -> Result<Json<Value>> {
    let address = AddressService::new(s.db.clone()).update(user.id, id, body).await?;
    Ok(ok("Address updated successfully", address))
}

async fn delete_address(
    State(s): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>> {
    AddressService::new(s.db.clone()).delete(user.id, id).await?;
    Ok(ok("Address deleted successfully", json!(null)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddToCartBody {
    product_id: Uuid,
    variant_id: Uuid,
    #[serde(default = "default_quantity")]
    quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

async fn add_to_cart(
    State(s): State<AppState>,
    AuthUser(user): AuthUser,
    Json(body): Json<AddToCartBody>,
) -> Result<Json<Value>> {
    let cart = CartService::new(s.db.clone()).add_item(user.id, body.product_id, body.variant_id, body.quantity).await?;
    Ok(ok("Product added to cart successfully", cart))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateCartBody {
    product_id: Uuid,
    variant_id: Uuid,
    status: String,
}

async fn update_cart(
    State(s): State<AppState>,
    AuthUser(user): AuthUser,
    Json(body): Json<UpdateCartBody>,
) -> Result<Json<Value>> {
    let cart =
        CartService::new(s.db.clone()).update_quantity(user.id, body.product_id, body.variant_id, &body.status).await?;
    Ok(ok("Cart updated successfully", cart))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoveCartItemBody {
    product_id: Uuid,
    variant_id: Uuid,
}

async fn remove_cart_item(
    State(s): State<AppState>,
    AuthUser(user): AuthUser,
    Json(body): Json<RemoveCartItemBody>,
) -> Result<Json<Value>> {
    let cart = CartService::new(s.db.clone()).remove_item(user.id, body.product_id, body.variant_id).await?;
    Ok(ok("Item removed from cart successfully", cart))
}

async fn get_cart(State(s): State<AppState>, AuthUser(user): AuthUser) -> Result<Json<Value>> {
    let cart = CartService::new(s.db.clone()).detailed(user.id).await?;
    let message = if cart.items.is_empty() { "Cart is empty" } else { "Cart fetched successfully" };
    Ok(ok(message, cart))
}

async fn cart_count(State(s): State<AppState>, AuthUser(user): AuthUser) -> Result<Json<Value>> {
    let count = CartService::new(s.db.clone()).count(user.id).await?;
    Ok(ok("Cart count fetched successfully", json!({ "count": count })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApplyCouponBody {
    code: String,
    cart_amount: Option<f64>,
}

async fn apply_coupon(
    State(s): State<AppState>,
    AuthUser(user): AuthUser,
    Json(body): Json<ApplyCouponBody>,
) -> Result<Json<Value>> {
    let preview = CouponService::new(s.db.clone()).apply(user.id, &body.code, body.cart_amount).await?;
    Ok(ok("Coupon applied successfully", preview))
}

async fn points_balance(State(s): State<AppState>, AuthUser(user): AuthUser) -> Result<Json<Value>> {
    let balance = LoyaltyService::new(s.db.clone()).balance(user.id).await?;
    Ok(ok("Brownie points fetched successfully", balance))
}

async fn points_history(
    State(s): State<AppState>,
    AuthUser(user): AuthUser,
    Query(page): Query<PageQuery>,
) -> Result<Json<Value>> {
    let history = LoyaltyService::new(s.db.clone()).history(user.id, page).await?;
    Ok(ok("Brownie point history fetched successfully", history))
}

async fn like_reel(State(s): State<AppState>, AuthUser(user): AuthUser, Path(id): Path<Uuid>) -> Result<Json<Value>> {
    let (reel, liked) = ReelService::new(s.db.clone(), s.storage.clone()).toggle_like(id, user.id).await?;
    let message = if liked { "Reel liked successfully" } else { "Reel unliked successfully" };
    Ok(ok(message, json!({ "reel": reel, "isLiked": liked, "totalLikes": reel.likes.len() })))
}

async fn view_reel(State(s): State<AppState>, AuthUser(user): AuthUser, Path(id): Path<Uuid>) -> Result<Json<Value>> {
    let reel = ReelService::new(s.db.clone(), s.storage.clone()).add_view(id, user.id).await?;
    Ok(ok("View tracked successfully", json!({ "reel": reel, "totalViews": reel.views.len() })))
}

async fn reel_watched(
    State(s): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>> {
    let (reel, earned) = ReelService::new(s.db.clone(), s.storage.clone()).mark_fully_watched(id, user.id).await?;
    Ok(ok(
        "Reel marked as fully watched",
        json!({ "reel": reel, "totalFullyWatched": reel.fully_watched.len(), "browniePointEarned": earned }),
    ))
}

async fn create_review(
    State(s): State<AppState>,
    AuthUser(user): AuthUser,
    Json(body): Json<ReviewInput>,
) -> Result<Json<Value>> {
    let review = ReviewService::new(s.db.clone()).create(user.id, body).await?;
    Ok(ok("Review submitted successfully", review))
}

async fn create_order(
    State(s): State<AppState>,
    AuthUser(user): AuthUser,
    Json(body): Json<CreateOrderInput>,
) -> Result<Json<Value>> {
    let created = OrderService::new(s).create_order(user.id, body).await?;
    Ok(ok("Order created successfully", created))
}

async fn verify_payment(
    State(s): State<AppState>,
    AuthUser(_user): AuthUser,
    Json(body): Json<VerifyPaymentInput>,
) -> Result<Json<Value>> {
    let order = OrderService::new(s).verify_payment(body).await?;
    Ok(ok("Payment verified and order confirmed successfully", order))
}

async fn list_orders(
    State(s): State<AppState>,
    AuthUser(user): AuthUser,
    Query(page): Query<PageQuery>,
) -> Result<Json<Value>> {
    let orders = OrderService::new(s).user_orders(user.id, page).await?;
    Ok(ok("Orders fetched successfully", orders))
}

async fn get_order(
    State(s): State<AppState>,
    AuthUser(user): AuthUser,
    Path(order_id): Path<String>,
) -> Result<Json<Value>> {
    let order = OrderService::new(s).user_order(user.id, &order_id).await?;
    Ok(ok("Order fetched successfully", order))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InvoiceBody {
    order_id: String,
}

async fn download_invoice(
    State(s): State<AppState>,
    AuthUser(user): AuthUser,
    Json(body): Json<InvoiceBody>,
) -> Result<impl IntoResponse> {
    let (pdf, filename) = OrderService::new(s).invoice_pdf(user.id, &body.order_id).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
        ],
        pdf,
    ))
}
