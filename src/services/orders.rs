//! Order workflows: checkout, payment verification, queries, invoice and
//! Excel export.

use chrono::{NaiveDate, Utc};
use rust_xlsxwriter::Workbook;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

use crate::adapters::razorpay::GatewayOrder;
use crate::adapters::shiprocket::{ShipmentItem, ShipmentRequest};
use crate::adapters::CourierQuote;
use crate::config::CourierProvider;
use crate::domain::{order_id, pricing};
use crate::error::{AppError, Result};
use crate::invoice;
use crate::models::address::Address;
use crate::models::cart::Cart;
use crate::models::coupon::{Coupon, CouponSnapshot};
use crate::models::loyalty::ENTRY_SPENT;
use crate::models::order::{Delivery, Order, OrderItem, PaymentHistoryEntry};
use crate::models::product::Product;
use crate::models::shipping_box::ShippingBox;
use crate::models::user::User;
use crate::pagination::{PageQuery, Paginated};
use crate::state::AppState;

pub const METHOD_FREE: &str = "free";
pub const METHOD_RAZORPAY: &str = "razorpay";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderInput {
    pub cart_id: Uuid,
    pub address_id: Uuid,
    pub payment_method: String,
    pub coupon_code: Option<String>,
    pub box_id: Option<Uuid>,
    #[serde(default)]
    pub brownie_points_to_use: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentInput {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
    pub order_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedOrder {
    pub order: Order,
    pub razorpay_order: Option<GatewayOrder>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOrderFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub payment_method: Option<String>,
    pub search: Option<String>,
}

pub struct OrderService {
    state: AppState,
}

impl OrderService {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    fn db(&self) -> &PgPool {
        &self.state.db
    }

    /// Checkout. Validates the cart against live catalog state, applies
    /// coupon and loyalty discounts, selects a box, quotes delivery, creates
    /// the gateway order when needed and persists everything in one
    /// transaction. Free orders redeem coupon/points and drop the cart
    /// immediately; gateway orders defer that to payment verification.
    pub async fn create_order(&self, user_id: Uuid, input: CreateOrderInput) -> Result<CreatedOrder> {
        if input.payment_method != METHOD_FREE && input.payment_method != METHOD_RAZORPAY {
            return Err(AppError::Validation(format!("Unknown payment method '{}'", input.payment_method)));
        }

        let mut tx = self.db().begin().await?;

        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        let address = sqlx::query_as::<_, Address>("SELECT * FROM addresses WHERE id = $1 AND user_id = $2")
            .bind(input.address_id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Address not found".into()))?;

        // Balance is always the ledger aggregate, never the counter.
        let available: f64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(CASE WHEN entry_type = 'earned' THEN points ELSE -points END), 0) \
             FROM brownie_points WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;
        let points_to_use = input.brownie_points_to_use;
        if !points_to_use.is_finite() || points_to_use < 0.0 {
            return Err(AppError::Validation("Invalid brownie points value".into()));
        }
        if points_to_use > available {
            return Err(AppError::Validation(format!(
                "Insufficient brownie points. Requested {points_to_use}, available {available}"
            )));
        }

        let cart = sqlx::query_as::<_, Cart>("SELECT * FROM carts WHERE id = $1 AND user_id = $2")
            .bind(input.cart_id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::Validation("Cart not found".into()))?;
        if cart.items.0.is_empty() {
            return Err(AppError::Validation("Cart is empty".into()));
        }

        // Re-fetch every product and variant; the cart may be stale.
        let mut items: Vec<OrderItem> = Vec::with_capacity(cart.items.0.len());
        let mut subtotal = 0.0;
        for line in &cart.items.0 {
            let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
                .bind(line.product_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Product not found: {}", line.product_id)))?;
            if !product.is_orderable() {
                return Err(AppError::Validation(format!("Product not available: {}", product.name)));
            }
            let variant = product
                .variant(line.variant_id)
                .ok_or_else(|| AppError::NotFound(format!("Variant not found for product: {}", product.name)))?
                .clone();
            let line_total = variant.price * line.quantity as f64;
            subtotal += line_total;
            items.push(OrderItem {
                product_id: product.id,
                name: product.name.clone(),
                slug: product.slug.clone(),
                images: product.images.0.clone(),
                variant,
                quantity: line.quantity,
                price: line_total,
            });
        }

        let mut coupon: Option<Coupon> = None;
        let mut coupon_discount = 0.0;
        if let Some(code) = input.coupon_code.as_deref().filter(|c| !c.is_empty()) {
            let found = sqlx::query_as::<_, Coupon>(
                "SELECT * FROM coupons WHERE LOWER(code) = LOWER($1) \
                 AND is_active AND NOT is_deleted AND starts_at <= NOW() AND expires_at > NOW()",
            )
            .bind(code)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::Validation("Invalid or expired coupon".into()))?;
            if found.used_by_user(user_id) {
                return Err(AppError::Validation("Coupon already used by this user".into()));
            }
            if subtotal < found.min_purchase_amount {
                return Err(AppError::Validation(format!(
                    "Minimum purchase of {} required",
                    found.min_purchase_amount
                )));
            }
            coupon_discount = found.discount_for(subtotal);
            coupon = Some(found);
        }

        let item_count: i32 = items.iter().map(|i| i.quantity as i32).sum();
        let shipping_box = match input.box_id {
            Some(box_id) => {
                let b = sqlx::query_as::<_, ShippingBox>("SELECT * FROM boxes WHERE id = $1")
                    .bind(box_id)
                    .fetch_optional(&mut *tx)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Box not found".into()))?;
                if !b.fits(item_count) {
                    return Err(AppError::Validation(format!(
                        "Selected box can hold {}-{} items",
                        b.item_count_min, b.item_count_max
                    )));
                }
                b
            }
            None => sqlx::query_as::<_, ShippingBox>(
                "SELECT * FROM boxes WHERE item_count_min <= $1 AND item_count_max >= $1",
            )
            .bind(item_count)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::Validation(format!("No box fits an order of {item_count} items")))?,
        };

        let weight_kg = parcel_weight_kg(&items, &shipping_box);
        let quote = self.delivery_quote(&address, weight_kg).await?;

        let same_state = pricing::is_same_state(&address.state, &self.state.config.seller_gst_state);
        let totals = pricing::compute_totals(subtotal, coupon_discount, points_to_use, same_state, quote.rate)?;

        let human_id = order_id::generate();
        let now = Utc::now();
        let mut razorpay_order = None;
        let mut history: Vec<PaymentHistoryEntry> = Vec::new();
        let (payment_status, status) = if input.payment_method == METHOD_RAZORPAY {
            let gateway = self
                .state
                .razorpay
                .create_order(pricing::to_minor_units(totals.total_amount), &human_id)
                .await?;
            history.push(PaymentHistoryEntry {
                razorpay_order_id: Some(gateway.id.clone()),
                razorpay_payment_id: None,
                razorpay_signature: None,
                payment_status: "pending".into(),
                payment_date: now,
                comment: "Initial order created".into(),
            });
            razorpay_order = Some(gateway);
            ("pending", "pending")
        } else {
            history.push(PaymentHistoryEntry {
                razorpay_order_id: None,
                razorpay_payment_id: None,
                razorpay_signature: None,
                payment_status: "completed".into(),
                payment_date: now,
                comment: "Free order".into(),
            });
            ("completed", "confirmed")
        };

        let coupon_snapshot = coupon.as_ref().map(|c| CouponSnapshot {
            id: c.id,
            code: c.code.clone(),
            discount_type: c.discount_type.clone(),
            discount_value: c.discount_value,
            discount_amount: coupon_discount,
            min_purchase_amount: c.min_purchase_amount,
        });

        let order = sqlx::query_as::<_, Order>(
            "INSERT INTO orders (id, order_id, user_id, items, address, coupon, box, amount, gst_tax, cgst, sgst, \
             igst, delivery_charge, total_amount, payment_method, payment_status, status, razorpay_order_id, \
             payment_history, brownie_points_used, brownie_discount) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21) \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&human_id)
        .bind(user_id)
        .bind(Json(&items))
        .bind(Json(&address))
        .bind(coupon_snapshot.as_ref().map(Json))
        .bind(Json(&shipping_box))
        .bind(totals.amount)
        .bind(totals.gst_tax)
        .bind(totals.cgst)
        .bind(totals.sgst)
        .bind(totals.igst)
        .bind(totals.delivery_charge)
        .bind(totals.total_amount)
        .bind(&input.payment_method)
        .bind(payment_status)
        .bind(status)
        .bind(razorpay_order.as_ref().map(|o| o.id.as_str()).unwrap_or(""))
        .bind(Json(&history))
        .bind(points_to_use)
        .bind(points_to_use)
        .fetch_one(&mut *tx)
        .await?;

        // Free orders settle immediately: redeem, spend, drop the cart.
        if input.payment_method == METHOD_FREE {
            if let Some(c) = &coupon {
                redeem_coupon(&mut tx, c.id, user_id).await?;
            }
            if points_to_use > 0.0 {
                spend_points(&mut tx, user_id, points_to_use, order.id, "Points spent for free order").await?;
            }
            sqlx::query("DELETE FROM carts WHERE id = $1").bind(cart.id).execute(&mut *tx).await?;
        }

        tx.commit().await?;
        tracing::info!(order_id = %human_id, user = %user.email, total = totals.total_amount, "order created");

        Ok(CreatedOrder { order, razorpay_order })
    }

    /// Payment verification. Signature mismatch cancels the order (and that
    /// outcome is committed before the 400 surfaces); a match confirms it
    /// and settles coupon, points and cart in the same transaction. The
    /// courier booking afterwards is best-effort.
    pub async fn verify_payment(&self, input: VerifyPaymentInput) -> Result<Order> {
        let mut tx = self.db().begin().await?;

        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE order_id = $1")
            .bind(&input.order_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".into()))?;
        if order.payment_status == "completed" {
            return Err(AppError::Validation("Order is already verified".into()));
        }

        let authentic = self.state.razorpay.validate_signature(
            &input.razorpay_order_id,
            &input.razorpay_payment_id,
            &input.razorpay_signature,
        );

        let mut history = order.payment_history.0.clone();
        let (entry_status, comment) = if authentic {
            ("completed", "Payment successfully verified")
        } else {
            ("failed", "Payment verification failed - invalid signature")
        };
        let now = Utc::now();
        match history.iter_mut().find(|e| e.razorpay_order_id.as_deref() == Some(input.razorpay_order_id.as_str())) {
            Some(entry) => {
                entry.razorpay_payment_id = Some(input.razorpay_payment_id.clone());
                entry.razorpay_signature = Some(input.razorpay_signature.clone());
                entry.payment_status = entry_status.into();
                entry.payment_date = now;
                entry.comment = comment.into();
            }
            None => history.push(PaymentHistoryEntry {
                razorpay_order_id: Some(input.razorpay_order_id.clone()),
                razorpay_payment_id: Some(input.razorpay_payment_id.clone()),
                razorpay_signature: Some(input.razorpay_signature.clone()),
                payment_status: entry_status.into(),
                payment_date: now,
                comment: comment.into(),
            }),
        }

        if !authentic {
            sqlx::query(
                "UPDATE orders SET payment_history = $1, payment_status = 'failed', status = 'cancelled', \
                 razorpay_payment_id = $2, razorpay_signature = $3, updated_at = NOW() WHERE id = $4",
            )
            .bind(Json(&history))
            .bind(&input.razorpay_payment_id)
            .bind(&input.razorpay_signature)
            .bind(order.id)
            .execute(&mut *tx)
            .await?;
            tx.commit().await?;
            return Err(AppError::Validation("Payment verification failed".into()));
        }

        let verified = sqlx::query_as::<_, Order>(
            "UPDATE orders SET payment_history = $1, payment_status = 'completed', status = 'confirmed', \
             razorpay_payment_id = $2, razorpay_signature = $3, updated_at = NOW() WHERE id = $4 RETURNING *",
        )
        .bind(Json(&history))
        .bind(&input.razorpay_payment_id)
        .bind(&input.razorpay_signature)
        .bind(order.id)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(snapshot) = &order.coupon {
            redeem_coupon(&mut tx, snapshot.0.id, order.user_id).await?;
        }
        if order.brownie_points_used > 0.0 {
            spend_points(&mut tx, order.user_id, order.brownie_points_used, order.id, "Points spent for prepaid order")
                .await?;
        }
        sqlx::query("DELETE FROM carts WHERE user_id = $1").bind(order.user_id).execute(&mut *tx).await?;

        tx.commit().await?;
        tracing::info!(order_id = %verified.order_id, "payment verified");

        // Best-effort: the payment is final, a courier-side failure must not
        // unwind it. Failures are logged into the payment history instead.
        match self.book_shipment(&verified).await {
            Ok(delivery) => {
                sqlx::query("UPDATE orders SET delivery = $1, updated_at = NOW() WHERE id = $2")
                    .bind(Json(&delivery))
                    .bind(verified.id)
                    .execute(self.db())
                    .await?;
            }
            Err(e) => {
                tracing::warn!(order_id = %verified.order_id, error = %e, "shipment booking failed");
                let mut history = verified.payment_history.0.clone();
                if let Some(entry) = history.last_mut() {
                    entry.comment = format!("{} (shipment booking failed: {e})", entry.comment);
                }
                sqlx::query("UPDATE orders SET payment_history = $1, updated_at = NOW() WHERE id = $2")
                    .bind(Json(&history))
                    .bind(verified.id)
                    .execute(self.db())
                    .await?;
            }
        }

        let final_order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(verified.id)
            .fetch_one(self.db())
            .await?;
        Ok(final_order)
    }

    async fn delivery_quote(&self, address: &Address, weight_kg: f64) -> Result<CourierQuote> {
        let lat = address.latitude.unwrap_or(0.0);
        let long = address.longitude.unwrap_or(0.0);
        match self.state.config.courier_provider {
            CourierProvider::Shiprocket => {
                self.state.shiprocket.serviceability(&address.pincode, lat, long, weight_kg).await
            }
            CourierProvider::Borzo => {
                let request = borzo_request(&self.state, address, weight_kg);
                self.state.borzo.calculate_order(&request).await
            }
        }
    }

    async fn book_shipment(&self, order: &Order) -> Result<Delivery> {
        let address = &order.address.0;
        let email: Option<String> = sqlx::query_scalar("SELECT email FROM users WHERE id = $1")
            .bind(order.user_id)
            .fetch_optional(self.db())
            .await?;
        let request = ShipmentRequest {
            order_id: order.order_id.clone(),
            order_date: order.created_at.format("%Y-%m-%d %H:%M").to_string(),
            pickup_location: self.state.config.shiprocket_pickup_location.clone(),
            billing_customer_name: address.name.clone(),
            billing_address: address.full_line(),
            billing_city: address.city.clone(),
            billing_pincode: address.pincode.clone(),
            billing_state: address.state.clone(),
            billing_country: "India".into(),
            billing_email: email.unwrap_or_default(),
            billing_phone: address.phone.clone(),
            shipping_is_billing: true,
            latitude: address.latitude.unwrap_or(0.0),
            longitude: address.longitude.unwrap_or(0.0),
            order_items: order
                .items
                .0
                .iter()
                .map(|i| ShipmentItem {
                    name: i.name.clone(),
                    sku: i.slug.clone(),
                    units: i.quantity,
                    selling_price: i.variant.price,
                })
                .collect(),
            sub_total: order.amount,
            length: order.r#box.as_ref().map(|b| b.0.length_cm).unwrap_or(10.0),
            breadth: order.r#box.as_ref().map(|b| b.0.breadth_cm).unwrap_or(10.0),
            height: order.r#box.as_ref().map(|b| b.0.height_cm).unwrap_or(10.0),
            weight: order.parcel_weight_kg(),
        };
        let created = self.state.shiprocket.create_order(&request).await?;
        let awb = self.state.shiprocket.assign_awb(created.shipment_id).await?;
        Ok(Delivery {
            courier_name: Some(awb.courier_name),
            awb_code: Some(awb.awb_code),
            shipment_id: Some(created.shipment_id.to_string()),
            shiprocket_order_id: Some(created.order_id.to_string()),
            status: Some("AWB Assigned".into()),
            charge: order.delivery_charge,
        })
    }

    pub async fn user_orders(&self, user_id: Uuid, page: PageQuery) -> Result<Paginated<Order>> {
        let (current, limit, offset) = page.resolve();
        let orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.db())
        .await?;
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(self.db())
            .await?;
        Ok(Paginated::new(orders, current, limit, total))
    }

    pub async fn user_order(&self, user_id: Uuid, order_id: &str) -> Result<Order> {
        sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE order_id = $1 AND user_id = $2")
            .bind(order_id)
            .bind(user_id)
            .fetch_optional(self.db())
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".into()))
    }

    /// Invoice PDF, only for paid and confirmed orders.
    pub async fn invoice_pdf(&self, user_id: Uuid, order_id: &str) -> Result<(Vec<u8>, String)> {
        let order = self.user_order(user_id, order_id).await?;
        if order.payment_status != "completed" {
            return Err(AppError::Validation("Invoice can only be downloaded for completed orders".into()));
        }
        if order.status != "confirmed" {
            return Err(AppError::Validation("Invoice can only be downloaded for confirmed orders".into()));
        }
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_one(self.db())
            .await?;
        let html = invoice::invoice_html(&order, &user);
        let pdf = self.state.renderer.html_to_pdf(&html).await?;
        Ok((pdf, format!("Coldcart-Invoice-{}.pdf", order.order_id)))
    }

    pub async fn admin_orders(&self, filter: &AdminOrderFilter, page: PageQuery) -> Result<Paginated<Order>> {
        let (current, limit, offset) = page.resolve();
        let mut query = QueryBuilder::new("SELECT * FROM orders");
        push_filters(&mut query, filter);
        query.push(" ORDER BY created_at DESC LIMIT ").push_bind(limit).push(" OFFSET ").push_bind(offset);
        let orders = query.build_query_as::<Order>().fetch_all(self.db()).await?;

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM orders");
        push_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(self.db()).await?;
        Ok(Paginated::new(orders, current, limit, total))
    }

    pub async fn admin_order(&self, id: Uuid) -> Result<Order> {
        sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(self.db())
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".into()))
    }

    /// One worksheet, one row per line item, same filters as the list.
    pub async fn export_excel(&self, filter: &AdminOrderFilter) -> Result<Vec<u8>> {
        let mut query = QueryBuilder::new("SELECT * FROM orders");
        push_filters(&mut query, filter);
        query.push(" ORDER BY created_at DESC");
        let orders = query.build_query_as::<Order>().fetch_all(self.db()).await?;

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("Orders").map_err(|e| AppError::Internal(format!("worksheet naming failed: {e}")))?;
        let headers = [
            "Order ID",
            "Customer Name",
            "Phone",
            "Address",
            "Product",
            "Variant Weight",
            "Quantity",
            "Unit Price",
            "Item Total",
            "Amount",
            "GST",
            "CGST",
            "SGST",
            "IGST",
            "Delivery",
            "Total",
            "Status",
            "Payment Status",
            "Payment Method",
            "Coupon",
            "Coupon Discount",
            "Points Used",
            "Order Date",
        ];
        for (col, header) in headers.iter().enumerate() {
            sheet
                .write(0, col as u16, *header)
                .map_err(|e| AppError::Internal(format!("excel write failed: {e}")))?;
        }
        let mut row: u32 = 1;
        for order in &orders {
            for item in &order.items.0 {
                let address = &order.address.0;
                let cells: Vec<String> = vec![
                    order.order_id.clone(),
                    address.name.clone(),
                    address.phone.clone(),
                    address.full_line(),
                    item.name.clone(),
                    item.variant.weight.clone(),
                    item.quantity.to_string(),
                    format!("{:.2}", item.variant.price),
                    format!("{:.2}", item.price),
                    format!("{:.2}", order.amount),
                    format!("{:.2}", order.gst_tax),
                    format!("{:.2}", order.cgst),
                    format!("{:.2}", order.sgst),
                    format!("{:.2}", order.igst),
                    format!("{:.2}", order.delivery_charge),
                    format!("{:.2}", order.total_amount),
                    order.status.clone(),
                    order.payment_status.clone(),
                    order.payment_method.clone(),
                    order.coupon.as_ref().map(|c| c.0.code.clone()).unwrap_or_default(),
                    order.coupon.as_ref().map(|c| format!("{:.2}", c.0.discount_amount)).unwrap_or_default(),
                    format!("{}", order.brownie_points_used),
                    order.created_at.format("%Y-%m-%d %H:%M").to_string(),
                ];
                for (col, cell) in cells.iter().enumerate() {
                    sheet
                        .write(row, col as u16, cell.as_str())
                        .map_err(|e| AppError::Internal(format!("excel write failed: {e}")))?;
                }
                row += 1;
            }
        }
        workbook.save_to_buffer().map_err(|e| AppError::Internal(format!("excel save failed: {e}")))
    }
}

fn parcel_weight_kg(items: &[OrderItem], shipping_box: &ShippingBox) -> f64 {
    let grams: f64 = items
        .iter()
        .map(|i| crate::models::order::parse_weight_grams(&i.variant.weight) * i.quantity as f64)
        .sum();
    grams / 1000.0 + shipping_box.box_weight_kg
}

fn borzo_request(state: &AppState, address: &Address, weight_kg: f64) -> crate::adapters::borzo::BorzoOrderRequest {
    use crate::adapters::borzo::{BorzoContact, BorzoOrderRequest, BorzoPoint};
    BorzoOrderRequest {
        matter: "Frozen desserts".into(),
        total_weight_kg: weight_kg,
        points: vec![
            BorzoPoint {
                address: state.config.shiprocket_pickup_location.clone(),
                latitude: state.config.shiprocket_pickup_lat,
                longitude: state.config.shiprocket_pickup_long,
                contact_person: BorzoContact {
                    name: state.config.mail_sender_name.clone(),
                    phone: String::new(),
                },
            },
            BorzoPoint {
                address: address.full_line(),
                latitude: address.latitude.unwrap_or(0.0),
                longitude: address.longitude.unwrap_or(0.0),
                contact_person: BorzoContact { name: address.name.clone(), phone: address.phone.clone() },
            },
        ],
    }
}

async fn redeem_coupon(tx: &mut Transaction<'_, Postgres>, coupon_id: Uuid, user_id: Uuid) -> Result<()> {
    sqlx::query("UPDATE coupons SET used_by = array_append(used_by, $1), updated_at = NOW() WHERE id = $2")
        .bind(user_id)
        .bind(coupon_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

async fn spend_points(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    points: f64,
    order_ref: Uuid,
    comment: &str,
) -> Result<()> {
    sqlx::query("UPDATE users SET brownie_points = brownie_points - $1, updated_at = NOW() WHERE id = $2")
        .bind(points)
        .bind(user_id)
        .execute(&mut **tx)
        .await?;
    sqlx::query(
        "INSERT INTO brownie_points (id, user_id, entry_type, points, order_ref, comment) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(ENTRY_SPENT)
    .bind(points)
    .bind(order_ref)
    .bind(comment)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filter: &AdminOrderFilter) {
    let mut prefix = " WHERE ";
    let mut push_clause = |query: &mut QueryBuilder<'_, Postgres>| {
        query.push(prefix);
        prefix = " AND ";
    };
    if let Some(start) = filter.start_date.and_then(|d| d.and_hms_opt(0, 0, 0)) {
        push_clause(query);
        query.push("created_at >= ").push_bind(start.and_utc());
    }
    // End of the chosen day, inclusive.
    if let Some(end) = filter.end_date.and_then(|d| d.and_hms_opt(23, 59, 59)) {
        push_clause(query);
        query.push("created_at <= ").push_bind(end.and_utc());
    }
    if let Some(status) = filter.status.as_deref().filter(|s| !s.is_empty() && *s != "all") {
        push_clause(query);
        query.push("status = ").push_bind(status.to_string());
    }
    if let Some(ps) = filter.payment_status.as_deref().filter(|s| !s.is_empty() && *s != "all") {
        push_clause(query);
        query.push("payment_status = ").push_bind(ps.to_string());
    }
    if let Some(pm) = filter.payment_method.as_deref().filter(|s| !s.is_empty() && *s != "all") {
        push_clause(query);
        query.push("payment_method = ").push_bind(pm.to_string());
    }
    if let Some(term) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        push_clause(query);
        let pattern = format!("%{}%", term.trim());
        query
            .push("(order_id ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR address ->> 'name' ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR address ->> 'phone' ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}
