//! Invoice markup, handed to the external PDF renderer.

use crate::models::order::Order;
use crate::models::user::User;

pub fn invoice_html(order: &Order, user: &User) -> String {
    let address = &order.address.0;
    let rows: String = order
        .items
        .0
        .iter()
        .map(|i| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{:.2}</td><td>{:.2}</td></tr>",
                escape(&i.name),
                escape(&i.variant.weight),
                i.quantity,
                i.variant.price,
                i.price
            )
        })
        .collect();
    let coupon_row = order
        .coupon
        .as_ref()
        .map(|c| format!("<tr><td colspan=\"4\">Coupon ({})</td><td>-{:.2}</td></tr>", escape(&c.0.code), c.0.discount_amount))
        .unwrap_or_default();
    let points_row = if order.brownie_discount > 0.0 {
        format!("<tr><td colspan=\"4\">Brownie points</td><td>-{:.2}</td></tr>", order.brownie_discount)
    } else {
        String::new()
    };
    let tax_rows = if order.igst > 0.0 {
        format!("<tr><td colspan=\"4\">IGST</td><td>{:.2}</td></tr>", order.igst)
    } else {
        format!(
            "<tr><td colspan=\"4\">CGST</td><td>{:.2}</td></tr><tr><td colspan=\"4\">SGST</td><td>{:.2}</td></tr>",
            order.cgst, order.sgst
        )
    };

    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><style>\
         body{{font-family:sans-serif;margin:24px}}table{{width:100%;border-collapse:collapse}}\
         td,th{{border:1px solid #ccc;padding:6px;text-align:left}}h1{{font-size:20px}}\
         .total{{font-weight:bold}}</style></head><body>\
         <h1>Tax Invoice</h1>\
         <p>Invoice for order <strong>{order_id}</strong><br>Date: {date}</p>\
         <p>Billed to: {customer}<br>{email}<br>{address_line}</p>\
         <table><tr><th>Item</th><th>Weight</th><th>Qty</th><th>Unit Price</th><th>Total</th></tr>\
         {rows}{coupon_row}{points_row}\
         <tr><td colspan=\"4\">Taxable amount</td><td>{amount:.2}</td></tr>\
         {tax_rows}\
         <tr><td colspan=\"4\">Delivery</td><td>{delivery:.2}</td></tr>\
         <tr class=\"total\"><td colspan=\"4\">Grand total</td><td>{total:.2}</td></tr>\
         </table></body></html>",
        order_id = escape(&order.order_id),
        date = order.created_at.format("%d %b %Y"),
        customer = escape(&address.name),
        email = escape(&user.email),
        address_line = escape(&address.full_line()),
        rows = rows,
        coupon_row = coupon_row,
        points_row = points_row,
        amount = order.amount,
        tax_rows = tax_rows,
        delivery = order.delivery_charge,
        total = order.total_amount,
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::address::Address;
    use crate::models::order::OrderItem;
    use crate::models::product::Variant;
    use chrono::Utc;
    use sqlx::types::Json;
    use uuid::Uuid;

    #[test]
    fn renders_totals_and_escapes_markup() {
        let now = Utc::now();
        let address = Address {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "A <B>".into(),
            phone: "9876543210".into(),
            house: "12".into(),
            area: "Fort".into(),
            landmark: String::new(),
            city: "Kochi".into(),
            state: "Kerala".into(),
            pincode: "682001".into(),
            latitude: None,
            longitude: None,
            address_type: "home".into(),
            is_default: true,
            created_at: now,
            updated_at: now,
        };
        let order = Order {
            id: Uuid::new_v4(),
            order_id: "CC-20260101000000-AAAA".into(),
            user_id: address.user_id,
            items: Json(vec![OrderItem {
                product_id: Uuid::new_v4(),
                name: "Kulfi".into(),
                slug: "kulfi-delivery".into(),
                images: vec![],
                variant: Variant { id: Uuid::new_v4(), price: 100.0, weight: "500g".into() },
                quantity: 2,
                price: 200.0,
            }]),
            address: Json(address),
            coupon: None,
            r#box: None,
            amount: 200.0,
            gst_tax: 36.0,
            cgst: 18.0,
            sgst: 18.0,
            igst: 0.0,
            delivery_charge: 40.0,
            total_amount: 276.0,
            payment_method: "razorpay".into(),
            payment_status: "completed".into(),
            status: "confirmed".into(),
            razorpay_order_id: String::new(),
            razorpay_payment_id: String::new(),
            razorpay_signature: String::new(),
            payment_history: Json(vec![]),
            brownie_points_used: 0.0,
            brownie_discount: 0.0,
            delivery: None,
            created_at: now,
            updated_at: now,
        };
        let user = User {
            id: order.user_id,
            name: Some("A".into()),
            email: "a@example.com".into(),
            phone: None,
            password_hash: String::new(),
            role: "user".into(),
            is_verified: true,
            is_active: true,
            brownie_points: 0.0,
            created_at: now,
            updated_at: now,
        };
        let html = invoice_html(&order, &user);
        assert!(html.contains("CC-20260101000000-AAAA"));
        assert!(html.contains("276.00"));
        assert!(html.contains("A &lt;B&gt;"));
        assert!(html.contains("CGST"));
        assert!(!html.contains("IGST"));
    }
}
