//! Coldcart — direct-to-consumer frozen dessert e-commerce backend.
//!
//! ## Features
//! - Product catalog with per-weight variants and delivery/pickup listings
//! - Cart, coupons, and a brownie-point loyalty ledger
//! - Checkout with GST, box selection, courier quotes and Razorpay payments
//! - OTP-based registration, reviews, reels and store/event content
//! - Admin management endpoints with Excel export and PDF invoices

pub mod adapters;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod http;
pub mod invoice;
pub mod models;
pub mod pagination;
pub mod services;
pub mod state;

pub use error::{AppError, Result};
