//! Domain services: one per resource, holding the pool and adapter handles
//! they collaborate with (no global instances).

pub mod accounts;
pub mod addresses;
pub mod banners;
pub mod boxes;
pub mod carts;
pub mod coupons;
pub mod events;
pub mod loyalty;
pub mod orders;
pub mod products;
pub mod reels;
pub mod reviews;
pub mod stores;
