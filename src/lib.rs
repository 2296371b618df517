//! Atelier
//!
//! Atelier is the cart pricing and checkout engine of a made-to-order clothing storefront:
//! tiered volume discounts, a two-collection cart, checkout summaries with their order
//! message and document, and a persisted order log.

pub mod cart;
pub mod discounts;
pub mod fixtures;
pub mod items;
pub mod orders;
pub mod prelude;
pub mod prices;
pub mod pricing;
pub mod products;
pub mod settings;
pub mod storage;
pub mod storefront;
pub mod summary;
