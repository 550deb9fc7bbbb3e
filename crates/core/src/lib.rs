//! Acme Shop Core - Domain types for the shop.
//!
//! This crate provides the types shared by every Acme Shop component:
//! - `storefront` - Public-facing catalog, cart and checkout
//! - `cli` - Command-line tools for migrations and catalog management
//!
//! # Architecture
//!
//! The core crate contains only types and business rules - no I/O, no
//! database access, no HTTP. The cart arithmetic and the stock availability
//! check live here so they can be tested without a server.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices and pagination
//! - [`catalog`] - Products and the availability check
//! - [`purchase`] - Purchases and their line items
//! - [`cart`] - The session-scoped shopping cart

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod purchase;
pub mod types;

pub use cart::ShoppingCart;
pub use catalog::{AvailabilityError, Product};
pub use purchase::{ProductPurchase, Purchase};
pub use types::*;
