//! Session-scoped models for the storefront.
//!
//! Catalog and purchase types come from `acme_shop_core`; this module only
//! holds what lives in the session between requests.

pub mod flash;
pub mod session;

pub use flash::{Flash, FlashStatus};
pub use session::keys as session_keys;
