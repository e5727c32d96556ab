//! Cache types for catalog API responses.

use std::sync::Arc;

use emporium_core::Product;

/// Cache key for catalog responses.
///
/// The catalog only offers the full listing, so there is a single entry.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Products,
}

/// Cached product listing, shared between readers without copying.
pub type CachedProducts = Arc<[Product]>;
