//! Product catalog REST API client.
//!
//! # Architecture
//!
//! - The catalog is the source of truth; products are never stored locally
//! - The full listing is cached in memory via `moka` (configurable TTL)
//! - Writes invalidate the cached listing
//!
//! # Endpoints
//!
//! - `GET  api/getproduct` - JSON array of products
//! - `POST api/postProduct` - create from a [`NewProduct`] body
//! - `DELETE api/deleteProduct/{id}` - delete by ID
//!
//! # Example
//!
//! ```rust,ignore
//! use emporium_storefront::catalog::CatalogClient;
//!
//! let client = CatalogClient::new(&config.catalog)?;
//! let products = client.list_products().await?;
//! ```

mod cache;

use std::sync::Arc;

use moka::future::Cache;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use emporium_core::{NewProduct, Product, ProductId};

use crate::config::CatalogConfig;

use cache::{CacheKey, CachedProducts};

/// Response bodies quoted in errors and logs are cut to this many characters.
const BODY_PREVIEW_CHARS: usize = 200;

/// Errors that can occur when talking to the catalog API.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The catalog returned a non-success status.
    #[error("catalog returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// An endpoint URL could not be built.
    #[error("invalid catalog URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Client for the product catalog API.
///
/// Cheap to clone; clones share the HTTP connection pool and the cache.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<CacheKey, CachedProducts>,
}

impl CatalogClient {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let cache = Cache::builder()
            .max_capacity(16)
            .time_to_live(config.cache_ttl)
            .build();

        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client,
                base_url: config.base_url.clone(),
                cache,
            }),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, CatalogError> {
        Ok(self.inner.base_url.join(path)?)
    }

    // =========================================================================
    // Reads (cached)
    // =========================================================================

    /// Fetch the full product listing.
    ///
    /// Served from cache for up to `cache_ttl` after a fetch, so changes made
    /// by other catalog clients can take that long to appear. Changes made
    /// through this client update the cache immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a product
    /// array.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<CachedProducts, CatalogError> {
        if let Some(products) = self.inner.cache.get(&CacheKey::Products).await {
            debug!("Cache hit for product listing");
            return Ok(products);
        }

        let url = self.endpoint("api/getproduct")?;
        let response = self.inner.client.get(url).send().await?;
        let body = read_success_body(response).await?;

        let products: Vec<Product> = match serde_json::from_str(&body) {
            Ok(products) => products,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %preview(&body),
                    "Failed to parse catalog product listing"
                );
                return Err(CatalogError::Parse(e));
            }
        };

        debug!(count = products.len(), "Fetched product listing");
        let products: CachedProducts = products.into();
        self.inner
            .cache
            .insert(CacheKey::Products, Arc::clone(&products))
            .await;

        Ok(products)
    }

    /// Find one product by ID in the full listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing cannot be fetched.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn find_product(&self, id: &ProductId) -> Result<Option<Product>, CatalogError> {
        let products = self.list_products().await?;
        Ok(products.iter().find(|product| &product.id == id).cloned())
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the catalog rejects it.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create_product(&self, product: &NewProduct) -> Result<(), CatalogError> {
        let url = self.endpoint("api/postProduct")?;
        let response = self.inner.client.post(url).json(product).send().await?;
        read_success_body(response).await?;

        self.invalidate_products().await;
        Ok(())
    }

    /// Delete a product, optimistically.
    ///
    /// The product is dropped from the cached listing before the request is
    /// sent. If the request fails the cached listing is invalidated so the
    /// next read re-fetches the catalog's actual state.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the catalog rejects it.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), CatalogError> {
        self.evict_product(id).await;

        let result = self.send_delete(id).await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, "Delete failed, reconciling product listing");
            self.invalidate_products().await;
        }
        result
    }

    async fn send_delete(&self, id: &ProductId) -> Result<(), CatalogError> {
        let path = format!("api/deleteProduct/{}", urlencoding::encode(id.as_str()));
        let url = self.endpoint(&path)?;
        let response = self.inner.client.delete(url).send().await?;
        read_success_body(response).await?;
        Ok(())
    }

    // =========================================================================
    // Cache Management
    // =========================================================================

    /// Drop one product from the cached listing, if a listing is cached.
    async fn evict_product(&self, id: &ProductId) {
        if let Some(products) = self.inner.cache.get(&CacheKey::Products).await {
            let remaining: CachedProducts = products
                .iter()
                .filter(|product| &product.id != id)
                .cloned()
                .collect();
            self.inner.cache.insert(CacheKey::Products, remaining).await;
        }
    }

    /// Invalidate the cached product listing.
    pub async fn invalidate_products(&self) {
        self.inner.cache.invalidate(&CacheKey::Products).await;
    }
}

/// Read the body of a response, turning non-2xx statuses into errors.
async fn read_success_body(response: reqwest::Response) -> Result<String, CatalogError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        tracing::error!(
            status = %status,
            body = %preview(&body),
            "Catalog API returned non-success status"
        );
        return Err(CatalogError::Status {
            status,
            body: preview(&body),
        });
    }

    Ok(body)
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}
