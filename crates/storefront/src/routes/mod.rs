//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Health check
//!
//! # Products
//! GET  /products               - Product listing (?category=, ?error=, ?success=)
//! GET  /products/{id}          - Product detail
//! POST /products/{id}/delete   - Delete product
//! GET  /products/new           - Add-product form (guarded)
//! POST /products/new           - Create product (guarded)
//!
//! # Cart
//! POST /cart/add               - Add to cart
//! GET  /cart/count             - Cart count badge (fragment)
//! GET  /cart                   - Cart page (guarded)
//! POST /cart/quantity          - Set quantity (guarded)
//! POST /cart/remove            - Remove entries (guarded)
//! POST /cart/clear             - Clear with confirmation (guarded)
//!
//! # Checkout
//! GET  /checkout               - Order summary (guarded)
//! GET  /buy-now/{id}           - Single product summary (guarded)
//!
//! # Auth
//! GET  /login                  - Login page (?next=)
//! POST /login                  - Login action
//! GET  /signup                 - Signup page
//! POST /signup                 - Signup action
//! POST /logout                 - Logout action
//! ```

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod home;
pub mod layout;
pub mod products;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::middleware::require_session;
use crate::state::AppState;

/// Routes that require a signed-in visitor.
pub fn guarded_routes() -> Router<AppState> {
    Router::new()
        .route("/products/new", get(products::new).post(products::create))
        .route("/cart", get(cart::show))
        .route("/cart/quantity", post(cart::quantity))
        .route("/cart/remove", post(cart::remove))
        .route("/cart/clear", post(cart::clear))
        .route("/checkout", get(checkout::checkout))
        .route("/buy-now/{id}", get(checkout::buy_now))
        .route_layer(middleware::from_fn(require_session))
}

/// Routes open to everyone.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/products", get(products::index))
        .route("/products/{id}", get(products::show))
        .route("/products/{id}/delete", post(products::delete))
        .route("/cart/add", post(cart::add))
        .route("/cart/count", get(cart::count))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/signup", get(auth::signup_page).post(auth::signup))
        .route("/logout", post(auth::logout))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(public_routes())
        .merge(guarded_routes())
}
