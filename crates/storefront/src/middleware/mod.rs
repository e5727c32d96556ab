//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions, signed cookie)
//! 4. Route guard (`require_session`, on guarded routes only)

pub mod auth;
pub mod session;
pub mod visitor;

pub use auth::{current_user, require_session};
pub use session::create_session_layer;
pub use visitor::{SessionStore, Visitor};
