//! Route guard.
//!
//! Guarded routes are wrapped with [`require_session`] via `route_layer`, so
//! an anonymous request is redirected before the handler is reached.

use axum::{
    extract::Request,
    http::Method,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use emporium_core::store::keys;
use emporium_core::{DisplayName, KeyValueStore};

use super::visitor::SessionStore;

/// Display name of the signed-in visitor, if any.
///
/// A missing, blank or unreadable stored value counts as signed out.
pub async fn current_user(session: &Session) -> Option<DisplayName> {
    let store = SessionStore(session.clone());
    match store.get(keys::USER).await {
        Ok(raw) => raw.and_then(|raw| DisplayName::parse(&raw).ok()),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read session user");
            None
        }
    }
}

/// Middleware that only lets signed-in visitors through.
///
/// Anonymous `GET` requests are sent to `/login?next=<path>` so the visitor
/// comes back after signing in; other methods go to `/login`.
///
/// # Example
///
/// ```rust,ignore
/// let guarded = Router::new()
///     .route("/cart", get(cart::show))
///     .route_layer(axum::middleware::from_fn(require_session));
/// ```
pub async fn require_session(session: Session, request: Request, next: Next) -> Response {
    if current_user(&session).await.is_some() {
        return next.run(request).await;
    }

    let location = login_redirect(
        request.method(),
        request.uri().path_and_query().map(|pq| pq.as_str()),
    );
    tracing::debug!(path = %request.uri().path(), "Anonymous request to guarded route");
    Redirect::to(&location).into_response()
}

fn login_redirect(method: &Method, original: Option<&str>) -> String {
    match original {
        Some(path) if method == Method::GET => {
            format!("/login?next={}", urlencoding::encode(path))
        }
        _ => "/login".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_redirect_keeps_get_path() {
        assert_eq!(
            login_redirect(&Method::GET, Some("/buy-now/a1?x=1")),
            "/login?next=%2Fbuy-now%2Fa1%3Fx%3D1"
        );
    }

    #[test]
    fn test_login_redirect_drops_next_for_posts() {
        assert_eq!(login_redirect(&Method::POST, Some("/cart/clear")), "/login");
    }
}
