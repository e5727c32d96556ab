//! Per-visitor client state extractor.
//!
//! The visitor's HTTP session is the persistent key-value store behind
//! [`ClientState`]: every cart or sign-in mutation is written into it.

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use serde_json::Value;
use tower_sessions::Session;

use emporium_core::{ClientState, KeyValueStore, StoreError};

use crate::error::AppError;

/// [`KeyValueStore`] backed by a `tower_sessions::Session`.
#[derive(Debug, Clone)]
pub struct SessionStore(pub Session);

#[async_trait]
impl KeyValueStore for SessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .0
            .get_value(key)
            .await
            .map_err(StoreError::backend)?;

        // Anything that is not a JSON string is handed back as JSON text so
        // the decoder can reject it.
        Ok(value.map(|value| match value {
            Value::String(s) => s,
            other => other.to_string(),
        }))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.0.insert(key, value).await.map_err(StoreError::backend)
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.0
            .remove_value(key)
            .await
            .map_err(StoreError::backend)?;
        Ok(())
    }
}

/// The requesting visitor's cart and session.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(Visitor(mut state): Visitor) -> Result<Redirect> {
///     state.sign_out().await?;
///     Ok(Redirect::to("/"))
/// }
/// ```
pub struct Visitor(pub ClientState<SessionStore>);

impl<S> FromRequestParts<S> for Visitor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by SessionManagerLayer
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer not installed".to_string()))?;

        let state = ClientState::load(SessionStore(session)).await?;
        Ok(Self(state))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use emporium_core::store::keys;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_round_trips_strings() {
        let store = SessionStore(session());
        store.set(keys::USER, "e@x.com".to_string()).await.unwrap();
        assert_eq!(
            store.get(keys::USER).await.unwrap().as_deref(),
            Some("e@x.com")
        );

        store.remove(keys::USER).await.unwrap();
        assert_eq!(store.get(keys::USER).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_non_string_value_returned_as_json() {
        let session = session();
        session.insert(keys::CART, vec![1, 2]).await.unwrap();

        let store = SessionStore(session);
        assert_eq!(store.get(keys::CART).await.unwrap().as_deref(), Some("[1,2]"));
    }

    #[tokio::test]
    async fn test_client_state_over_session() {
        let session = session();
        session.insert(keys::CART, "not a cart").await.unwrap();

        let state = ClientState::load(SessionStore(session.clone())).await.unwrap();
        assert!(state.cart().is_empty());
        assert_eq!(session.get_value(keys::CART).await.unwrap(), None);
    }
}
