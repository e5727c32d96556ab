//! Authentication service.
//!
//! Sign-in and sign-up go through the [`Authenticator`] trait. The shipped
//! [`DemoAuthenticator`] accepts every well-formed submission after a short
//! simulated delay; a credential-checking implementation can replace it in
//! [`AppState`](crate::state::AppState) without touching the route handlers.

mod error;

pub use error::AuthError;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use tracing::instrument;

use emporium_core::{DisplayName, FieldErrors};

/// Login form submission.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Whatever the visitor typed into the email field.
    #[serde(rename = "email", default)]
    pub identifier: String,
    #[serde(deserialize_with = "deserialize_secret", default = "empty_secret")]
    pub password: SecretString,
}

impl LoginRequest {
    /// Check required fields.
    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.identifier.trim().is_empty() {
            errors.insert("email", "Email is required");
        }
        if self.password.expose_secret().is_empty() {
            errors.insert("password", "Password is required");
        }
        errors
    }
}

/// Signup form submission.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(deserialize_with = "deserialize_secret", default = "empty_secret")]
    pub password: SecretString,
    #[serde(deserialize_with = "deserialize_secret", default = "empty_secret")]
    pub confirm_password: SecretString,
}

impl SignupRequest {
    /// The identifier the session is started with: the email, or the name
    /// when no email was given.
    #[must_use]
    pub fn identifier(&self) -> &str {
        let email = self.email.trim();
        if email.is_empty() {
            self.name.trim()
        } else {
            email
        }
    }

    #[must_use]
    pub fn passwords_match(&self) -> bool {
        self.password.expose_secret() == self.confirm_password.expose_secret()
    }

    /// Check required fields and the password confirmation.
    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.identifier().is_empty() {
            errors.insert("email", "Name or email is required");
        }
        if self.password.expose_secret().is_empty() {
            errors.insert("password", "Password is required");
        }
        if !self.passwords_match() {
            errors.insert("confirm_password", "Passwords do not match");
        }
        errors
    }
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

fn empty_secret() -> SecretString {
    SecretString::from(String::new())
}

/// Decides whether a sign-in or sign-up is accepted.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Accept a login, returning the name to start the session with.
    async fn login(&self, request: &LoginRequest) -> Result<DisplayName, AuthError>;

    /// Accept a signup, returning the name to start the session with.
    async fn signup(&self, request: &SignupRequest) -> Result<DisplayName, AuthError>;
}

/// Accepts any non-empty identifier without checking credentials.
///
/// Waits for `delay` first so the sign-in flow behaves like a network call.
#[derive(Debug, Clone)]
pub struct DemoAuthenticator {
    delay: Duration,
}

impl DemoAuthenticator {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Authenticator for DemoAuthenticator {
    #[instrument(skip(self, request))]
    async fn login(&self, request: &LoginRequest) -> Result<DisplayName, AuthError> {
        tokio::time::sleep(self.delay).await;
        Ok(DisplayName::parse(&request.identifier)?)
    }

    #[instrument(skip(self, request))]
    async fn signup(&self, request: &SignupRequest) -> Result<DisplayName, AuthError> {
        if !request.passwords_match() {
            return Err(AuthError::PasswordMismatch);
        }
        tokio::time::sleep(self.delay).await;
        Ok(DisplayName::parse(request.identifier())?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn login(identifier: &str, password: &str) -> LoginRequest {
        LoginRequest {
            identifier: identifier.to_string(),
            password: SecretString::from(password.to_string()),
        }
    }

    fn signup(name: &str, email: &str, password: &str, confirm: &str) -> SignupRequest {
        SignupRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: SecretString::from(password.to_string()),
            confirm_password: SecretString::from(confirm.to_string()),
        }
    }

    #[test]
    fn test_login_validation() {
        assert!(login("e@x.com", "pw").validate().is_empty());

        let errors = login("  ", "").validate();
        assert!(errors.get("email").is_some());
        assert!(errors.get("password").is_some());
    }

    #[test]
    fn test_signup_identifier_prefers_email() {
        assert_eq!(signup("Ann", "a@x.com", "p", "p").identifier(), "a@x.com");
        assert_eq!(signup("Ann", " ", "p", "p").identifier(), "Ann");
    }

    #[test]
    fn test_signup_mismatch() {
        let errors = signup("Ann", "a@x.com", "one", "two").validate();
        assert_eq!(errors.get("confirm_password"), Some("Passwords do not match"));
        assert_eq!(errors.get("email"), None);
        assert_eq!(errors.get("password"), None);
    }

    #[test]
    fn test_form_deserialize() {
        let request: LoginRequest =
            serde_json::from_str(r#"{"email":"e@x.com","password":"hunter2"}"#).unwrap();
        assert_eq!(request.identifier, "e@x.com");
        assert_eq!(request.password.expose_secret(), "hunter2");
        assert!(!format!("{request:?}").contains("hunter2"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_demo_login_waits_then_accepts() {
        let auth = DemoAuthenticator::new(Duration::from_millis(800));
        let started = tokio::time::Instant::now();

        let name = auth.login(&login(" e@x.com ", "pw")).await.unwrap();

        assert_eq!(name.as_str(), "e@x.com");
        assert!(started.elapsed() >= Duration::from_millis(800));
    }

    #[tokio::test(start_paused = true)]
    async fn test_demo_signup_rejects_mismatch() {
        let auth = DemoAuthenticator::new(Duration::from_millis(800));
        let err = auth
            .signup(&signup("Ann", "a@x.com", "one", "two"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::PasswordMismatch));
    }

    #[tokio::test(start_paused = true)]
    async fn test_demo_login_accepts_long_identifier() {
        let auth = DemoAuthenticator::new(Duration::ZERO);
        let long = "a".repeat(300);

        assert!(login(&long, "pw").validate().is_empty());
        let name = auth.login(&login(&long, "pw")).await.unwrap();
        assert_eq!(name.as_str(), long);
    }

    #[tokio::test(start_paused = true)]
    async fn test_demo_login_rejects_blank() {
        let auth = DemoAuthenticator::new(Duration::ZERO);
        let err = auth.login(&login("   ", "pw")).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidIdentifier(_)));
    }
}
