//! Authentication route handlers.
//!
//! Handles login, signup and logout. Whether a submission is accepted is up
//! to the configured [`Authenticator`](crate::services::auth::Authenticator).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use emporium_core::{DisplayNameError, FieldErrors};

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::Visitor;
use crate::routes::cart::local_path;
use crate::routes::layout::Layout;
use crate::services::auth::{AuthError, LoginRequest, SignupRequest};
use crate::state::AppState;

// =============================================================================
// Query Types
// =============================================================================

/// Where to go after signing in. Set by the route guard.
#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

impl NextQuery {
    /// Validated local redirect target.
    fn target(&self) -> &str {
        local_path(self.next.as_deref()).unwrap_or("/")
    }

    /// Form action that carries `next` through the POST.
    fn login_action(&self) -> String {
        match local_path(self.next.as_deref()) {
            Some(next) => format!("/login?next={}", urlencoding::encode(next)),
            None => "/login".to_string(),
        }
    }
}

/// Inline error for an identifier the authenticator refused to parse.
fn identifier_error(error: &DisplayNameError) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.insert("email", error.to_string());
    errors
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub action: String,
    pub email: String,
    pub errors: FieldErrors,
    pub error: Option<String>,
}

/// Signup page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub layout: Layout,
    pub name: String,
    pub email: String,
    pub errors: FieldErrors,
    pub error: Option<String>,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(
    Visitor(visitor): Visitor,
    Query(query): Query<NextQuery>,
) -> impl IntoResponse {
    LoginTemplate {
        layout: Layout::new(&visitor),
        action: query.login_action(),
        email: String::new(),
        errors: FieldErrors::new(),
        error: None,
    }
}

/// Handle login form submission.
#[instrument(skip(state, visitor, form))]
pub async fn login(
    State(state): State<AppState>,
    Visitor(mut visitor): Visitor,
    Query(query): Query<NextQuery>,
    Form(form): Form<LoginRequest>,
) -> Result<Response> {
    let render = |status: StatusCode, errors: FieldErrors, error: Option<String>, layout| {
        (
            status,
            LoginTemplate {
                layout,
                action: query.login_action(),
                email: form.identifier.clone(),
                errors,
                error,
            },
        )
            .into_response()
    };

    let errors = form.validate();
    if !errors.is_empty() {
        return Ok(render(
            StatusCode::UNPROCESSABLE_ENTITY,
            errors,
            None,
            Layout::new(&visitor),
        ));
    }

    let user = match state.authenticator().login(&form).await {
        Ok(user) => user,
        Err(AuthError::InvalidCredentials) => {
            tracing::info!("Login rejected");
            return Ok(render(
                StatusCode::UNAUTHORIZED,
                FieldErrors::new(),
                Some("Invalid email or password".to_string()),
                Layout::new(&visitor),
            ));
        }
        Err(AuthError::InvalidIdentifier(e)) => {
            return Ok(render(
                StatusCode::UNPROCESSABLE_ENTITY,
                identifier_error(&e),
                None,
                Layout::new(&visitor),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    visitor.sign_in(user).await?;
    if let Some(user) = visitor.session().user() {
        set_sentry_user(user.as_str());
        tracing::info!(user = %user, "Signed in");
    }

    Ok(Redirect::to(query.target()).into_response())
}

// =============================================================================
// Signup Routes
// =============================================================================

/// Display the signup page.
pub async fn signup_page(Visitor(visitor): Visitor) -> impl IntoResponse {
    SignupTemplate {
        layout: Layout::new(&visitor),
        name: String::new(),
        email: String::new(),
        errors: FieldErrors::new(),
        error: None,
    }
}

/// Handle signup form submission.
///
/// Mismatched passwords re-render the form with an inline error; nothing is
/// stored.
#[instrument(skip(state, visitor, form))]
pub async fn signup(
    State(state): State<AppState>,
    Visitor(mut visitor): Visitor,
    Form(form): Form<SignupRequest>,
) -> Result<Response> {
    let render = |status: StatusCode, errors: FieldErrors, error: Option<String>, layout| {
        (
            status,
            SignupTemplate {
                layout,
                name: form.name.clone(),
                email: form.email.clone(),
                errors,
                error,
            },
        )
            .into_response()
    };

    let errors = form.validate();
    if !errors.is_empty() {
        return Ok(render(
            StatusCode::UNPROCESSABLE_ENTITY,
            errors,
            None,
            Layout::new(&visitor),
        ));
    }

    let user = match state.authenticator().signup(&form).await {
        Ok(user) => user,
        Err(AuthError::InvalidCredentials) => {
            return Ok(render(
                StatusCode::UNAUTHORIZED,
                FieldErrors::new(),
                Some("Could not create the account".to_string()),
                Layout::new(&visitor),
            ));
        }
        Err(AuthError::InvalidIdentifier(e)) => {
            return Ok(render(
                StatusCode::UNPROCESSABLE_ENTITY,
                identifier_error(&e),
                None,
                Layout::new(&visitor),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    visitor.sign_in(user).await?;
    if let Some(user) = visitor.session().user() {
        set_sentry_user(user.as_str());
        tracing::info!(user = %user, "Signed up");
    }

    Ok(Redirect::to("/").into_response())
}

// =============================================================================
// Logout
// =============================================================================

/// Handle logout. The cart is kept.
#[instrument(skip(visitor))]
pub async fn logout(Visitor(mut visitor): Visitor) -> Result<Redirect> {
    visitor.sign_out().await?;
    clear_sentry_user();
    Ok(Redirect::to("/"))
}
