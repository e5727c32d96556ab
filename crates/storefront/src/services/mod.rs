//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Sign-in and sign-up form handling behind the [`auth::Authenticator`] trait

pub mod auth;
