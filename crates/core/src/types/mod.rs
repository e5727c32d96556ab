//! Core types for Emporium.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod display_name;
pub mod id;
pub mod price;

pub use display_name::{DisplayName, DisplayNameError};
pub use id::{ProductId, ProductIdError};
pub use price::{Price, PriceError};
