//! Emporium Core - Domain types and client state.
//!
//! This crate holds everything the storefront knows about carts, sessions and
//! catalog records, independent of HTTP:
//!
//! - [`types`] - Newtype wrappers for product IDs, prices and display names
//! - [`product`] - Catalog records and the product creation form
//! - [`cart`] - Cart entries, quantities and totals
//! - [`session`] - Who is using this client
//! - [`store`] - The per-visitor key-value store contract
//! - [`state`] - The state container that mirrors cart and session to a store
//!
//! # Architecture
//!
//! No HTTP clients and no server code live here. The storefront crate plugs a
//! session-backed [`store::KeyValueStore`] into [`state::ClientState`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod product;
pub mod session;
pub mod state;
pub mod store;
pub mod types;
pub mod validation;

pub use cart::{Cart, CartDecodeError, CartEntry, ClearOutcome};
pub use product::{Category, NewProduct, Product, ProductForm};
pub use session::Session;
pub use state::{ClientState, StateError};
pub use store::{KeyValueStore, MemoryStore, StoreError};
pub use types::*;
pub use validation::FieldErrors;
