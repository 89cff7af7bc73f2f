//! TechVerse Storefront library.
//!
//! Client-side storefront logic for the TechVerse repair and electronics
//! shop: the per-identity shopping cart and its durable storage, identity
//! change tracking, and the few backend calls the cart depends on.
//!
//! # Modules
//!
//! - [`cart`] - Cart engine that isolates carts per identity
//! - [`storage`] - Durable key/value stores (file and in-memory)
//! - [`session`] - Sequenced identity change notifications
//! - [`api`] - Backend REST client (login, session check, bulk orders)
//! - [`checkout`] - Order placement from the cart
//! - [`config`] - Environment configuration
//! - [`error`] - Unified error type and Sentry helpers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod session;
pub mod storage;
