//! Core types for TechVerse.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod price;
pub mod product;

pub use cart::CartLineItem;
pub use id::*;
pub use price::{CurrencyCode, Price, PriceError};
pub use product::{CategoryRef, ProductSnapshot};
