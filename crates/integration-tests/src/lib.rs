//! Integration tests for the TechVerse storefront cart.
//!
//! The tests drive [`CartEngine`] against a real [`FileStore`] and reopen it
//! between steps, the way separate CLI invocations would.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p techverse-integration-tests
//! ```
//!
//! [`CartEngine`]: techverse_storefront::cart::CartEngine

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::fs;
use std::path::{Path, PathBuf};

use techverse_core::{CategoryRef, ProductId, ProductSnapshot};
use techverse_storefront::cart::CartEngine;
use techverse_storefront::storage::{FileStore, StorageError};
use uuid::Uuid;

/// A uniquely named data directory, removed on drop.
#[derive(Debug)]
pub struct TestDataDir {
    path: PathBuf,
}

impl TestDataDir {
    /// Pick a fresh directory under the system temp dir. Nothing is created
    /// until a store is opened on it.
    #[must_use]
    pub fn new() -> Self {
        Self {
            path: std::env::temp_dir().join(format!("techverse-it-{}", Uuid::new_v4())),
        }
    }

    /// Directory path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a store on the directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn store(&self) -> Result<FileStore, StorageError> {
        FileStore::open(&self.path)
    }

    /// Rehydrate a cart engine from the directory, as a new process would.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn engine(&self) -> Result<CartEngine<FileStore>, StorageError> {
        Ok(CartEngine::load(self.store()?))
    }

    /// Raw contents of the cart blob file, if written.
    #[must_use]
    pub fn raw_blob(&self) -> Option<String> {
        fs::read_to_string(self.path.join("cart-storage.json")).ok()
    }
}

impl Default for TestDataDir {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TestDataDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

/// A product snapshot with a slug derived from the name.
#[must_use]
pub fn product(id: i32, name: &str, price: &str) -> ProductSnapshot {
    ProductSnapshot {
        id: ProductId::new(id),
        name: name.to_string(),
        slug: name.to_lowercase().replace(' ', "-"),
        price: price.to_string(),
        image: format!("https://cdn.techverse.in/products/{id}.jpg"),
        category: CategoryRef {
            name: "Components".to_string(),
        },
    }
}
