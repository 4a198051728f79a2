//! # Sealbox Store
//!
//! Storage abstraction for Sealbox. Provides a trait-based interface for
//! persisting uploaded envelopes, permission entries and share links, with
//! SQLite and in-memory implementations.
//!
//! ## Key Types
//!
//! - [`Store`] - The async trait for all storage operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//! - [`NewFile`] / [`StoredFile`] - An upload before and after persistence
//!
//! ## Usage
//!
//! ```rust,no_run
//! use sealbox_store::{SqliteStore, Store};
//! use sealbox_core::UserId;
//!
//! async fn example() -> sealbox_store::Result<()> {
//!     // Open a SQLite database
//!     let store = SqliteStore::open("sealbox.db")?;
//!
//!     // Or use an in-memory database for testing
//!     let store = SqliteStore::open_memory()?;
//!
//!     let files = store.list_files_for(UserId(1)).await?;
//!     println!("{} visible files", files.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Key material is stored**: the key that arrived with an upload is kept
//!   next to the ciphertext and handed back on download.
//! - **Cascading delete**: removing a file removes its permissions and links
//! - **Atomic replace**: a permission set is swapped in one transaction

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{NewFile, Store, StoredFile};
