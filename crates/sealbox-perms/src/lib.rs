//! # Sealbox Permissions
//!
//! Access gating for encrypted files: per-file permission entries and
//! time-limited share links.
//!
//! ## Key Concepts
//!
//! - **PermissionEntry**: grants one user `view` or `downloadview` on one file
//! - **Owner/admin override**: the owner and every admin hold `downloadview`
//!   whatever the entries say
//! - **Full replace**: an entry set is only ever written as a whole
//! - **ShareLink**: a bearer token valid for 30, 60 or 120 seconds
//!
//! Share links and per-user permissions are separate gates. Holding a live
//! link does not grant anything in the registry, and revoking an entry does
//! not touch links.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sealbox_core::{AccessType, FileId, Principal, UserId};
//! use sealbox_perms::{PermissionEditSession, PermissionRegistry, ShareLinkIssuer};
//! use sealbox_store::MemoryStore;
//!
//! async fn example(file: FileId, now: i64) -> sealbox_perms::Result<()> {
//!     let owner = Principal::user(1);
//!     let registry = PermissionRegistry::new(Arc::new(MemoryStore::new()));
//!
//!     let mut session = PermissionEditSession::load(&registry, file).await?;
//!     session.set(UserId(2), AccessType::View);
//!     session.save(&registry, &owner).await?;
//!
//!     let issuer = ShareLinkIssuer::new(registry.clone());
//!     let link = issuer.issue(file, &owner, 60, now).await?;
//!     issuer.validate(&link.token, now + 1_000).await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod registry;
pub mod session;
pub mod share;

pub use error::{PermsError, Result};
pub use registry::PermissionRegistry;
pub use session::PermissionEditSession;
pub use share::{share_url, ShareLinkIssuer};
