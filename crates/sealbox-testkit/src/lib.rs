//! # Sealbox Testkit
//!
//! Testing utilities for Sealbox.
//!
//! - **Fixtures**: a server over an in-memory store with a cast of principals
//! - **Generators**: Proptest strategies for property-based testing
//!
//! ## Test Fixtures
//!
//! ```rust
//! use sealbox_testkit::TestFixture;
//!
//! let fixture = TestFixture::new();
//! let alice = fixture.client(fixture.owner);
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use sealbox_testkit::generators::{permission_batch, plaintext};
//!
//! proptest! {
//!     #[test]
//!     fn envelope_roundtrip(data in plaintext(4096)) {
//!         // ...
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::TestFixture;
