//! # mdprov Testkit
//!
//! Testing utilities for mdprov.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known content ids and item ids that every build must
//!   reproduce byte for byte
//! - **Generators**: Proptest strategies for documents, tags and keys
//! - **Fixtures**: A wired service over an in-memory network and a temporary
//!   state directory
//!
//! ## Golden Vectors
//!
//! ```rust
//! use mdprov_testkit::vectors::verify_all_vectors;
//!
//! for (name, ok, actual) in verify_all_vectors() {
//!     assert!(ok, "{name}: {actual}");
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,no_run
//! use mdprov::UploadRequest;
//! use mdprov_testkit::fixtures::TestFixture;
//!
//! # async fn example() {
//! let fixture = TestFixture::new();
//! let service = fixture.service();
//! let result = service
//!     .upload(b"# Notes\n", &UploadRequest::new("notes.md"))
//!     .await
//!     .unwrap();
//! assert_eq!(fixture.network.submission_count().await, 1);
//! # let _ = result;
//! # }
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{TestFixture, TEST_ARNS_NAME, TEST_PROCESS_ID, TEST_SEED};
pub use generators::{markdown, upload_tag, DocumentParams};
pub use vectors::{all_vectors, verify_all_vectors, ContentVector, ItemVector};
