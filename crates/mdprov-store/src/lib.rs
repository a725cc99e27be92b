//! # mdprov Store
//!
//! Local provenance state for mdprov. Provides a trait-based interface for
//! the append-only transaction ledger and index version log, with JSON Lines
//! and in-memory implementations.
//!
//! ## Key Types
//!
//! - [`LocalLedger`] - The async trait for the transaction ledger
//! - [`IndexHistory`] - The async trait for published index versions
//! - [`JsonlLedger`] / [`JsonlIndexHistory`] - File-backed implementations
//! - [`MemoryLedger`] / [`MemoryIndexHistory`] - In-memory implementations for tests
//! - [`StateDir`] - Paths inside the state directory
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mdprov_core::ContentId;
//! use mdprov_store::{LocalLedger, StateDir};
//!
//! async fn example() {
//!     let state = StateDir::new("/home/me/.markdown-provenance");
//!     let ledger = state.ledger();
//!
//!     let cid = ContentId::identify(b"# Hello");
//!     if let Some(record) = ledger.find_by_content_id(&cid).await.unwrap() {
//!         println!("already uploaded as {}", record.tx_id);
//!     }
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Append-only**: records are never rewritten or removed
//! - **Corruption tolerant**: blank and malformed lines are skipped on read
//! - **Most recent wins**: lookups return the last matching record

pub mod error;
pub mod file;
pub mod jsonl;
pub mod memory;
pub mod traits;

pub use error::{Result, StoreError};
pub use file::{JsonlIndexHistory, JsonlLedger, StateDir};
pub use jsonl::JsonLines;
pub use memory::{MemoryIndexHistory, MemoryLedger};
pub use traits::{IndexHistory, LocalLedger};
