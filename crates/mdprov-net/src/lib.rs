//! # mdprov Net
//!
//! Network adapters for the permanent ledger: tag queries against a gateway,
//! submission of signed data items, and name resolution.
//!
//! ## Overview
//!
//! The service layer talks to remote systems only through the traits in
//! [`transport`], so every workflow can run against the in-memory ledger in
//! tests and against HTTP services in production.
//!
//! ## Key Types
//!
//! - [`TagQuery`] - Find items by tag (GraphQL on a gateway)
//! - [`Ingest`] - Post signed data items (upload service, process messenger)
//! - [`NameResolver`] - Resolve a registered name to its owning process
//! - [`GatewayClient`], [`UploadClient`], [`MessengerClient`] - reqwest adapters
//! - [`MemoryLedgerNetwork`] - In-process simulation of all three seams
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use mdprov_net::{http_client, GatewayClient, TagQuery};
//!
//! async fn example() {
//!     let http = http_client(Duration::from_secs(30)).unwrap();
//!     let gateway = GatewayClient::new(http, "https://arweave.net".parse().unwrap());
//!     let hits = gateway.find_by_tag("IPFS-CID", "bafkrei...", 1).await.unwrap();
//!     println!("{} matches", hits.len());
//! }
//! ```

pub mod error;
pub mod http;
pub mod transport;

pub use error::{NetError, Result};
pub use http::{http_client, GatewayClient, MessengerClient, UploadClient};
pub use transport::{
    memory::IngestFailure, memory::MemoryLedgerNetwork, Ingest, NameRecord, NameResolver,
    TagQuery, TaggedItem,
};
