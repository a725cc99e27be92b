//! HTTP adapters for the remote ledger services.
//!
//! | Client | Method | Path | Purpose |
//! |--------|--------|------|---------|
//! | [`GatewayClient`] | POST | `/graphql` | Query items by tag |
//! | [`GatewayClient`] | GET | `/ar-io/resolver/records/{name}` | Resolve a name |
//! | [`UploadClient`] | POST | `/v1/tx` | Submit a signed data item |
//! | [`MessengerClient`] | POST | `/` | Deliver a signed process message |

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use mdprov_core::{ItemId, UploadTag};
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use url::Url;

use crate::error::{NetError, Result};
use crate::transport::{Ingest, NameRecord, NameResolver, TagQuery, TaggedItem};

const USER_AGENT: &str = concat!("mdprov/", env!("CARGO_PKG_VERSION"));

/// Build the shared HTTP client with an overall request timeout.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| NetError::Client(e.to_string()))
}

fn endpoint_url(base: &Url, path: &str) -> String {
    format!("{}/{}", base.as_str().trim_end_matches('/'), path)
}

async fn error_for_status(endpoint: &str, resp: reqwest::Response) -> Result<reqwest::Response> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    Err(NetError::from_status(endpoint, status, body))
}

#[derive(Debug, Deserialize)]
struct IdResponse {
    id: String,
}

async fn post_octets(http: &reqwest::Client, endpoint: &str, url: &str, item: Bytes) -> Result<ItemId> {
    tracing::debug!(endpoint, url, size = item.len(), "posting data item");
    let resp = http
        .post(url)
        .header(CONTENT_TYPE, "application/octet-stream")
        .body(item)
        .send()
        .await
        .map_err(|e| NetError::from_reqwest(endpoint, e))?;
    let resp = error_for_status(endpoint, resp).await?;

    let body: IdResponse = resp.json().await.map_err(|e| NetError::Decode {
        endpoint: endpoint.into(),
        message: e.to_string(),
    })?;
    Ok(ItemId::new(body.id))
}

// -- Gateway -------------------------------------------------------------------

const TAG_QUERY: &str = "query($tags: [TagFilter!], $first: Int) {
  transactions(tags: $tags, first: $first) {
    edges { node { id tags { name value } } }
  }
}";

#[derive(Debug, Deserialize)]
struct GraphResponse {
    data: Option<GraphData>,
    #[serde(default)]
    errors: Vec<GraphError>,
}

#[derive(Debug, Deserialize)]
struct GraphError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct GraphData {
    transactions: Connection,
}

#[derive(Debug, Deserialize)]
struct Connection {
    #[serde(default)]
    edges: Vec<Edge>,
}

#[derive(Debug, Deserialize)]
struct Edge {
    node: Node,
}

#[derive(Debug, Deserialize)]
struct Node {
    id: String,
    #[serde(default)]
    tags: Vec<UploadTag>,
}

/// Client for an Arweave gateway: GraphQL tag queries and name resolution.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: Url,
}

impl GatewayClient {
    pub fn new(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

#[async_trait]
impl TagQuery for GatewayClient {
    async fn find_by_tag(&self, name: &str, value: &str, first: u32) -> Result<Vec<TaggedItem>> {
        let endpoint = "POST /graphql";
        let url = endpoint_url(&self.base_url, "graphql");
        tracing::debug!(%url, name, value, first, "querying tags");
        let request = serde_json::json!({
            "query": TAG_QUERY,
            "variables": {
                "tags": [{ "name": name, "values": [value] }],
                "first": first,
            },
        });

        let resp = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| NetError::from_reqwest(endpoint, e))?;
        let resp = error_for_status(endpoint, resp).await?;

        let body: GraphResponse = resp.json().await.map_err(|e| NetError::Decode {
            endpoint: endpoint.into(),
            message: e.to_string(),
        })?;
        let data = match body.data {
            Some(data) => data,
            None => {
                let message = body
                    .errors
                    .into_iter()
                    .map(|e| e.message)
                    .collect::<Vec<_>>()
                    .join("; ");
                return Err(NetError::Decode {
                    endpoint: endpoint.into(),
                    message: if message.is_empty() {
                        "response has no data".into()
                    } else {
                        message
                    },
                });
            }
        };

        Ok(data
            .transactions
            .edges
            .into_iter()
            .map(|edge| TaggedItem {
                id: ItemId::new(edge.node.id),
                tags: edge.node.tags,
            })
            .collect())
    }
}

#[async_trait]
impl NameResolver for GatewayClient {
    async fn resolve(&self, name: &str) -> Result<NameRecord> {
        let endpoint = format!("GET /ar-io/resolver/records/{name}");
        let url = endpoint_url(&self.base_url, &format!("ar-io/resolver/records/{name}"));
        tracing::debug!(%url, "resolving name");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| NetError::from_reqwest(&endpoint, e))?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(NetError::NameNotRegistered(name.to_string()));
        }
        let resp = error_for_status(&endpoint, resp).await?;

        resp.json().await.map_err(|e| NetError::Decode {
            endpoint,
            message: e.to_string(),
        })
    }
}

// -- Upload service ------------------------------------------------------------

/// Client for a bundling upload service.
#[derive(Debug, Clone)]
pub struct UploadClient {
    http: reqwest::Client,
    base_url: Url,
}

impl UploadClient {
    pub fn new(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }
}

#[async_trait]
impl Ingest for UploadClient {
    async fn post_item(&self, item: Bytes) -> Result<ItemId> {
        let url = endpoint_url(&self.base_url, "v1/tx");
        post_octets(&self.http, "POST /v1/tx", &url, item).await
    }
}

// -- Process messenger ---------------------------------------------------------

/// Client for a message unit that accepts signed process messages.
#[derive(Debug, Clone)]
pub struct MessengerClient {
    http: reqwest::Client,
    base_url: Url,
}

impl MessengerClient {
    pub fn new(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }
}

#[async_trait]
impl Ingest for MessengerClient {
    async fn post_item(&self, item: Bytes) -> Result<ItemId> {
        let url = format!("{}/", self.base_url.as_str().trim_end_matches('/'));
        post_octets(&self.http, "POST /", &url, item).await
    }
}
