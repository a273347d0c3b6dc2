/*============================================================
  Synavera Project: Gog-Chk
  Module: gogchk_core::catalog
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1
  ------------------------------------------------------------
  Purpose:
    Query the remote product catalog (GOGDB product JSON) for the
    installer builds known for one catalog id.

  Security / Safety Notes:
    Performs read-only HTTPS GET requests against a public API.
    No credentials are transmitted.

  Dependencies:
    reqwest for HTTP, serde for response parsing, urlencoding
    for path-safe ids.

  Operational Scope:
    Invoked once per owned package while reconciling a scan.

  Revision History:
    2025-11-12 COD  Implemented asynchronous catalog client.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Distinct error paths for missing, transport, and parse
    - Configurable timeouts and opt-in retry with backoff
============================================================*/

use std::future::Future;
use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use tokio::time::sleep;
use urlencoding::encode;

use crate::config::CatalogConfig;
use crate::error::{GogchkError, Result};
use crate::naming::Platform;

const ID_PLACEHOLDER: &str = "{id}";

/// Source of authoritative installer listings, keyed by catalog id.
pub trait Catalog: Clone + Send + Sync + 'static {
    /// Fetch the product record published under `id`.
    fn fetch_catalog(&self, id: &str) -> impl Future<Output = Result<CatalogRecord>> + Send;
}

/// Product metadata as published by the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRecord {
    pub slug: String,
    pub installers: Vec<Installer>,
}

/// One installer build listed for a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installer {
    pub version: Option<String>,
    pub os: Platform,
}

impl CatalogRecord {
    /// Decode a product document; installers for unknown systems are dropped.
    pub fn from_json(body: &str) -> Result<Self> {
        let product: ProductResponse = serde_json::from_str(body)
            .map_err(|err| GogchkError::Parse(format!("Failed to decode product: {err}")))?;
        let installers = product
            .dl_installer
            .into_iter()
            .filter_map(|entry| {
                Platform::from_catalog_os(&entry.os).map(|os| Installer {
                    version: entry.version,
                    os,
                })
            })
            .collect();
        Ok(Self {
            slug: product.slug,
            installers,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ProductResponse {
    slug: String,
    dl_installer: Vec<InstallerEntry>,
}

#[derive(Debug, Deserialize)]
struct InstallerEntry {
    version: Option<String>,
    os: String,
}

/// HTTP client for the product catalog.
#[derive(Clone)]
pub struct CatalogClient {
    client: reqwest::Client,
    url_template: String,
    max_retries: usize,
}

impl CatalogClient {
    /// Construct a new client from configuration.
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|err| {
                GogchkError::Transport(format!("Failed to build HTTP client: {err}"))
            })?;

        Ok(Self {
            client,
            url_template: config.url_template.clone(),
            max_retries: config.max_retries.max(1),
        })
    }

    /// Product URL for `id`, percent-encoded into the template.
    pub fn product_url(&self, id: &str) -> String {
        let id = encode(id);
        if self.url_template.contains(ID_PLACEHOLDER) {
            self.url_template.replace(ID_PLACEHOLDER, &id)
        } else {
            format!("{}/{id}", self.url_template.trim_end_matches('/'))
        }
    }

    async fn fetch_once(&self, url: &str, id: &str) -> Result<CatalogRecord> {
        let response = self.client.get(url).send().await.map_err(|err| {
            GogchkError::Transport(format!("Catalog request to {url} failed: {err}"))
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(GogchkError::NotFound { id: id.to_string() });
        }
        if !status.is_success() {
            return Err(GogchkError::Transport(format!(
                "Catalog request {url} failed with status {status}"
            )));
        }

        let body = response.text().await.map_err(|err| {
            GogchkError::Transport(format!("Failed to read catalog response {url}: {err}"))
        })?;
        CatalogRecord::from_json(&body)
    }
}

impl Catalog for CatalogClient {
    async fn fetch_catalog(&self, id: &str) -> Result<CatalogRecord> {
        let url = self.product_url(id);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.fetch_once(&url, id).await {
                Err(err) if err.is_transient() && attempt < self.max_retries => {
                    sleep(backoff(attempt)).await;
                }
                outcome => return outcome,
            }
        }
    }
}

fn backoff(attempt: usize) -> Duration {
    let exponent = (attempt as u32).min(8);
    Duration::from_millis(200_u64.saturating_mul(1_u64 << exponent))
}
