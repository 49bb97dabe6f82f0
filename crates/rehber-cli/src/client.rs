//! Async HTTP client wrapping the rehber JSON/CSV API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use rehber_core::contact::Contact;
use rehber_import::ImportSummary;
use reqwest::Client;

/// Connection settings for the rehber API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
}

/// Async HTTP client for the rehber REST API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.config.base_url.trim_end_matches('/'), path)
  }

  // ── Contacts ──────────────────────────────────────────────────────────────

  /// `GET /api/contacts[?text=...]`
  pub async fn list_contacts(&self, text: Option<&str>) -> Result<Vec<Contact>> {
    let mut req = self.client.get(self.url("/contacts"));
    if let Some(text) = text {
      req = req.query(&[("text", text)]);
    }

    let resp = req.send().await.context("GET /contacts failed")?;
    if !resp.status().is_success() {
      return Err(anyhow!("GET /contacts → {}", resp.status()));
    }
    resp.json().await.context("deserialising contacts")
  }

  // ── Import / export ───────────────────────────────────────────────────────

  /// `POST /api/import` with the CSV file contents as the body.
  ///
  /// A 400 carries a JSON error envelope (parse failure or
  /// `no_valid_records`); it is surfaced verbatim.
  pub async fn import_csv(&self, body: String) -> Result<ImportSummary> {
    let resp = self
      .client
      .post(self.url("/import"))
      .header(reqwest::header::CONTENT_TYPE, "text/csv; charset=utf-8")
      .body(body)
      .send()
      .await
      .context("POST /import failed")?;

    let status = resp.status();
    if !status.is_success() {
      let detail = resp.text().await.unwrap_or_default();
      return Err(anyhow!("POST /import → {status}: {detail}"));
    }
    resp.json().await.context("deserialising import summary")
  }

  /// `GET /api/export?format=csv|json` — returns the raw payload.
  pub async fn export(&self, format: &str) -> Result<String> {
    let resp = self
      .client
      .get(self.url("/export"))
      .query(&[("format", format)])
      .send()
      .await
      .context("GET /export failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("GET /export → {}", resp.status()));
    }
    resp.text().await.context("reading export payload")
  }
}
