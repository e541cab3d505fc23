//! HTTP client for the Open Brewery DB breweries endpoint

use super::PageSource;
use crate::breweries::Record;
use crate::config::FetchConfig;
use crate::error::{EtlError, Result};

use eyre::Context;
use reqwest::Client;
use serde_json::Value;
use url::Url;

/// Client for `GET /v1/breweries?page=N&per_page=M`
///
/// Every request carries the configured `User-Agent` and is bounded by the
/// configured timeout.
///
/// # Example
/// ```no_run
/// use brewery_etl::client::{OpenBreweryClient, PageSource};
/// use brewery_etl::config::FetchConfig;
///
/// # async fn example() -> eyre::Result<()> {
/// let client = OpenBreweryClient::try_new(&FetchConfig::default())?;
/// let first_page = client.fetch_page(1, 50).await?;
/// println!("{} breweries on page 1", first_page.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct OpenBreweryClient {
    client: Client,
    url: Url,
}

impl OpenBreweryClient {
    /// Build a client from the fetch configuration
    ///
    /// # Errors
    /// Returns an error if the base URL does not parse or the HTTP client
    /// cannot be built
    pub fn try_new(config: &FetchConfig) -> eyre::Result<Self> {
        let url = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid base URL: {}", config.base_url))?;

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(reqwest::header::USER_AGENT, config.user_agent.parse()?);
        headers.insert(reqwest::header::ACCEPT, "application/json".parse()?);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    async fn get_page(&self, page: u32, per_page: u32) -> Result<Vec<Record>> {
        log::debug!("GET {} page={} per_page={}", self.url, page, per_page);

        let response = self
            .client
            .get(self.url.clone())
            .query(&[("page", page), ("per_page", per_page)])
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|source| EtlError::Transport {
                url: self.url.to_string(),
                source,
            })?;

        let body: Value = response.json().await.map_err(|source| {
            if source.is_decode() {
                EtlError::Shape(format!("response body is not valid JSON: {}", source))
            } else {
                EtlError::Transport {
                    url: self.url.to_string(),
                    source,
                }
            }
        })?;

        parse_page(body)
    }
}

impl PageSource for OpenBreweryClient {
    async fn fetch_page(&self, page: u32, per_page: u32) -> Result<Vec<Record>> {
        self.get_page(page, per_page).await
    }
}

impl std::fmt::Display for OpenBreweryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.url)
    }
}

/// Check that a response body is a list of objects and unwrap it
pub(crate) fn parse_page(body: Value) -> Result<Vec<Record>> {
    match body {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(record) => Ok(record),
                other => Err(EtlError::Shape(format!(
                    "expected list elements to be objects, element {} is {}",
                    index,
                    json_kind(&other)
                ))),
            })
            .collect(),
        other => Err(EtlError::Shape(format!(
            "expected a list, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
