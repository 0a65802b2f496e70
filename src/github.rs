//! GitHub users search client.
//!
//! Reference [`SearchClient`] implementation over the GitHub search API.
//! Non-2xx responses carry a JSON body with a `message` field when the
//! server wants the user to see something (typically rate limiting); that
//! message is propagated verbatim.

use crate::client::SearchClient;
use crate::error::SearchError;
use crate::types::{Item, ResultPage};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// [`SearchClient`] backed by `GET /search/users`.
pub struct GitHubSearchClient {
    http: reqwest::Client,
    base_url: String,
}

impl GitHubSearchClient {
    pub fn new() -> Result<Self> {
        // GitHub rejects requests without a User-Agent
        let http = reqwest::Client::builder()
            .user_agent(concat!("seeker/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point the client at a different host (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl SearchClient for GitHubSearchClient {
    async fn fetch_page(
        &self,
        query: &str,
        page: u32,
        page_size: u32,
    ) -> Result<ResultPage, SearchError> {
        // Empty query short-circuits to an empty result, not an error
        if query.is_empty() {
            return Ok(ResultPage {
                items: Vec::new(),
                total_count: 0,
            });
        }

        let url = format!("{}/search/users", self.base_url);
        let page = page.to_string();
        let page_size = page_size.to_string();
        let response = self
            .http
            .get(&url)
            .query(&[
                ("q", query),
                ("page", page.as_str()),
                ("per_page", page_size.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SearchError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| SearchError::Network(e.to_string()))?;

        decode_response(status, &body)
    }
}

/// Classify a raw HTTP response into a page or a [`SearchError`].
fn decode_response(status: StatusCode, body: &[u8]) -> Result<ResultPage, SearchError> {
    if !status.is_success() {
        // Prefer the server-supplied message when the error body decodes
        return Err(match serde_json::from_slice::<ApiErrorBody>(body) {
            Ok(error_body) => SearchError::RateLimited(error_body.message),
            Err(_) => SearchError::InvalidResponse,
        });
    }

    let decoded: SearchResponseBody =
        serde_json::from_slice(body).map_err(|e| SearchError::Decode(e.to_string()))?;
    Ok(decoded.into())
}

#[derive(Debug, Deserialize)]
struct SearchResponseBody {
    total_count: u64,
    items: Vec<UserBody>,
}

#[derive(Debug, Deserialize)]
struct UserBody {
    id: u64,
    login: String,
    avatar_url: String,
}

impl From<SearchResponseBody> for ResultPage {
    fn from(body: SearchResponseBody) -> Self {
        ResultPage {
            total_count: body.total_count,
            items: body
                .items
                .into_iter()
                .map(|user| Item {
                    id: user.id,
                    display_name: user.login,
                    image_ref: user.avatar_url,
                    liked: false,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}
