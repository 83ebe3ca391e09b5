//! HTTP client for the Tachi activity API
//!
//! Every response is wrapped in the backend's envelope:
//!
//! ```json
//! { "success": true, "description": "...", "body": { "records": [...], "users": [...] } }
//! ```
//!
//! Older pages are requested with `?startTime=<millis>`, returning only records
//! strictly older than that timestamp. Failures are surfaced to the caller
//! as-is; nothing here retries.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde::Deserialize;

use crate::clump::ClumpOptions;
use crate::config::ApiConfig;
use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::feed::ActivityFeed;
use crate::types::ActivityPage;

/// Which activity timeline to request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityScope {
    /// One user's activity on a game/playtype
    User {
        user: String,
        game: String,
        playtype: String,
    },
    /// Everyone's activity on a game/playtype
    Game { game: String, playtype: String },
}

impl ActivityScope {
    /// API path below `/api/v1`.
    pub fn path(&self) -> String {
        match self {
            ActivityScope::User {
                user,
                game,
                playtype,
            } => format!(
                "/users/{}/games/{}/{}/activity",
                urlencoding::encode(user),
                urlencoding::encode(game),
                urlencoding::encode(playtype)
            ),
            ActivityScope::Game { game, playtype } => format!(
                "/games/{}/{}/activity",
                urlencoding::encode(game),
                urlencoding::encode(playtype)
            ),
        }
    }
}

/// Response envelope used by every v1 endpoint.
#[derive(Debug, Deserialize)]
struct Envelope {
    success: bool,
    #[serde(default)]
    description: String,
    #[serde(default)]
    body: Option<ActivityPage>,
}

/// HTTP client for the activity endpoints
pub struct ActivityClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl ActivityClient {
    /// Create a new client from configuration
    pub fn new(config: &ApiConfig) -> Result<Self> {
        config.validate()?;

        let base_url = config.base_url.trim().trim_end_matches('/').to_string();

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = &config.token {
            let auth_value = format!("Bearer {}", token);
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&auth_value)
                    .map_err(|e| Error::Config(format!("invalid api token: {}", e)))?,
            );
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    /// Full URL for a scope, without the cursor.
    pub fn url_for(&self, scope: &ActivityScope) -> String {
        format!("{}/api/v1{}", self.base_url, scope.path())
    }

    /// Fetch one page of activity, optionally older than `cursor`.
    pub async fn fetch(
        &self,
        scope: &ActivityScope,
        cursor: Option<Cursor>,
    ) -> Result<ActivityPage> {
        let url = self.url_for(scope);

        tracing::debug!(url = %url, cursor = ?cursor.map(|c| c.as_millis()), "Fetching activity");

        let mut request = self.http_client.get(&url);
        if let Some(cursor) = cursor {
            request = request.query(&[("startTime", cursor.as_millis())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Http(format!("request to {} failed: {}", url, e)))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Http(format!("failed to read response: {}", e)))?;

        let page = decode_response(status, &text)?;

        tracing::info!(
            url = %url,
            records = page.records.len(),
            users = page.users.len(),
            "Fetched activity page"
        );

        Ok(page)
    }

    /// Fetch the newest page and start a feed from it.
    pub async fn first_page(
        &self,
        scope: &ActivityScope,
        options: ClumpOptions,
    ) -> Result<ActivityFeed> {
        let page = self.fetch(scope, None).await?;
        ActivityFeed::from_page(page, options)
    }

    /// Fetch the page after the feed's cursor and append it.
    ///
    /// Returns the number of clumps appended; zero means the feed is exhausted.
    pub async fn load_more(&self, scope: &ActivityScope, feed: &mut ActivityFeed) -> Result<usize> {
        let cursor = feed.cursor()?;
        let page = self.fetch(scope, Some(cursor)).await?;
        feed.extend(page)
    }
}

/// Turn a raw HTTP response into a page or a typed error.
fn decode_response(status: u16, text: &str) -> Result<ActivityPage> {
    let envelope: Envelope = match serde_json::from_str(text) {
        Ok(envelope) => envelope,
        Err(e) if (200..300).contains(&status) => {
            return Err(Error::Decode(format!("invalid activity response: {}", e)));
        }
        Err(_) => {
            return Err(Error::Api {
                status,
                description: text.trim().to_string(),
            });
        }
    };

    if !envelope.success || !(200..300).contains(&status) {
        return Err(Error::Api {
            status,
            description: envelope.description,
        });
    }

    envelope
        .body
        .ok_or_else(|| Error::Decode("activity response has no body".to_string()))
}
