// Thin Reddit HTTP client.
//
// Two modes:
// - public: unauthenticated JSON listings on www.reddit.com
// - app-only OAuth: a client-credentials bearer token against oauth.reddit.com
//
// Reddit rejects requests without a descriptive User-Agent, so one is always
// set. Requests go through the rate limiter; there are no retries.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

use super::rate_limiter::RateLimiter;
use crate::config::Config;

pub const PUBLIC_BASE_URL: &str = "https://www.reddit.com";
pub const OAUTH_BASE_URL: &str = "https://oauth.reddit.com";
pub const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";

pub struct RedditClient {
    client: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
    rate_limiter: RateLimiter,
}

impl RedditClient {
    /// Unauthenticated client for the public JSON endpoints.
    pub fn public(base_url: &str, user_agent: &str, requests_per_second: f64) -> Result<Self> {
        Ok(Self {
            client: build_http_client(user_agent)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: None,
            rate_limiter: RateLimiter::new(requests_per_second)?,
        })
    }

    /// Obtain an app-only token with the client-credentials grant.
    pub async fn authenticated(
        client_id: &str,
        client_secret: &str,
        user_agent: &str,
        requests_per_second: f64,
    ) -> Result<Self> {
        let client = build_http_client(user_agent)?;

        let response = client
            .post(TOKEN_URL)
            .basic_auth(client_id, Some(client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .context("Failed to request a Reddit access token")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Reddit token endpoint returned {status}: {body}");
        }

        let token: TokenResponse = response
            .json()
            .await
            .context("Failed to parse Reddit token response")?;

        info!(expires_in = token.expires_in, "Authenticated with Reddit (app-only)");

        Ok(Self {
            client,
            base_url: OAUTH_BASE_URL.to_string(),
            access_token: Some(token.access_token),
            rate_limiter: RateLimiter::new(requests_per_second)?,
        })
    }

    /// Pick the mode from configuration: OAuth when credentials are set.
    pub async fn from_config(config: &Config) -> Result<Self> {
        if config.has_reddit_credentials() {
            Self::authenticated(
                &config.reddit_client_id,
                &config.reddit_client_secret,
                &config.reddit_user_agent,
                config.reddit_requests_per_second,
            )
            .await
        } else {
            Self::public(
                PUBLIC_BASE_URL,
                &config.reddit_user_agent,
                config.reddit_requests_per_second,
            )
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// GET a path relative to the base URL and deserialize the JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        self.rate_limiter.acquire().await;

        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "Reddit GET");

        let mut request = self.client.get(&url).query(params).query(&[("raw_json", "1")]);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Request failed: {path}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Reddit {path} returned {status}: {body}");
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to deserialize {path} response"))
    }
}

fn build_http_client(user_agent: &str) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .build()
        .context("Failed to build HTTP client")
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: u64,
}
