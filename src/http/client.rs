use crate::rate_limiter::RateLimiter;
use anyhow::{Context, Result};
use reqwest::Client;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// HTTP client with built-in rate limiting
pub struct RateLimitedClient {
    client: Client,
    rate_limiter: RateLimiter,
}

impl RateLimitedClient {
    pub fn new(user_agent: &str, timeout_secs: u64, rate_limit_ms: u64) -> Result<Self> {
        let client = Self::build_client(user_agent, timeout_secs)?;
        let rate_limiter = RateLimiter::new(rate_limit_ms);

        Ok(Self {
            client,
            rate_limiter,
        })
    }

    /// GET with query parameters and extra headers, decoding a JSON body
    pub async fn get_json<T: DeserializeOwned>(
        &mut self,
        url: &str,
        query: &[(&str, String)],
        headers: HeaderMap,
    ) -> Result<T> {
        self.rate_limiter.wait().await;
        let response = self.send_get_request(url, query, headers).await?;

        if !response.status().is_success() {
            anyhow::bail!("API returned status: {}", response.status());
        }

        response
            .json::<T>()
            .await
            .context("Failed to decode JSON response")
    }

    fn build_client(user_agent: &str, timeout_secs: u64) -> Result<Client> {
        Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to build HTTP client")
    }

    async fn send_get_request(
        &self,
        url: &str,
        query: &[(&str, String)],
        headers: HeaderMap,
    ) -> Result<reqwest::Response> {
        self.client
            .get(url)
            .query(query)
            .headers(headers)
            .send()
            .await
            .context("Failed to send GET request")
    }
}
