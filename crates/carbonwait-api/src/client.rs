// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of CarbonWait.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

use crate::errors::{CarbonApiError, CarbonApiResult};
use crate::types::{EmissionsData, EmissionsForecast};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Timeout and retry settings shared by every outbound request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Per-attempt timeout covering connect, headers and body
    pub timeout: Duration,
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Delay before the second attempt, doubled afterwards
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_attempts: 2,
            backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    pub(crate) fn build_client(&self) -> Result<Client, reqwest::Error> {
        Client::builder().timeout(self.timeout).build()
    }
}

/// Runs `request_fn` until it succeeds or the attempt budget is spent.
///
/// Only transport failures and timeouts reach this loop; HTTP status codes
/// are inspected by the caller afterwards and are never retried.
pub(crate) async fn retry_request<T, F, Fut>(
    policy: &RetryPolicy,
    url: &str,
    mut request_fn: F,
) -> Result<T, RetryFailure>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, reqwest::Error>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempts = 0;
    let mut delay = policy.backoff;

    loop {
        attempts += 1;
        match request_fn().await {
            Ok(value) => return Ok(value),
            Err(e) if attempts >= max_attempts => {
                error!(
                    "Request to {} failed after {} attempts: {}",
                    url, attempts, e
                );
                return Err(if e.is_timeout() {
                    RetryFailure::Timeout(policy.timeout)
                } else {
                    RetryFailure::Transport(e)
                });
            }
            Err(e) => {
                warn!(
                    "Request to {} failed (attempt {}/{}): {}. Retrying in {:?}",
                    url, attempts, max_attempts, e, delay
                );
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
        }
    }
}

/// Terminal outcome of [`retry_request`]
#[derive(Debug)]
pub(crate) enum RetryFailure {
    Timeout(Duration),
    Transport(reqwest::Error),
}

/// Client for the Carbon Aware SDK web API
#[derive(Clone)]
pub struct CarbonAwareClient {
    base_url: String,
    token: Option<String>,
    client: Client,
    retry: RetryPolicy,
}

impl std::fmt::Debug for CarbonAwareClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CarbonAwareClient")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl CarbonAwareClient {
    /// Create a client with the default retry policy
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> CarbonApiResult<Self> {
        Self::with_retry_policy(base_url, token, RetryPolicy::default())
    }

    pub fn with_retry_policy(
        base_url: impl Into<String>,
        token: Option<String>,
        retry: RetryPolicy,
    ) -> CarbonApiResult<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(CarbonApiError::ConfigError(
                "Carbon API base URL is empty".to_string(),
            ));
        }

        let client = retry.build_client().map_err(|e| {
            CarbonApiError::ConfigError(format!("Failed to build HTTP client: {e}"))
        })?;

        info!("Initializing carbon aware client: {}", base_url);
        Ok(Self {
            base_url,
            token: token.filter(|t| !t.is_empty()),
            client,
            retry,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Current (latest observed) emissions for a location.
    ///
    /// `GET {base}/emissions/bylocations/best?location=<region>`
    pub async fn get_best_emissions(&self, location: &str) -> CarbonApiResult<Vec<EmissionsData>> {
        let url = format!("{}/emissions/bylocations/best", self.base_url);
        debug!("🔍 [CARBON QUERY] Current emissions for: {}", location);

        let data: Vec<EmissionsData> = self.get_json(&url, location).await?;
        debug!(
            "✅ [CARBON RESULT] {} current emission record(s) for {}",
            data.len(),
            location
        );
        Ok(data)
    }

    /// Current forecast runs for a location.
    ///
    /// `GET {base}/emissions/forecasts/current?location=<region>`
    pub async fn get_current_forecast(
        &self,
        location: &str,
    ) -> CarbonApiResult<Vec<EmissionsForecast>> {
        let url = format!("{}/emissions/forecasts/current", self.base_url);
        debug!("🔍 [CARBON QUERY] Forecast for: {}", location);

        let data: Vec<EmissionsForecast> = self.get_json(&url, location).await?;
        debug!(
            "✅ [CARBON RESULT] {} forecast series for {}",
            data.len(),
            location
        );
        Ok(data)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, location: &str) -> CarbonApiResult<T> {
        let (status, body) = retry_request(&self.retry, url, || async {
            let response = self
                .authorized(self.client.get(url).query(&[("location", location)]))
                .send()
                .await?;
            let status = response.status();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        })
        .await
        .map_err(|failure| match failure {
            RetryFailure::Timeout(after) => CarbonApiError::Timeout {
                url: url.to_string(),
                after,
            },
            RetryFailure::Transport(e) => CarbonApiError::HttpError(e),
        })?;

        match status {
            StatusCode::OK => serde_json::from_str(&body).map_err(|e| {
                error!("❌ [CARBON ERROR] Undecodable response from {}: {}", url, e);
                CarbonApiError::InvalidResponse(e.to_string())
            }),
            StatusCode::NOT_FOUND | StatusCode::NO_CONTENT => {
                error!("❌ [CARBON ERROR] No data for location: {}", location);
                Err(CarbonApiError::NoData(location.to_string()))
            }
            status => {
                error!("❌ [CARBON ERROR] Status {}: {}", status, body);
                Err(CarbonApiError::ApiError {
                    status: status.as_u16(),
                    message: body,
                })
            }
        }
    }
}
