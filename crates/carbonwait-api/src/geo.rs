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

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, error, info};

use crate::client::{RetryFailure, RetryPolicy, retry_request};
use crate::errors::GeoError;
use crate::types::IpInfoResponse;
use carbonwait_core::{GeoLocation, GeoLocator};

pub const DEFAULT_IPINFO_URL: &str = "https://ipinfo.io";

/// Looks up the public IP of this host and its administrative region
#[derive(Clone)]
pub struct IpInfoClient {
    base_url: String,
    token: Option<String>,
    client: Client,
    retry: RetryPolicy,
}

impl std::fmt::Debug for IpInfoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IpInfoClient")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl IpInfoClient {
    pub fn new(
        base_url: impl Into<String>,
        token: Option<String>,
        retry: RetryPolicy,
    ) -> Result<Self, GeoError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(GeoError::ConfigError(
                "Geolocation base URL is empty".to_string(),
            ));
        }

        let client = retry
            .build_client()
            .map_err(|e| GeoError::ConfigError(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url,
            token: token.filter(|t| !t.is_empty()),
            client,
            retry,
        })
    }

    pub async fn lookup(&self) -> Result<IpInfoResponse, GeoError> {
        let url = format!("{}/json", self.base_url);
        debug!("🔍 [GEO QUERY] {}", url);

        let (status, body) = retry_request(&self.retry, &url, || async {
            let mut request = self.client.get(&url);
            if let Some(token) = &self.token {
                request = request.query(&[("token", token)]);
            }
            let response = request.send().await?;
            let status = response.status();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        })
        .await
        .map_err(|failure| match failure {
            RetryFailure::Timeout(after) => GeoError::Timeout(after),
            RetryFailure::Transport(e) => GeoError::HttpError(e),
        })?;

        if status != StatusCode::OK {
            error!("❌ [GEO ERROR] Status {}: {}", status, body);
            return Err(GeoError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        serde_json::from_str(&body).map_err(|e| GeoError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl GeoLocator for IpInfoClient {
    type Error = GeoError;

    async fn locate(&self) -> Result<GeoLocation, GeoError> {
        let info = self.lookup().await?;
        let region = info
            .region
            .filter(|r| !r.is_empty())
            .ok_or_else(|| GeoError::MissingRegion(info.ip.clone()))?;

        info!("✅ [GEO RESULT] {} is in {}", info.ip, region);
        Ok(GeoLocation {
            ip: info.ip,
            region,
            city: info.city,
            country: info.country,
        })
    }

    fn name(&self) -> &str {
        "ipinfo.io"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;
    use std::time::Duration;

    fn policy() -> RetryPolicy {
        RetryPolicy {
            timeout: Duration::from_secs(5),
            max_attempts: 2,
            backoff: Duration::from_millis(10),
        }
    }

    #[tokio::test]
    async fn test_locate_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/json")
            .with_status(200)
            .with_body(
                json!({
                    "ip": "20.1.2.3",
                    "city": "Boydton",
                    "region": "Virginia",
                    "country": "US",
                    "loc": "36.6676,-78.3875"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = IpInfoClient::new(server.url(), None, policy()).unwrap();
        let location = client.locate().await.unwrap();

        assert_eq!(location.ip, "20.1.2.3");
        assert_eq!(location.region, "Virginia");
        assert_eq!(location.city.as_deref(), Some("Boydton"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_token_sent_as_query() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/json")
            .match_query(Matcher::UrlEncoded("token".into(), "abc".into()))
            .with_status(200)
            .with_body(json!({ "ip": "1.1.1.1", "region": "Texas" }).to_string())
            .create_async()
            .await;

        let client = IpInfoClient::new(server.url(), Some("abc".into()), policy()).unwrap();
        assert_eq!(client.locate().await.unwrap().region, "Texas");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_region() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/json")
            .with_status(200)
            .with_body(json!({ "ip": "10.0.0.1", "bogon": true }).to_string())
            .create_async()
            .await;

        let client = IpInfoClient::new(server.url(), None, policy()).unwrap();
        let result = client.locate().await;
        assert!(matches!(result, Err(GeoError::MissingRegion(ref ip)) if ip == "10.0.0.1"));
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/json")
            .with_status(429)
            .with_body("Too Many Requests")
            .create_async()
            .await;

        let client = IpInfoClient::new(server.url(), None, policy()).unwrap();
        let result = client.locate().await;
        assert!(matches!(result, Err(GeoError::ApiError { status: 429, .. })));
    }
}
