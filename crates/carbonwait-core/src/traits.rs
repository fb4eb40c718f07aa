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

use crate::errors::DataSourceError;
use crate::types::{EmissionRating, ForecastSeries};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ============= Data Source Traits =============

/// Carbon intensity provider
/// The advisor only talks to this trait, never to HTTP directly
#[async_trait]
pub trait EmissionDataSource: Send + Sync {
    /// Best (most recent) current reading for a region
    async fn fetch_current(&self, region: &str) -> Result<EmissionRating, DataSourceError>;

    /// Forecast runs for a region; the advisor uses the first one
    async fn fetch_forecast(&self, region: &str) -> Result<Vec<ForecastSeries>, DataSourceError>;

    /// Data source name (for logging)
    fn name(&self) -> &str;
}

/// Where the runner machine appears to be, according to its public IP
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub ip: String,

    /// Subdivision name, fed into the region resolver
    pub region: String,

    #[serde(default)]
    pub city: Option<String>,

    #[serde(default)]
    pub country: Option<String>,
}

/// Public IP geolocation provider
#[async_trait]
pub trait GeoLocator: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn locate(&self) -> Result<GeoLocation, Self::Error>;

    fn name(&self) -> &str;
}
