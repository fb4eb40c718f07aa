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
use carbonwait_core::{EmissionRating, ForecastSeries};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Single emissions reading as returned by the carbon aware API
/// (`/emissions/bylocations/best` items and `forecastData` entries)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmissionsData {
    #[serde(default)]
    pub location: Option<String>,

    #[serde(alias = "timestamp")]
    pub time: String,

    #[serde(alias = "value")]
    pub rating: f64,

    #[serde(default)]
    pub duration: Option<serde_json::Value>,
}

/// Forecast run from `/emissions/forecasts/current`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmissionsForecast {
    pub generated_at: String,

    #[serde(default)]
    pub location: Option<String>,

    #[serde(default)]
    pub data_start_at: Option<String>,

    #[serde(default)]
    pub data_end_at: Option<String>,

    #[serde(default)]
    pub window_size: Option<u32>,

    #[serde(default)]
    pub optimal_data_points: Vec<EmissionsData>,

    #[serde(default)]
    pub forecast_data: Vec<EmissionsData>,
}

/// Response of `GET https://ipinfo.io/json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpInfoResponse {
    pub ip: String,

    #[serde(default)]
    pub region: Option<String>,

    #[serde(default)]
    pub city: Option<String>,

    #[serde(default)]
    pub country: Option<String>,

    #[serde(default)]
    pub loc: Option<String>,
}

pub(crate) fn parse_timestamp(raw: &str) -> CarbonApiResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| CarbonApiError::InvalidData(format!("invalid timestamp '{raw}': {e}")))
}

impl EmissionsData {
    pub fn to_rating(&self) -> CarbonApiResult<EmissionRating> {
        let time = parse_timestamp(&self.time)?;
        EmissionRating::new(self.rating, time)
            .map_err(|e| CarbonApiError::InvalidData(format!("{e} at {}", self.time)))
    }
}

impl EmissionsForecast {
    pub fn to_series(&self) -> CarbonApiResult<ForecastSeries> {
        let generated_at = parse_timestamp(&self.generated_at)?;
        let points = self
            .forecast_data
            .iter()
            .map(EmissionsData::to_rating)
            .collect::<CarbonApiResult<Vec<_>>>()?;
        Ok(ForecastSeries::new(generated_at, points))
    }
}
