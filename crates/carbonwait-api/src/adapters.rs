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
use std::sync::Arc;
use tracing::{debug, info};

use crate::client::CarbonAwareClient;
use crate::errors::CarbonApiError;
use carbonwait_core::{DataSourceError, EmissionDataSource, EmissionRating, ForecastSeries};

/// Carbon Aware SDK adapter implementing EmissionDataSource
#[derive(Debug)]
pub struct CarbonAwareAdapter {
    client: Arc<CarbonAwareClient>,
}

impl CarbonAwareAdapter {
    pub fn new(client: Arc<CarbonAwareClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<CarbonAwareClient> {
        &self.client
    }
}

#[async_trait]
impl EmissionDataSource for CarbonAwareAdapter {
    async fn fetch_current(&self, region: &str) -> Result<EmissionRating, DataSourceError> {
        info!("🌍 [ADAPTER] Fetching current emissions for: {}", region);

        let records = self.client.get_best_emissions(region).await?;
        let first = records
            .first()
            .ok_or_else(|| CarbonApiError::NoData(region.to_string()))?;

        if records.len() > 1 {
            debug!(
                "   {} records returned, using the first ({})",
                records.len(),
                first.time
            );
        }

        let rating = first.to_rating()?;
        info!(
            "✅ [ADAPTER] {} current rating {:.2} at {}",
            region, rating.value(), rating.time()
        );
        Ok(rating)
    }

    async fn fetch_forecast(&self, region: &str) -> Result<Vec<ForecastSeries>, DataSourceError> {
        info!("📈 [ADAPTER] Fetching emissions forecast for: {}", region);

        let forecasts = self.client.get_current_forecast(region).await?;
        let series = forecasts
            .iter()
            .map(|f| f.to_series())
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            "✅ [ADAPTER] {} forecast series, {} points in first",
            series.len(),
            series.first().map_or(0, |s| s.points.len())
        );
        Ok(series)
    }

    fn name(&self) -> &str {
        "Carbon Aware SDK"
    }
}
