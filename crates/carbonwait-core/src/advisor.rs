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

//! Delay recommendation pipeline
//!
//! resolve region -> fetch current -> fetch forecast -> filter window ->
//! select lowest -> compute delay. Stages run one after another; fetch
//! failures are fatal, everything else degrades to "run now".

use crate::delay::compute_delay;
use crate::errors::AdvisorResult;
use crate::forecast::{ToleranceWindow, filter_within_tolerance, select_lowest};
use crate::regions::{RegionId, RegionTable};
use crate::traits::EmissionDataSource;
use crate::types::EmissionRating;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Why no delay was recommended even though data was available
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunNowReason {
    /// Provider returned no forecast series at all
    NoForecast,
    /// No forecast point falls inside the tolerance window
    EmptyWindow,
    /// Nothing in the window beats the current intensity
    NoLowerEmission,
}

impl fmt::Display for RunNowReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NoForecast => "no forecast available",
            Self::EmptyWindow => "no forecast point inside the tolerance window",
            Self::NoLowerEmission => "current emissions are already the lowest in the window",
        };
        f.write_str(text)
    }
}

/// Outcome of one advisor run
#[derive(Debug, Clone, PartialEq)]
pub enum Recommendation {
    /// The location matched no region; the job should proceed without delay
    NoMatchingRegion { location: String },

    RunNow {
        region: RegionId,
        current: EmissionRating,
        reason: RunNowReason,
    },

    Delay {
        region: RegionId,
        current: EmissionRating,
        best: EmissionRating,
        minutes: u32,
    },
}

impl Recommendation {
    pub fn delay_minutes(&self) -> u32 {
        match self {
            Self::Delay { minutes, .. } => *minutes,
            Self::NoMatchingRegion { .. } | Self::RunNow { .. } => 0,
        }
    }

    pub fn region(&self) -> Option<&str> {
        match self {
            Self::NoMatchingRegion { .. } => None,
            Self::RunNow { region, .. } | Self::Delay { region, .. } => Some(region.as_str()),
        }
    }
}

/// Orchestrates region lookup, data fetches and the delay computation
pub struct DelayAdvisor {
    regions: RegionTable,
    source: Arc<dyn EmissionDataSource>,
}

impl fmt::Debug for DelayAdvisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelayAdvisor")
            .field("regions", &self.regions.len())
            .field("source", &self.source.name())
            .finish()
    }
}

impl DelayAdvisor {
    pub fn new(regions: RegionTable, source: Arc<dyn EmissionDataSource>) -> Self {
        Self { regions, source }
    }

    pub fn regions(&self) -> &RegionTable {
        &self.regions
    }

    /// Recommend how long to wait before running a job at `location`
    ///
    /// `now` anchors the tolerance window; pass `Utc::now()` in production
    /// and a fixed instant in tests.
    pub async fn recommend(
        &self,
        location: &str,
        tolerance_minutes: u32,
        now: DateTime<Utc>,
    ) -> AdvisorResult<Recommendation> {
        let Some(region) = self.regions.resolve_first(location) else {
            info!(
                "🌍 [ADVISOR] No region matches location '{}', skipping recommendation",
                location
            );
            return Ok(Recommendation::NoMatchingRegion {
                location: location.to_string(),
            });
        };
        info!("🌍 [ADVISOR] Matching region: {}", region);

        self.recommend_for_region(region, tolerance_minutes, now)
            .await
    }

    /// Same pipeline with the region already known
    pub async fn recommend_for_region(
        &self,
        region: RegionId,
        tolerance_minutes: u32,
        now: DateTime<Utc>,
    ) -> AdvisorResult<Recommendation> {
        debug!(
            "   Data source: {}, tolerance: {} min",
            self.source.name(),
            tolerance_minutes
        );

        let current = self.source.fetch_current(&region).await?;
        info!(
            "📊 [ADVISOR] Current emissions in {}: {:.2} at {}",
            region,
            current.value(),
            current.time().to_rfc3339()
        );

        let forecasts = self.source.fetch_forecast(&region).await?;
        let Some(forecast) = forecasts.into_iter().next() else {
            warn!("⚠️ [ADVISOR] No forecast returned for {}, running now", region);
            return Ok(Recommendation::RunNow {
                region,
                current,
                reason: RunNowReason::NoForecast,
            });
        };
        debug!(
            "   Forecast generated at {} with {} points",
            forecast.generated_at.to_rfc3339(),
            forecast.points.len()
        );

        let window = ToleranceWindow::new(now, tolerance_minutes);
        let in_window = filter_within_tolerance(&forecast.points, tolerance_minutes, now);
        info!(
            "🔍 [ADVISOR] {} of {} forecast points fall within {} - {}",
            in_window.len(),
            forecast.points.len(),
            window.start.to_rfc3339(),
            window.end.to_rfc3339()
        );

        if in_window.is_empty() {
            return Ok(Recommendation::RunNow {
                region,
                current,
                reason: RunNowReason::EmptyWindow,
            });
        }

        let best = select_lowest(&in_window)?;
        info!(
            "📉 [ADVISOR] Lowest forecast emissions: {:.2} at {}",
            best.value(),
            best.time().to_rfc3339()
        );

        if best.value() >= current.value() {
            info!("✅ [ADVISOR] No lower emissions expected, no delay recommended");
            return Ok(Recommendation::RunNow {
                region,
                current,
                reason: RunNowReason::NoLowerEmission,
            });
        }

        let minutes = compute_delay(&current, &best);
        info!("⏳ [ADVISOR] Recommended delay: {} minutes", minutes);
        Ok(Recommendation::Delay {
            region,
            current,
            best,
            minutes,
        })
    }
}
