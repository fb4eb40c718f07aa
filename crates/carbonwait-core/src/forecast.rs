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

//! Forecast windowing and optimal point selection

use crate::errors::{AdvisorError, AdvisorResult};
use crate::types::EmissionRating;
use chrono::{DateTime, Duration, Utc};

/// Closed interval `[start, end]` a job may be shifted into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToleranceWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ToleranceWindow {
    pub fn new(now: DateTime<Utc>, tolerance_minutes: u32) -> Self {
        Self {
            start: now,
            end: now + Duration::minutes(i64::from(tolerance_minutes)),
        }
    }

    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        time >= self.start && time <= self.end
    }
}

/// Keep the forecast points that fall inside `[now, now + tolerance]`
///
/// Past points are dropped even when the provider still returns them.
/// Input order is preserved.
pub fn filter_within_tolerance(
    series: &[EmissionRating],
    tolerance_minutes: u32,
    now: DateTime<Utc>,
) -> Vec<EmissionRating> {
    let window = ToleranceWindow::new(now, tolerance_minutes);
    series
        .iter()
        .filter(|point| window.contains(point.time()))
        .copied()
        .collect()
}

/// Lowest-emission point; the leftmost one wins on ties
pub fn select_lowest(series: &[EmissionRating]) -> AdvisorResult<EmissionRating> {
    let mut iter = series.iter();
    let mut best = *iter.next().ok_or(AdvisorError::EmptyForecast)?;
    for point in iter {
        if point.value() < best.value() {
            best = *point;
        }
    }
    Ok(best)
}
