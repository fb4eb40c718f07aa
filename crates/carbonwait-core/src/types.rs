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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Carbon intensity at a point in time (e.g. gCO2/kWh)
///
/// Used both for the current reading and for individual forecast points.
/// Only obtainable through [`EmissionRating::new`] or validated deserialization,
/// so the value is always finite and non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRating")]
pub struct EmissionRating {
    value: f64,
    time: DateTime<Utc>,
}

/// Unchecked wire shape of [`EmissionRating`]
#[derive(Deserialize)]
struct RawRating {
    value: f64,
    time: DateTime<Utc>,
}

impl TryFrom<RawRating> for EmissionRating {
    type Error = InvalidRating;

    fn try_from(raw: RawRating) -> Result<Self, Self::Error> {
        Self::new(raw.value, raw.time)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("emission value must be finite and non-negative, got {0}")]
pub struct InvalidRating(pub f64);

impl EmissionRating {
    /// Build a rating, rejecting NaN, infinities and negative values
    pub fn new(value: f64, time: DateTime<Utc>) -> Result<Self, InvalidRating> {
        if !value.is_finite() || value < 0.0 {
            return Err(InvalidRating(value));
        }
        Ok(Self { value, time })
    }

    /// Intensity value
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Instant this rating applies to
    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }
}

/// One forecast run for a single region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    /// When the provider generated this forecast
    pub generated_at: DateTime<Utc>,

    /// Forecast points in provider order
    pub points: Vec<EmissionRating>,
}

impl ForecastSeries {
    pub fn new(generated_at: DateTime<Utc>, points: Vec<EmissionRating>) -> Self {
        Self {
            generated_at,
            points,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
