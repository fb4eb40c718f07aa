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

//! CarbonWait core - delay recommendation for carbon-aware CI jobs
//!
//! The pipeline maps a runner location to a cloud region, pulls current and
//! forecasted carbon intensity for it, and works out how many minutes a job
//! should wait to run at the lowest-emission point inside a tolerance window.

pub mod advisor;
pub mod delay;
pub mod errors;
pub mod forecast;
pub mod regions;
pub mod runner;
pub mod traits;
pub mod types;

pub use advisor::{DelayAdvisor, Recommendation, RunNowReason};
pub use delay::compute_delay;
pub use errors::{AdvisorError, AdvisorResult, DataSourceError, RegionTableError};
pub use forecast::{ToleranceWindow, filter_within_tolerance, select_lowest};
pub use regions::{RegionId, RegionInfo, RegionTable};
pub use runner::RunnerOs;
pub use traits::{EmissionDataSource, GeoLocation, GeoLocator};
pub use types::{EmissionRating, ForecastSeries, InvalidRating};
