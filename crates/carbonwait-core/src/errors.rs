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

//! Error types for the recommendation pipeline

use std::time::Duration;
use thiserror::Error;

/// Failure reported by an emission data source
///
/// Every variant is fatal for the current recommendation, but the kinds stay
/// separate so operators can tell "provider unreachable" from "provider sent
/// garbage".
#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: String,
        after: Duration,
    },

    #[error("provider returned error status {status}: {message}")]
    Http { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("failed to decode provider response: {0}")]
    Decode(String),

    #[error("invalid emission data: {0}")]
    InvalidData(String),

    #[error("no data for region: {0}")]
    NotFound(String),
}

#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("emission data unavailable: {0}")]
    DataSource(#[from] DataSourceError),

    #[error("forecast window is empty")]
    EmptyForecast,
}

impl From<crate::types::InvalidRating> for DataSourceError {
    fn from(err: crate::types::InvalidRating) -> Self {
        Self::InvalidData(err.to_string())
    }
}

pub type AdvisorResult<T> = Result<T, AdvisorError>;

#[derive(Debug, Error)]
pub enum RegionTableError {
    #[error("failed to read region table: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse region table: {0}")]
    Json(#[from] serde_json::Error),

    #[error("region table is empty")]
    Empty,
}
