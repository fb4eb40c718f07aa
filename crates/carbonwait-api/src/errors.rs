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

use carbonwait_core::DataSourceError;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CarbonApiError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Request to {url} timed out after {after:?}")]
    Timeout { url: String, after: Duration },

    #[error("Carbon API returned error status {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("No emissions data for location: {0}")]
    NoData(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid emissions data: {0}")]
    InvalidData(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type CarbonApiResult<T> = Result<T, CarbonApiError>;

impl From<CarbonApiError> for DataSourceError {
    fn from(err: CarbonApiError) -> Self {
        match err {
            CarbonApiError::Timeout { url, after } => Self::Timeout {
                operation: format!("GET {url}"),
                after,
            },
            CarbonApiError::ApiError { status, message } => Self::Http { status, message },
            CarbonApiError::NoData(location) => Self::NotFound(location),
            CarbonApiError::InvalidResponse(msg) => Self::Decode(msg),
            CarbonApiError::InvalidData(msg) => Self::InvalidData(msg),
            CarbonApiError::HttpError(e) => Self::Transport(e.to_string()),
            CarbonApiError::ConfigError(msg) => Self::Transport(msg),
        }
    }
}

/// Failure of the public IP geolocation lookup
#[derive(Debug, Error)]
pub enum GeoError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Geolocation request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Geolocation API returned error status {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Geolocation response has no region for IP {0}")]
    MissingRegion(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}
