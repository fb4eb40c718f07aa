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

//! Static lookup from a runner location to cloud regions

use crate::errors::RegionTableError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// Cloud infrastructure region identifier (e.g. "eastus")
pub type RegionId = String;

const BUILTIN_REGIONS: &str = include_str!("../data/azure-regions.json");

/// Descriptive attributes of a region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionInfo {
    #[serde(default)]
    pub display_name: Option<String>,

    /// Political subdivision the region sits in; this is the match key
    pub state: String,

    #[serde(default)]
    pub country: Option<String>,

    #[serde(default)]
    pub latitude: Option<f64>,

    #[serde(default)]
    pub longitude: Option<f64>,
}

impl RegionInfo {
    pub fn in_state(state: impl Into<String>) -> Self {
        Self {
            display_name: None,
            state: state.into(),
            country: None,
            latitude: None,
            longitude: None,
        }
    }
}

/// Immutable region table, iterated in source document order
#[derive(Debug, Clone, PartialEq)]
pub struct RegionTable {
    regions: IndexMap<RegionId, RegionInfo>,
}

impl RegionTable {
    /// Parse a JSON object keyed by region id
    pub fn from_json(json: &str) -> Result<Self, RegionTableError> {
        let regions: IndexMap<RegionId, RegionInfo> = serde_json::from_str(json)?;
        if regions.is_empty() {
            return Err(RegionTableError::Empty);
        }
        debug!("Loaded region table with {} regions", regions.len());
        Ok(Self { regions })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RegionTableError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Azure region table shipped with the binary
    pub fn builtin() -> Result<Self, RegionTableError> {
        Self::from_json(BUILTIN_REGIONS)
    }

    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, RegionInfo)>,
        K: Into<RegionId>,
    {
        Self {
            regions: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn get(&self, region: &str) -> Option<&RegionInfo> {
        self.regions.get(region)
    }

    /// All regions whose `state` equals `location` exactly, in table order
    pub fn resolve(&self, location: &str) -> Vec<RegionId> {
        self.regions
            .iter()
            .filter(|(_, info)| info.state == location)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Canonical region for `location`: the first match in table order
    ///
    /// Several regions can share a subdivision (two Azure datacenters in
    /// Virginia, for instance) and IP geolocation is not precise enough to
    /// tell them apart, so the others are only logged.
    pub fn resolve_first(&self, location: &str) -> Option<RegionId> {
        let mut matches = self.resolve(location).into_iter();
        let first = matches.next()?;
        let ignored: Vec<RegionId> = matches.collect();
        if !ignored.is_empty() {
            warn!(
                "⚠️ [REGIONS] '{}' matches several regions, using '{}' and ignoring {:?}",
                location, first, ignored
            );
        }
        Some(first)
    }
}
