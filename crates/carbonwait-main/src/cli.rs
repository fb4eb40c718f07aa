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

//! CLI argument definitions using clap.

use crate::config::ActionConfig;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "carbonwait")]
#[command(author, version, about = "Delay a CI job until grid carbon intensity is lowest")]
#[command(
    long_about = "Looks up where the runner is, maps that to a cloud region, and prints how many\n\
    minutes to wait so the job starts at the lowest forecast carbon intensity within the\n\
    allowed delay.\n\
    \nInputs are read from (lowest to highest priority): carbonwait.toml / carbonwait.json,\n\
    INPUT_* / CARBONWAIT_* environment variables, and these flags.\n\
    \nExamples:\n  \
    carbonwait --delay-tolerance 120 --carbon-api-url http://localhost:5073\n  \
    carbonwait --location Virginia --delay-tolerance 60"
)]
pub struct Args {
    /// Maximum delay in minutes
    #[arg(long, value_name = "MINUTES")]
    pub delay_tolerance: Option<u32>,

    /// Carbon Aware SDK web API base URL
    #[arg(long, value_name = "URL")]
    pub carbon_api_url: Option<String>,

    /// Runner location (state or province name), skips IP geolocation
    #[arg(long)]
    pub location: Option<String>,

    /// JSON region table to use instead of the built-in Azure regions
    #[arg(long, value_name = "PATH")]
    pub regions_file: Option<PathBuf>,

    /// Config file (TOML, or JSON with a .json extension)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Flags are the highest-priority layer
    pub fn apply_to(&self, config: &mut ActionConfig) {
        if let Some(tolerance) = self.delay_tolerance {
            config.delay_tolerance_minutes = Some(tolerance);
        }
        if let Some(url) = &self.carbon_api_url {
            config.carbon_api_base_url.clone_from(url);
        }
        if let Some(location) = &self.location {
            config.location = Some(location.clone());
        }
        if let Some(path) = &self.regions_file {
            config.regions_file = Some(path.clone());
        }
    }
}
