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

//! CarbonWait - CI step entry point
//!
//! Prints the number of minutes the job should wait so it starts at the
//! lowest forecast carbon intensity within the configured tolerance.

use anyhow::Context;
use carbonwait_api::{CarbonAwareAdapter, CarbonAwareClient, IpInfoClient};
use carbonwait_core::{DelayAdvisor, GeoLocator, Recommendation, RegionTable, RunnerOs};
use carbonwait_main::output::{append_outputs, github_output_path};
use carbonwait_main::{ActionConfig, Args};
use chrono::Utc;
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config =
        ActionConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    args.apply_to(&mut config);

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str())),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install tracing subscriber")?;

    config.validate().context("Invalid configuration")?;
    let tolerance = config.delay_tolerance()?;
    info!(
        "🚀 Starting CarbonWait: tolerance={}min, carbon API={}",
        tolerance, config.carbon_api_base_url
    );

    if let Some(os) = RunnerOs::detect() {
        info!("Runner OS: {}", os);
    }

    let regions = match &config.regions_file {
        Some(path) => RegionTable::from_file(path)
            .with_context(|| format!("Failed to load region table from {}", path.display()))?,
        None => RegionTable::builtin().context("Failed to load built-in region table")?,
    };
    info!("Loaded {} regions", regions.len());

    let retry = config.retry_policy();

    let location = match &config.location {
        Some(location) => {
            info!("Using configured runner location: {}", location);
            Some(location.clone())
        }
        None => {
            let locator =
                IpInfoClient::new(&config.ipinfo_base_url, config.ipinfo_token.clone(), retry)
                    .context("Failed to create geolocation client")?;
            match locator.locate().await {
                Ok(geo) => {
                    info!("Runner IP: {}", geo.ip);
                    info!("Runner IP location: {}", geo.region);
                    Some(geo.region)
                }
                Err(e) => {
                    warn!(
                        "⚠️ Unable to determine runner location via {}: {}. The workflow will continue without delay.",
                        locator.name(),
                        e
                    );
                    None
                }
            }
        }
    };

    let recommendation = match location {
        Some(location) => {
            let client = CarbonAwareClient::with_retry_policy(
                config.carbon_api_base_url.as_str(),
                config.auth_token.clone(),
                retry,
            )
            .context("Failed to create carbon API client")?;
            let source = Arc::new(CarbonAwareAdapter::new(Arc::new(client)));
            let advisor = DelayAdvisor::new(regions, source);

            Some(
                advisor
                    .recommend(&location, tolerance, Utc::now())
                    .await
                    .context("Failed to compute delay")?,
            )
        }
        None => None,
    };

    let minutes = recommendation
        .as_ref()
        .map_or(0, Recommendation::delay_minutes);
    let region = recommendation.as_ref().and_then(Recommendation::region);

    match &recommendation {
        Some(Recommendation::Delay { best, .. }) => {
            info!(
                "✅ Delay the job by {} minutes (lowest emissions at {})",
                minutes, best.time()
            );
        }
        Some(_) => info!("✅ No delay needed, run now"),
        None => info!("✅ No recommendation available, run now"),
    }

    if let Some(path) = github_output_path() {
        append_outputs(&path, minutes, region)
            .with_context(|| format!("Failed to write step outputs to {}", path.display()))?;
    }

    println!("{minutes}");
    Ok(())
}
