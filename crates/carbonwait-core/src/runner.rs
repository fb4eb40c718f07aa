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

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Operating system of the CI runner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunnerOs {
    Linux,
    MacOs,
    Windows,
}

impl RunnerOs {
    /// Map a platform name (`std::env::consts::OS` or Node-style) to a runner OS
    pub fn from_platform(platform: &str) -> Option<Self> {
        match platform {
            "linux" => Some(Self::Linux),
            "macos" | "darwin" => Some(Self::MacOs),
            "windows" | "win32" => Some(Self::Windows),
            _ => None,
        }
    }

    /// OS this binary runs on; unknown platforms are logged and skipped
    pub fn detect() -> Option<Self> {
        let platform = std::env::consts::OS;
        let os = Self::from_platform(platform);
        if os.is_none() {
            warn!(
                "Unable to determine the OS of the runner ({}), the workflow will continue.",
                platform
            );
        }
        os
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::MacOs => "macos",
            Self::Windows => "windows",
        }
    }
}

impl fmt::Display for RunnerOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
