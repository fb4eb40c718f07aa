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

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Step outputs file exported by GitHub Actions runners
pub fn github_output_path() -> Option<PathBuf> {
    std::env::var_os("GITHUB_OUTPUT")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Append `delay-minutes` and, when known, `region` to a step outputs file
pub fn append_outputs(path: &Path, delay_minutes: u32, region: Option<&str>) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "delay-minutes={delay_minutes}")?;
    if let Some(region) = region {
        writeln!(file, "region={region}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_outputs_with_region() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output");
        std::fs::write(&path, "previous=1\n").unwrap();

        append_outputs(&path, 30, Some("eastus")).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "previous=1\ndelay-minutes=30\nregion=eastus\n");
    }

    #[test]
    fn test_append_outputs_without_region() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output");

        append_outputs(&path, 0, None).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "delay-minutes=0\n");
    }
}
