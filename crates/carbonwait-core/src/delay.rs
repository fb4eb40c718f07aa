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

use crate::types::EmissionRating;

const MILLIS_PER_MINUTE: i64 = 60_000;
const HALF_MINUTE_MILLIS: i64 = 30_000;

/// Minutes to wait for `best`, or 0 when it is not strictly cleaner than `current`
///
/// The gap is taken in milliseconds between the two timestamps and rounded
/// half-up to whole minutes. A best point that lies before the current
/// reading yields 0.
pub fn compute_delay(current: &EmissionRating, best: &EmissionRating) -> u32 {
    if best.value() >= current.value() {
        return 0;
    }

    let millis = (best.time() - current.time()).num_milliseconds();
    if millis <= 0 {
        return 0;
    }

    let minutes = (millis + HALF_MINUTE_MILLIS).div_euclid(MILLIS_PER_MINUTE);
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};

    fn rating(value: f64, time: &str) -> EmissionRating {
        let time = DateTime::parse_from_rfc3339(time)
            .unwrap()
            .with_timezone(&Utc);
        EmissionRating::new(value, time).unwrap()
    }

    #[test]
    fn test_lower_forecast_gives_minute_gap() {
        let current = rating(500.0, "2024-01-01T00:00:00Z");
        let best = rating(300.0, "2024-01-01T00:30:00Z");
        assert_eq!(compute_delay(&current, &best), 30);
    }

    #[test]
    fn test_higher_forecast_gives_zero() {
        let current = rating(200.0, "2024-01-01T00:00:00Z");
        let best = rating(250.0, "2024-01-01T00:30:00Z");
        assert_eq!(compute_delay(&current, &best), 0);
    }

    #[test]
    fn test_equal_forecast_gives_zero() {
        let current = rating(200.0, "2024-01-01T00:00:00Z");
        let best = rating(200.0, "2024-01-01T02:00:00Z");
        assert_eq!(compute_delay(&current, &best), 0);
    }

    #[test]
    fn test_rounds_half_up() {
        let current = rating(500.0, "2024-01-01T00:00:00Z");

        let just_under = rating(100.0, "2024-01-01T00:10:29.999Z");
        assert_eq!(compute_delay(&current, &just_under), 10);

        let half = rating(100.0, "2024-01-01T00:10:30Z");
        assert_eq!(compute_delay(&current, &half), 11);
    }

    #[test]
    fn test_mixed_offsets_are_normalized() {
        let current = rating(500.0, "2024-01-01T00:00:00Z");
        let best = rating(300.0, "2024-01-01T01:45:00+01:00");
        assert_eq!(compute_delay(&current, &best), 45);
    }

    #[test]
    fn test_best_before_current_clamps_to_zero() {
        let current = rating(500.0, "2024-01-01T00:10:00Z");
        let best = rating(300.0, "2024-01-01T00:00:00Z");
        assert_eq!(compute_delay(&current, &best), 0);
    }

    #[test]
    fn test_zero_whenever_best_not_lower() {
        let now = Utc::now();
        for (current_value, best_value) in [(0.0, 0.0), (10.0, 10.0), (10.0, 11.0), (0.0, 500.0)] {
            let current = EmissionRating::new(current_value, now).unwrap();
            let best = EmissionRating::new(best_value, now + Duration::hours(3)).unwrap();
            assert_eq!(compute_delay(&current, &best), 0);
        }
    }
}
