//! Deterministic synthetic claim locations
//!
//! Points are scattered uniformly in a square around a center. The same
//! `(center, count, spread, seed)` always yields the same sequence, which keeps
//! marker ids and their popups stable between runs.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::ClaimsError;
use crate::model::Coordinate;

/// Parameters for a batch of generated claim locations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaimScatter {
    pub center: Coordinate,
    /// Signed so that configuration mistakes surface as `InvalidParameter`
    pub count: i64,
    /// Maximum offset in degrees, applied independently per axis
    pub spread: f64,
    pub seed: u64,
}

impl Default for ClaimScatter {
    fn default() -> Self {
        // Milan city center
        Self {
            center: Coordinate::new(45.4642, 9.1900),
            count: 45,
            spread: 0.02,
            seed: 42,
        }
    }
}

impl ClaimScatter {
    pub fn validate(&self) -> Result<(), ClaimsError> {
        if self.count < 0 {
            return Err(ClaimsError::InvalidParameter(format!(
                "count must be >= 0, got {}",
                self.count
            )));
        }
        if !(self.spread.is_finite() && self.spread >= 0.0) {
            return Err(ClaimsError::InvalidParameter(format!(
                "spread must be a finite value >= 0, got {}",
                self.spread
            )));
        }
        if !self.center.latitude.is_finite() || !self.center.longitude.is_finite() {
            return Err(ClaimsError::InvalidParameter(
                "center must have finite coordinates".to_string(),
            ));
        }
        // The sampled range and the shifted points must stay finite too
        let (lat, lon) = (self.center.latitude, self.center.longitude);
        let reachable = [
            2.0 * self.spread,
            lat - self.spread,
            lat + self.spread,
            lon - self.spread,
            lon + self.spread,
        ];
        if !reachable.iter().all(|v| v.is_finite()) {
            return Err(ClaimsError::InvalidParameter(format!(
                "spread {} overflows around center ({}, {})",
                self.spread, lat, lon
            )));
        }
        Ok(())
    }

    pub fn generate(&self) -> Result<Vec<Coordinate>, ClaimsError> {
        generate(self.center, self.count, self.spread, self.seed)
    }
}

/// Generate `count` coordinates at `center ± uniform(-spread, spread)` per axis
pub fn generate(
    center: Coordinate,
    count: i64,
    spread: f64,
    seed: u64,
) -> Result<Vec<Coordinate>, ClaimsError> {
    let scatter = ClaimScatter {
        center,
        count,
        spread,
        seed,
    };
    scatter.validate()?;

    let mut rng = StdRng::seed_from_u64(seed);
    let points = (0..count)
        .map(|_| {
            let lat = center.latitude + rng.gen_range(-spread..=spread);
            let lon = center.longitude + rng.gen_range(-spread..=spread);
            Coordinate::new(lat, lon)
        })
        .collect::<Vec<_>>();

    tracing::debug!(count, spread, seed, "Generated claim coordinates");
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const MILAN: Coordinate = Coordinate::new(45.4642, 9.19);

    #[test]
    fn test_default_batch_has_45_points() {
        let points = ClaimScatter::default().generate().unwrap();
        assert_eq!(points.len(), 45);
    }

    #[test]
    fn test_negative_count_is_rejected() {
        let result = generate(MILAN, -1, 0.02, 42);
        assert!(matches!(result, Err(ClaimsError::InvalidParameter(_))));
    }

    #[test]
    fn test_negative_spread_is_rejected() {
        let result = generate(MILAN, 3, -0.5, 42);
        assert!(matches!(result, Err(ClaimsError::InvalidParameter(_))));
    }

    #[test]
    fn test_nan_spread_is_rejected() {
        let result = generate(MILAN, 3, f64::NAN, 42);
        assert!(matches!(result, Err(ClaimsError::InvalidParameter(_))));
    }

    #[test]
    fn test_overflowing_spread_is_rejected() {
        let result = generate(Coordinate::new(45.0, 9.0), 1, 1e308, 42);
        assert!(matches!(result, Err(ClaimsError::InvalidParameter(_))));

        let result = generate(Coordinate::new(f64::MAX, 9.0), 1, f64::MAX / 2.0, 42);
        assert!(matches!(result, Err(ClaimsError::InvalidParameter(_))));
    }

    #[test]
    fn test_zero_count_is_empty() {
        assert!(generate(MILAN, 0, 0.02, 1).unwrap().is_empty());
    }

    #[test]
    fn test_zero_spread_pins_every_point_to_center() {
        let points = generate(MILAN, 5, 0.0, 9).unwrap();
        assert!(points.iter().all(|p| *p == MILAN));
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = generate(MILAN, 10, 0.02, 1).unwrap();
        let b = generate(MILAN, 10, 0.02, 2).unwrap();
        assert_ne!(a, b);
    }

    proptest! {
        /// Property: same arguments, same sequence
        #[test]
        fn generation_is_deterministic(
            count in 0i64..200,
            spread in 0.0f64..1.0,
            seed in any::<u64>(),
        ) {
            let first = generate(MILAN, count, spread, seed).unwrap();
            let second = generate(MILAN, count, spread, seed).unwrap();
            prop_assert_eq!(first, second);
        }

        /// Property: every point stays within the spread box
        #[test]
        fn points_stay_within_spread(
            count in 0i64..100,
            spread in 0.0f64..0.5,
            seed in any::<u64>(),
        ) {
            for p in generate(MILAN, count, spread, seed).unwrap() {
                prop_assert!((p.latitude - MILAN.latitude).abs() <= spread + 1e-12);
                prop_assert!((p.longitude - MILAN.longitude).abs() <= spread + 1e-12);
            }
        }

        /// Property: any negative count fails
        #[test]
        fn negative_counts_fail(count in i64::MIN..0) {
            prop_assert!(generate(MILAN, count, 0.02, 42).is_err());
        }
    }
}
