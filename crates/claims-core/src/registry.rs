//! In-memory table of pending claims backing the map markers

use std::collections::BTreeMap;

use crate::error::ClaimsError;
use crate::model::{Claim, ClaimStatus, Coordinate};

/// Read-only after construction; share it behind an `Arc` if needed
#[derive(Debug, Clone, Default)]
pub struct ClaimRegistry {
    claims: Vec<Claim>,
}

impl ClaimRegistry {
    /// Assign ids `1..=N` in input order
    pub fn build(coords: &[Coordinate]) -> Self {
        let claims = coords
            .iter()
            .zip(1u32..)
            .map(|(location, id)| Claim {
                id,
                location: *location,
                status: ClaimStatus::Pending,
            })
            .collect::<Vec<_>>();

        tracing::info!("Claim registry built with {} claims", claims.len());
        Self { claims }
    }

    pub fn lookup(&self, id: u32) -> Result<&Claim, ClaimsError> {
        // Ids are contiguous from 1, so the index is derived directly
        id.checked_sub(1)
            .and_then(|idx| self.claims.get(idx as usize))
            .ok_or(ClaimsError::NotFound(id))
    }

    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    /// Number of claims per status, ordered by status
    pub fn count_by_status(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for claim in &self.claims {
            let key = match claim.status {
                ClaimStatus::Pending => "pending",
            };
            *counts.entry(key).or_insert(0) += 1;
        }
        counts
    }

    pub fn pending_count(&self) -> usize {
        self.claims
            .iter()
            .filter(|c| c.status == ClaimStatus::Pending)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn sample() -> ClaimRegistry {
        let coords = geo::generate(Coordinate::new(45.0, 9.0), 3, 0.01, 7).unwrap();
        ClaimRegistry::build(&coords)
    }

    #[test]
    fn test_lookup_existing_claim() {
        let registry = sample();
        let claim = registry.lookup(2).unwrap();
        assert_eq!(claim.id, 2);
        assert_eq!(claim.location, registry.claims()[1].location);
    }

    #[test]
    fn test_lookup_zero_is_not_found() {
        assert_eq!(sample().lookup(0), Err(ClaimsError::NotFound(0)));
    }

    #[test]
    fn test_lookup_past_end_is_not_found() {
        assert_eq!(sample().lookup(4), Err(ClaimsError::NotFound(4)));
    }

    #[test]
    fn test_empty_registry() {
        let registry = ClaimRegistry::build(&[]);
        assert!(registry.is_empty());
        assert_eq!(registry.pending_count(), 0);
        assert!(registry.count_by_status().is_empty());
    }

    #[test]
    fn test_all_generated_claims_are_pending() {
        let registry = sample();
        assert_eq!(registry.pending_count(), 3);
        assert_eq!(registry.count_by_status().get("pending"), Some(&3));
    }

    proptest! {
        /// Property: ids are exactly 1..=count, each once, in input order
        #[test]
        fn ids_are_contiguous_and_unique(count in 0i64..300, seed in any::<u64>()) {
            let coords = geo::generate(Coordinate::new(45.0, 9.0), count, 0.02, seed).unwrap();
            let registry = ClaimRegistry::build(&coords);

            prop_assert_eq!(registry.len() as i64, count);
            let ids: Vec<u32> = registry.claims().iter().map(|c| c.id).collect();
            let expected: Vec<u32> = (1..=count as u32).collect();
            prop_assert_eq!(&ids, &expected);
            prop_assert_eq!(ids.iter().collect::<HashSet<_>>().len(), ids.len());

            for (claim, coord) in registry.claims().iter().zip(&coords) {
                prop_assert_eq!(claim.location, *coord);
            }
        }
    }
}
