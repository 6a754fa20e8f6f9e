//! Asteroid catalog entries and mining weights.
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::MiningGlobals;
use crate::constants::{COMMODITIES, PRECIOUS_COMMODITIES};

/// One element deposit remaining on an asteroid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementDeposit {
    pub name: String,
    pub mass_kg: i64,
}

/// A mineable asteroid. `moid_days` is the one-way travel time in days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asteroid {
    pub full_name: String,
    pub moid_days: i64,
    #[serde(default)]
    pub elements: Vec<ElementDeposit>,
    #[serde(default = "Asteroid::default_commodity_factor")]
    pub commodity_factor: f64,
}

impl Asteroid {
    const fn default_commodity_factor() -> f64 {
        1.0
    }

    /// Remaining mass of a named element, zero when absent.
    #[must_use]
    pub fn element_mass(&self, name: &str) -> i64 {
        self.elements
            .iter()
            .find(|e| e.name == name)
            .map_or(0, |e| e.mass_kg)
    }

    /// Total remaining mineable mass.
    #[must_use]
    pub fn total_mass_kg(&self) -> i64 {
        self.elements.iter().map(|e| e.mass_kg).sum()
    }
}

/// An asteroid element annotated with its mining weight.
///
/// Weights bias toward precious commodities, but the hourly extraction
/// sampler draws uniformly and does not consult them; they are carried on
/// the mission for projection display. See `sim::mining`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedElement {
    pub name: String,
    pub mass_kg: i64,
    pub weight: f64,
}

/// Whether an element is one of the tracked market commodities.
#[must_use]
pub fn is_commodity(name: &str) -> bool {
    COMMODITIES.contains(&name)
}

fn is_precious(name: &str) -> bool {
    PRECIOUS_COMMODITIES.contains(&name)
}

/// Build the per-mission weighted element list from an asteroid snapshot.
///
/// Elements with no remaining mass are skipped. Each class draws its weight
/// factor once, at mission planning time.
pub fn build_weighted_elements<R: Rng + ?Sized>(
    asteroid: &Asteroid,
    globals: &MiningGlobals,
    rng: &mut R,
) -> Vec<WeightedElement> {
    let mut weighted = Vec::with_capacity(asteroid.elements.len());
    for deposit in &asteroid.elements {
        if deposit.mass_kg <= 0 {
            continue;
        }
        let weight = if is_precious(&deposit.name) {
            globals.commodity_factor_platinum_gold
                * asteroid.commodity_factor
                * rng.gen_range(5.0..=10.0)
        } else if is_commodity(&deposit.name) {
            globals.commodity_factor_other * asteroid.commodity_factor * rng.gen_range(3.0..=5.0)
        } else {
            globals.non_commodity_weight * rng.gen_range(1.0..=2.0)
        };
        weighted.push(WeightedElement {
            name: deposit.name.clone(),
            mass_kg: deposit.mass_kg,
            weight,
        });
    }
    weighted
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn test_asteroid() -> Asteroid {
        Asteroid {
            full_name: "433 Eros".to_string(),
            moid_days: 10,
            elements: vec![
                ElementDeposit {
                    name: "Gold".to_string(),
                    mass_kg: 10_000,
                },
                ElementDeposit {
                    name: "Copper".to_string(),
                    mass_kg: 80_000,
                },
                ElementDeposit {
                    name: "Olivine".to_string(),
                    mass_kg: 500_000,
                },
                ElementDeposit {
                    name: "Iron".to_string(),
                    mass_kg: 0,
                },
            ],
            commodity_factor: 1.5,
        }
    }

    #[test]
    fn element_mass_lookup() {
        let asteroid = test_asteroid();
        assert_eq!(asteroid.element_mass("Gold"), 10_000);
        assert_eq!(asteroid.element_mass("Unobtanium"), 0);
        assert_eq!(asteroid.total_mass_kg(), 590_000);
    }

    #[test]
    fn weights_skip_exhausted_deposits() {
        let asteroid = test_asteroid();
        let globals = MiningGlobals::default();
        let mut rng = SmallRng::seed_from_u64(11);
        let weighted = build_weighted_elements(&asteroid, &globals, &mut rng);
        assert_eq!(weighted.len(), 3);
        assert!(weighted.iter().all(|w| w.name != "Iron"));
    }

    #[test]
    fn precious_weights_dominate() {
        let asteroid = test_asteroid();
        let globals = MiningGlobals::default();
        let mut rng = SmallRng::seed_from_u64(11);
        let weighted = build_weighted_elements(&asteroid, &globals, &mut rng);
        let gold = weighted.iter().find(|w| w.name == "Gold").unwrap();
        let copper = weighted.iter().find(|w| w.name == "Copper").unwrap();
        let olivine = weighted.iter().find(|w| w.name == "Olivine").unwrap();
        // factor 2.0 * 1.5 * [5,10] vs 1.5 * 1.5 * [3,5] vs 0.5 * [1,2]
        assert!(gold.weight >= 15.0);
        assert!(copper.weight >= 6.75 && copper.weight <= 11.25);
        assert!(olivine.weight <= 1.0);
        assert!(gold.weight > olivine.weight);
    }
}
