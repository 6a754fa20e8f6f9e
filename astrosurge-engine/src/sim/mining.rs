//! Mining-day simulation: the hourly extraction loop.
use rand::Rng;
use rand::seq::SliceRandom;

use crate::constants::{
    DAILY_YIELD_SCALE, ELEMENT_FRACTION_MAX, ELEMENT_FRACTION_MIN, HOURS_PER_DAY,
    MAX_ELEMENTS_PER_HOUR, NOTE_MINING,
};
use crate::error::EngineError;
use crate::events::{EventCatalog, apply_daily_events};
use crate::market::PriceTable;
use crate::mission::{DaySummary, Mission};
use crate::ship::Ship;
use crate::stores::AsteroidStore;

/// Simulate one mining day against the mission's target asteroid.
///
/// Sizes the day from a uniform extraction-fraction draw, then runs 24
/// hourly steps pulling a small random sample of elements each hour.
/// Element mass is decremented through the store, which clamps at zero, so
/// a day can never extract more than the asteroid holds. Extracted mass is
/// loaded into the ship's cargo bay. Events are applied in the mining phase
/// after the loop; the returned flag reports ship destruction.
///
/// # Errors
///
/// Propagates store failures from the element-mass decrement verbatim.
pub fn simulate_mining_day<R: Rng + ?Sized>(
    mission: &mut Mission,
    ship: &mut Ship,
    asteroids: &dyn AsteroidStore,
    catalog: &EventCatalog,
    prices: &PriceTable,
    day: u32,
    mining_power: i64,
    rng: &mut R,
) -> Result<(DaySummary, bool), EngineError> {
    let mut summary = DaySummary::empty(day, NOTE_MINING);

    let remaining_target = (mission.target_yield_kg - mission.total_yield_kg).max(0);
    let daily_capacity = mining_power * HOURS_PER_DAY;
    let element_fraction = rng.gen_range(ELEMENT_FRACTION_MIN..=ELEMENT_FRACTION_MAX);
    let daily_yield_kg =
        ((daily_capacity as f64 * element_fraction * DAILY_YIELD_SCALE) as i64).min(remaining_target);

    // The per-element weights carried on the mission bias toward precious
    // commodities, but this sampler draws uniformly and does not consult
    // them; that mirrors the live behavior the catalog was tuned against.
    let names: Vec<&str> = mission
        .weighted_elements
        .iter()
        .map(|w| w.name.as_str())
        .collect();

    if daily_yield_kg > 0 && !names.is_empty() {
        let hour_yield = (daily_yield_kg / HOURS_PER_DAY).max(1);
        let mut extracted_today: i64 = 0;

        for _hour in 0..HOURS_PER_DAY {
            if extracted_today >= daily_yield_kg || extracted_today >= remaining_target {
                break;
            }
            let sample_size = rng.gen_range(1..=MAX_ELEMENTS_PER_HOUR.min(names.len()));
            let picks: Vec<&str> = names
                .choose_multiple(rng, sample_size)
                .copied()
                .collect();
            let share = (hour_yield / sample_size as i64).max(1);

            for name in picks {
                let headroom = (remaining_target - extracted_today)
                    .min(daily_yield_kg - extracted_today)
                    .max(0);
                if headroom == 0 {
                    break;
                }
                let requested = share.min(headroom);
                let extracted =
                    asteroids.decrement_element_mass(&mission.asteroid_name, name, requested)?;
                if extracted == 0 {
                    continue;
                }
                extracted_today += extracted;
                *summary.elements_mined.entry(name.to_string()).or_insert(0) += extracted;
                if let Some(price) = prices.get(name) {
                    summary.daily_value += extracted * price;
                }
            }
        }

        summary.total_kg = summary.elements_mined.values().sum();
        for (name, kg) in &summary.elements_mined {
            ship.load_cargo(name, *kg);
        }
        log::debug!(
            "day {day}: mined {} kg across {} elements",
            summary.total_kg,
            summary.elements_mined.len()
        );
    }

    let destroyed = apply_daily_events(catalog, mission, &mut summary, ship, None, rng);
    Ok((summary, destroyed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asteroid::{Asteroid, ElementDeposit, WeightedElement};
    use crate::stores::MemoryStore;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn seeded_store(gold_kg: i64) -> MemoryStore {
        let store = MemoryStore::new();
        store.put_asteroid(Asteroid {
            full_name: "433 Eros".to_string(),
            moid_days: 10,
            elements: vec![
                ElementDeposit {
                    name: "Gold".to_string(),
                    mass_kg: gold_kg,
                },
                ElementDeposit {
                    name: "Copper".to_string(),
                    mass_kg: 500_000,
                },
            ],
            commodity_factor: 1.0,
        });
        store
    }

    fn test_mission(target_yield_kg: i64) -> Mission {
        let mut mission =
            Mission::create(1, "u-1", "Artemis", "433 Eros", target_yield_kg, 10, 5, 25, 0);
        mission.weighted_elements = vec![
            WeightedElement {
                name: "Gold".to_string(),
                mass_kg: 10_000,
                weight: 20.0,
            },
            WeightedElement {
                name: "Copper".to_string(),
                mass_kg: 500_000,
                weight: 8.0,
            },
        ];
        mission
    }

    fn prices() -> PriceTable {
        crate::market::StaticPriceTable::snapshot()
    }

    #[test]
    fn day_yield_stays_within_nominal_bounds() {
        let store = seeded_store(10_000_000);
        let mut mission = test_mission(i64::MAX / 4);
        let mut ship = Ship::new("Artemis", 50_000, 500);
        let nominal_max = (500.0 * 24.0 * ELEMENT_FRACTION_MAX * DAILY_YIELD_SCALE) as i64;

        for seed in 0..16 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let (summary, destroyed) = simulate_mining_day(
                &mut mission,
                &mut ship,
                &store,
                &EventCatalog::empty(),
                &prices(),
                11,
                500,
                &mut rng,
            )
            .unwrap();
            assert!(!destroyed);
            assert!(summary.total_kg >= 0);
            assert!(
                summary.total_kg <= nominal_max,
                "day yield {} above nominal max {nominal_max}",
                summary.total_kg
            );
        }
    }

    #[test]
    fn extraction_cannot_exceed_asteroid_mass() {
        let store = seeded_store(50);
        let mut mission = test_mission(i64::MAX / 4);
        mission.weighted_elements.retain(|w| w.name == "Gold");
        let mut ship = Ship::new("Artemis", 50_000, 500);
        let mut rng = SmallRng::seed_from_u64(2);
        let (summary, _) = simulate_mining_day(
            &mut mission,
            &mut ship,
            &store,
            &EventCatalog::empty(),
            &prices(),
            11,
            500,
            &mut rng,
        )
        .unwrap();
        assert!(summary.elements_mined.get("Gold").copied().unwrap_or(0) <= 50);
        assert_eq!(store.get_asteroid("433 Eros").unwrap().element_mass("Gold"), 50 - summary.total_kg);
    }

    #[test]
    fn zero_headroom_is_an_idle_day() {
        let store = seeded_store(10_000);
        let mut mission = test_mission(1_000);
        mission.total_yield_kg = 1_000;
        let mut ship = Ship::new("Artemis", 50_000, 500);
        let mut rng = SmallRng::seed_from_u64(2);
        let before = store.get_asteroid("433 Eros").unwrap();
        let (summary, _) = simulate_mining_day(
            &mut mission,
            &mut ship,
            &store,
            &EventCatalog::empty(),
            &prices(),
            12,
            500,
            &mut rng,
        )
        .unwrap();
        assert_eq!(summary.total_kg, 0);
        assert!(summary.elements_mined.is_empty());
        assert_eq!(store.get_asteroid("433 Eros").unwrap(), before);
        assert_eq!(ship.cargo_mass_kg(), 0);
    }

    #[test]
    fn daily_value_prices_the_day_at_the_snapshot() {
        let store = seeded_store(1_000_000);
        let mut mission = test_mission(i64::MAX / 4);
        let mut ship = Ship::new("Artemis", 50_000, 500);
        let mut rng = SmallRng::seed_from_u64(9);
        let table = prices();
        let (summary, _) = simulate_mining_day(
            &mut mission,
            &mut ship,
            &store,
            &EventCatalog::empty(),
            &table,
            11,
            500,
            &mut rng,
        )
        .unwrap();
        let expected: i64 = summary
            .elements_mined
            .iter()
            .map(|(name, kg)| kg * table.get(name).copied().unwrap_or(0))
            .sum();
        assert_eq!(summary.daily_value, expected);
        assert_eq!(ship.cargo_mass_kg(), summary.total_kg);
    }
}
