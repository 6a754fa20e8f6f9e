//! The daily mission-progression state machine.
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::MiningGlobals;
use crate::error::EngineError;
use crate::events::EventCatalog;
use crate::market::PriceTable;
use crate::mission::{DaySummary, Mission, MissionStatus};
use crate::rng::RngBundle;
use crate::ship::Ship;
use crate::sim::mining::simulate_mining_day;
use crate::sim::settlement::settle_mission;
use crate::sim::travel::simulate_travel_day;
use crate::stores::{AsteroidStore, UserProfile};

/// Phase a simulated day was classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionPhase {
    OutboundTravel,
    Mining,
    ReturnTravel,
    /// Overrun abandonment: the remaining return leg ran in one call.
    ForcedReturn,
}

/// Result of advancing a mission by one call.
#[derive(Debug, Clone)]
pub struct DayOutcome {
    /// First day simulated by this call.
    pub day: u32,
    pub phase: MissionPhase,
    /// Day records produced; more than one only on a forced return.
    pub summaries: Vec<DaySummary>,
    /// Whether financial settlement ran this call.
    pub settled: bool,
    pub ship_destroyed: bool,
}

/// Read-side collaborators a day advancement needs.
pub struct DayContext<'a> {
    pub globals: &'a MiningGlobals,
    pub catalog: &'a EventCatalog,
    pub prices: &'a PriceTable,
    pub asteroids: &'a dyn AsteroidStore,
    pub rng: &'a RngBundle,
}

/// Advance one mission by one simulated day.
///
/// Classifies `day` into a phase, runs the matching day simulator, folds
/// the day into the mission, and settles when the ship reaches Earth. The
/// duplicate-day guard makes replays of an already simulated day an error
/// with no state mutation, which is what serializes per-mission advancement.
///
/// # Errors
///
/// [`EngineError::MissionNotActive`] for terminal missions,
/// [`EngineError::DuplicateDay`] when `day` was already simulated, and
/// store failures propagated verbatim from the day simulators.
pub fn advance_mission(
    mission: &mut Mission,
    ship: &mut Ship,
    user: &mut UserProfile,
    day: u32,
    ctx: &DayContext<'_>,
) -> Result<DayOutcome, EngineError> {
    if mission.status.is_terminal() {
        return Err(EngineError::MissionNotActive {
            mission_id: mission.id.to_string(),
        });
    }
    let simulated = mission.days_into_mission();
    if day <= simulated {
        return Err(EngineError::DuplicateDay { day, simulated });
    }

    let overrun_limit = mission.scheduled_days + user.max_overrun_days;
    let overrun_forced = i64::from(simulated) >= overrun_limit
        && mission.total_yield_kg < mission.target_yield_kg
        && mission.ship_location > 0;

    if overrun_forced {
        log::info!(
            "mission {}: overrun limit of {overrun_limit} days reached, forcing return",
            mission.id
        );
        return forced_return(mission, ship, user, day, ctx);
    }

    if i64::from(day) <= mission.base_travel_days {
        let (summary, destroyed) = simulate_travel_day(
            mission,
            ship,
            ctx.catalog,
            day,
            false,
            &mut *ctx.rng.events(),
        );
        if destroyed {
            handle_ship_destruction(mission, ship, user, ctx.globals, day);
            return Ok(outcome_destroyed(day, MissionPhase::OutboundTravel, summary));
        }
        mission.ship_location += 1;
        ship.location = mission.ship_location;
        mission.mission_cost += ctx.globals.daily_mission_cost;
        mission.record_day(summary.clone());
        log::info!(
            "mission {}: day {day} outbound, location {}/{}",
            mission.id,
            mission.ship_location,
            mission.base_travel_days
        );
        return Ok(DayOutcome {
            day,
            phase: MissionPhase::OutboundTravel,
            summaries: vec![summary],
            settled: false,
            ship_destroyed: false,
        });
    }

    if mission.total_yield_kg < mission.target_yield_kg {
        let (summary, destroyed) = simulate_mining_day(
            mission,
            ship,
            ctx.asteroids,
            ctx.catalog,
            ctx.prices,
            day,
            ship.mining_power,
            &mut *ctx.rng.mining(),
        )?;
        if destroyed {
            handle_ship_destruction(mission, ship, user, ctx.globals, day);
            return Ok(outcome_destroyed(day, MissionPhase::Mining, summary));
        }
        mission.ship_location = mission.base_travel_days;
        ship.location = mission.ship_location;
        mission.mission_cost += ctx.globals.daily_mission_cost;
        mission.record_day(summary.clone());
        log::info!(
            "mission {}: day {day} mining, +{} kg, total {}/{} kg",
            mission.id,
            summary.total_kg,
            mission.total_yield_kg,
            mission.target_yield_kg
        );
        return Ok(DayOutcome {
            day,
            phase: MissionPhase::Mining,
            summaries: vec![summary],
            settled: false,
            ship_destroyed: false,
        });
    }

    let (summary, destroyed) = simulate_travel_day(
        mission,
        ship,
        ctx.catalog,
        day,
        true,
        &mut *ctx.rng.events(),
    );
    if destroyed {
        handle_ship_destruction(mission, ship, user, ctx.globals, day);
        return Ok(outcome_destroyed(day, MissionPhase::ReturnTravel, summary));
    }
    mission.ship_location = (mission.ship_location - 1).max(0);
    ship.location = mission.ship_location;
    mission.mission_cost += ctx.globals.daily_mission_cost;
    mission.record_day(summary.clone());
    log::info!(
        "mission {}: day {day} return, location {}",
        mission.id,
        mission.ship_location
    );

    let settled = mission.ship_location == 0;
    if settled {
        settle_mission(mission, ctx.globals, user, ctx.prices);
        dock_ship(ship);
    }
    Ok(DayOutcome {
        day,
        phase: MissionPhase::ReturnTravel,
        summaries: vec![summary],
        settled,
        ship_destroyed: false,
    })
}

/// Fast-forward the remaining return leg in a single call.
fn forced_return(
    mission: &mut Mission,
    ship: &mut Ship,
    user: &mut UserProfile,
    first_day: u32,
    ctx: &DayContext<'_>,
) -> Result<DayOutcome, EngineError> {
    let mut summaries = Vec::with_capacity(usize::try_from(mission.ship_location).unwrap_or(0));
    let mut next_day = first_day;

    while mission.ship_location > 0 {
        let (summary, destroyed) = simulate_travel_day(
            mission,
            ship,
            ctx.catalog,
            next_day,
            true,
            &mut *ctx.rng.events(),
        );
        if destroyed {
            handle_ship_destruction(mission, ship, user, ctx.globals, next_day);
            summaries.push(summary);
            return Ok(DayOutcome {
                day: first_day,
                phase: MissionPhase::ForcedReturn,
                summaries,
                settled: false,
                ship_destroyed: true,
            });
        }
        mission.ship_location -= 1;
        ship.location = mission.ship_location;
        mission.mission_cost += ctx.globals.daily_mission_cost;
        mission.record_day(summary.clone());
        summaries.push(summary);
        next_day += 1;
    }

    settle_mission(mission, ctx.globals, user, ctx.prices);
    dock_ship(ship);
    Ok(DayOutcome {
        day: first_day,
        phase: MissionPhase::ForcedReturn,
        summaries,
        settled: true,
        ship_destroyed: false,
    })
}

/// Terminal handling for a hull collapse: the mission fails, the wreck is
/// written off, and a replacement hull is financed as debt on the owner.
fn handle_ship_destruction(
    mission: &mut Mission,
    ship: &mut Ship,
    user: &mut UserProfile,
    globals: &MiningGlobals,
    day: u32,
) {
    mission.status = MissionStatus::Failed;
    mission.completed_at = Some(Utc::now());
    ship.destroyed = true;
    ship.active = false;
    user.current_loan += globals.ship_cost;
    log::warn!(
        "mission {}: ship {} destroyed on day {day}, ${} replacement debt added",
        mission.id,
        ship.name,
        globals.ship_cost
    );
}

// The accrued repair cost was just charged in settlement, so the hull
// comes back to full integrity here.
fn dock_ship(ship: &mut Ship) {
    ship.location = 0;
    ship.active = false;
    ship.missions_flown += 1;
    ship.unload_cargo();
    ship.repair();
}

fn outcome_destroyed(day: u32, phase: MissionPhase, summary: DaySummary) -> DayOutcome {
    DayOutcome {
        day,
        phase,
        summaries: vec![summary],
        settled: false,
        ship_destroyed: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asteroid::{Asteroid, ElementDeposit, WeightedElement};
    use crate::market::StaticPriceTable;
    use crate::stores::MemoryStore;

    fn seeded_store() -> MemoryStore {
        let store = MemoryStore::new();
        store.put_asteroid(Asteroid {
            full_name: "433 Eros".to_string(),
            moid_days: 10,
            elements: vec![
                ElementDeposit {
                    name: "Gold".to_string(),
                    mass_kg: 40_000_000,
                },
                ElementDeposit {
                    name: "Copper".to_string(),
                    mass_kg: 90_000_000,
                },
            ],
            commodity_factor: 1.0,
        });
        store
    }

    fn test_mission() -> Mission {
        let mut mission =
            Mission::create(1, "u-1", "Artemis", "433 Eros", 50_000, 10, 17, 37, 200_000_000);
        mission.weighted_elements = vec![
            WeightedElement {
                name: "Gold".to_string(),
                mass_kg: 40_000_000,
                weight: 20.0,
            },
            WeightedElement {
                name: "Copper".to_string(),
                mass_kg: 90_000_000,
                weight: 8.0,
            },
        ];
        mission
    }

    fn advance(
        store: &MemoryStore,
        mission: &mut Mission,
        ship: &mut Ship,
        user: &mut UserProfile,
        rng: &RngBundle,
        day: u32,
    ) -> Result<DayOutcome, EngineError> {
        let globals = MiningGlobals::default();
        let prices = StaticPriceTable::snapshot();
        let catalog = EventCatalog::empty();
        let ctx = DayContext {
            globals: &globals,
            catalog: &catalog,
            prices: &prices,
            asteroids: store,
            rng,
        };
        advance_mission(mission, ship, user, day, &ctx)
    }

    #[test]
    fn first_ten_days_are_outbound_travel() {
        let store = seeded_store();
        let mut mission = test_mission();
        let mut ship = Ship::new("Artemis", 50_000, 500);
        let mut user = UserProfile::new("u-1", "alice", "Astro Co", 0);
        let rng = RngBundle::from_user_seed(42);

        for day in 1..=10 {
            let outcome =
                advance(&store, &mut mission, &mut ship, &mut user, &rng, day).unwrap();
            assert_eq!(outcome.phase, MissionPhase::OutboundTravel);
            assert_eq!(mission.ship_location, i64::from(day));
        }
        let outcome = advance(&store, &mut mission, &mut ship, &mut user, &rng, 11).unwrap();
        assert_eq!(outcome.phase, MissionPhase::Mining);
        assert_eq!(mission.ship_location, 10);
    }

    #[test]
    fn duplicate_day_is_rejected_without_mutation() {
        let store = seeded_store();
        let mut mission = test_mission();
        let mut ship = Ship::new("Artemis", 50_000, 500);
        let mut user = UserProfile::new("u-1", "alice", "Astro Co", 0);
        let rng = RngBundle::from_user_seed(42);

        advance(&store, &mut mission, &mut ship, &mut user, &rng, 1).unwrap();
        let snapshot = mission.clone();
        let err = advance(&store, &mut mission, &mut ship, &mut user, &rng, 1).unwrap_err();
        assert!(matches!(
            err,
            EngineError::DuplicateDay { day: 1, simulated: 1 }
        ));
        assert_eq!(mission, snapshot);
    }

    #[test]
    fn yield_is_monotone_and_location_bounded() {
        let store = seeded_store();
        let mut mission = test_mission();
        // Generous schedule keeps the overrun branch out of this sweep.
        mission.estimated_mining_days = 60;
        mission.scheduled_days = 80;
        let mut ship = Ship::new("Artemis", 50_000, 500);
        let mut user = UserProfile::new("u-1", "alice", "Astro Co", 0);
        let rng = RngBundle::from_user_seed(9);

        let mut last_yield = 0;
        let mut day = 0;
        while mission.status == MissionStatus::Active && day < 200 {
            day += 1;
            advance(&store, &mut mission, &mut ship, &mut user, &rng, day).unwrap();
            assert!(mission.total_yield_kg >= last_yield);
            assert!(mission.ship_location >= 0);
            assert!(mission.ship_location <= mission.base_travel_days);
            assert_eq!(
                i64::from(mission.days_into_mission()),
                i64::try_from(mission.daily_summaries.len()).unwrap()
            );
            last_yield = mission.total_yield_kg;
        }
        assert_eq!(mission.status, MissionStatus::Completed);
        assert_eq!(mission.total_yield_kg, mission.target_yield_kg);
        assert_eq!(mission.ship_location, 0);
        assert!(!ship.active);
        assert_eq!(ship.missions_flown, 1);
    }

    #[test]
    fn forced_return_fires_only_past_the_overrun_window() {
        let store = seeded_store();
        let mut mission = test_mission();
        // An impossible target keeps the mission mining forever.
        mission.target_yield_kg = i64::MAX / 4;
        let mut ship = Ship::new("Artemis", 50_000, 500);
        let mut user = UserProfile::new("u-1", "alice", "Astro Co", 0);
        let rng = RngBundle::from_user_seed(3);

        let limit = mission.scheduled_days + user.max_overrun_days;
        let mut day = 0;
        loop {
            day += 1;
            let outcome =
                advance(&store, &mut mission, &mut ship, &mut user, &rng, day).unwrap();
            if outcome.phase == MissionPhase::ForcedReturn {
                assert!(i64::from(day - 1) >= limit);
                assert!(outcome.settled);
                assert_eq!(outcome.summaries.len(), 10);
                break;
            }
            assert!(i64::from(mission.days_into_mission()) <= limit);
            assert!(day < 100, "forced return never fired");
        }
        assert_eq!(mission.status, MissionStatus::Completed);
        assert_eq!(mission.ship_location, 0);
    }

    #[test]
    fn terminal_missions_reject_further_days() {
        let store = seeded_store();
        let mut mission = test_mission();
        mission.status = MissionStatus::Failed;
        let mut ship = Ship::new("Artemis", 50_000, 500);
        let mut user = UserProfile::new("u-1", "alice", "Astro Co", 0);
        let rng = RngBundle::from_user_seed(3);
        let err = advance(&store, &mut mission, &mut ship, &mut user, &rng, 1).unwrap_err();
        assert!(matches!(err, EngineError::MissionNotActive { .. }));
    }
}
