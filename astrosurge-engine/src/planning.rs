//! Mission planning: scheduling, budgeting, funding, and projections.
use rand::Rng;

use crate::asteroid::{Asteroid, build_weighted_elements, is_commodity};
use crate::config::MiningGlobals;
use crate::constants::HOURS_PER_DAY;
use crate::market::PriceTable;
use crate::mission::Mission;
use crate::ship::Ship;
use crate::stores::UserProfile;

/// Planning-time profit projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MissionProjection {
    /// Percentage, 0 to 100.
    pub confidence: f64,
    pub profit_min: i64,
    pub profit_max: i64,
}

/// Estimate the average mass a ship extracts per mining day.
///
/// The per-day draw peaks at `max_element_percentage` of hourly capacity;
/// halving that gives the expected rate used for scheduling.
#[must_use]
pub fn average_daily_yield(mining_power: i64, globals: &MiningGlobals) -> i64 {
    let max_daily = (mining_power * HOURS_PER_DAY) as f64 * globals.max_element_percentage;
    (max_daily / 2.0) as i64
}

/// Score a plan before committing to it.
///
/// The optimistic bound prices the full target at current commodity rates;
/// the pessimistic bound halves the haul and charges the full overrun fine
/// window. Confidence blends schedule slack against the mining estimate
/// with a bonus for a proven hull.
#[must_use]
pub fn calculate_confidence(
    target_yield_kg: i64,
    daily_yield_rate: i64,
    budget: i64,
    max_overrun_days: i64,
    ship_reused: bool,
    globals: &MiningGlobals,
    prices: &PriceTable,
) -> MissionProjection {
    let commodity_prices: Vec<i64> = prices
        .iter()
        .filter(|(name, _)| is_commodity(name.as_str()))
        .map(|(_, price)| *price)
        .collect();
    let avg_price = if commodity_prices.is_empty() {
        0
    } else {
        commodity_prices.iter().sum::<i64>() / commodity_prices.len() as i64
    };

    let revenue_max = target_yield_kg * avg_price;
    let profit_max = revenue_max - budget;
    let worst_fines = max_overrun_days * globals.deadline_overrun_fine_per_day;
    let profit_min = revenue_max / 2 - budget - worst_fines;

    let est_mining_days = if daily_yield_rate > 0 {
        (target_yield_kg + daily_yield_rate - 1) / daily_yield_rate
    } else {
        i64::MAX
    };
    let slack = if est_mining_days > 0 {
        (max_overrun_days as f64 / est_mining_days as f64).min(1.0)
    } else {
        1.0
    };
    let mut confidence = 50.0 + 25.0 * slack;
    if ship_reused {
        confidence += 10.0;
    }
    if profit_min > 0 {
        confidence += 15.0;
    }
    MissionProjection {
        confidence: confidence.clamp(0.0, 100.0),
        profit_min,
        profit_max,
    }
}

/// Create a mission for a docked ship against a catalog asteroid.
///
/// Schedules `travel_days * 2` plus the mining estimate, budgets the
/// (possibly reuse-discounted) ship cost plus daily running costs, and
/// takes a funding loan when the user's bank is below the configured
/// minimum. The ship is committed to the mission and the weighted element
/// list is drawn once here.
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn plan_mission<R: Rng + ?Sized>(
    mission_id: u64,
    user: &mut UserProfile,
    ship: &mut Ship,
    asteroid: &Asteroid,
    globals: &MiningGlobals,
    prices: &PriceTable,
    previous_debt: i64,
    rng: &mut R,
) -> Mission {
    let travel_days = asteroid.moid_days;
    let target_yield_kg = ship.capacity_kg;
    let daily_yield_rate = average_daily_yield(ship.mining_power, globals);
    let estimated_mining_days = if daily_yield_rate > 0 {
        target_yield_kg / daily_yield_rate
    } else {
        0
    };
    let scheduled_days = travel_days * 2 + estimated_mining_days;

    let ship_reused = ship.missions_flown > 0;
    let ship_cost = if ship_reused {
        (globals.ship_cost as f64 * globals.ship_reuse_discount) as i64
    } else {
        globals.ship_cost
    };
    let budget = ship_cost + globals.daily_mission_cost * scheduled_days;

    if user.bank < globals.minimum_funding {
        let rate = globals.loan_rate_for(user.loan_count);
        let repayment = (budget as f64 * rate) as i64;
        user.current_loan = repayment;
        user.loan_count += 1;
        log::info!(
            "user {}: mission funded with ${budget} loan at {rate}x, repayment ${repayment}",
            user.username
        );
    }

    let projection = calculate_confidence(
        target_yield_kg,
        daily_yield_rate,
        budget,
        user.max_overrun_days,
        ship_reused,
        globals,
        prices,
    );

    let mut mission = Mission::create(
        mission_id,
        &user.id,
        &ship.name,
        &asteroid.full_name,
        target_yield_kg,
        travel_days,
        estimated_mining_days,
        scheduled_days,
        budget,
    );
    mission.projected_profit = projection.profit_max;
    mission.confidence = projection.confidence;
    mission.previous_debt = previous_debt;
    mission.weighted_elements = build_weighted_elements(asteroid, globals, rng);

    ship.active = true;
    log::info!(
        "user {}: planned mission {mission_id} to {} with {}, {} scheduled days, \
         budget ${budget}, projected profit ${}, confidence {:.2}%",
        user.username,
        asteroid.full_name,
        ship.name,
        scheduled_days,
        projection.profit_max,
        projection.confidence
    );
    mission
}
