//! Financial settlement, performed once when the ship reaches Earth.
use chrono::Utc;

use crate::asteroid::is_commodity;
use crate::config::MiningGlobals;
use crate::market::PriceTable;
use crate::mission::{Mission, MissionStatus};
use crate::stores::UserProfile;

/// Convert the mission's cargo into money and close out its books.
///
/// Revenue counts tracked commodities only, scaled by the cumulative
/// revenue multiplier with truncation. The cost base is the accumulated
/// daily mission cost plus repair cost; deadline and budget overrun
/// penalties are added on top. When the resulting profit falls below the
/// configured minimum an investor loan is taken at the rate indexed by the
/// user's prior loan count, raising total cost and lowering profit. A
/// negative final profit becomes debt handed to the owner's next mission.
pub fn settle_mission(
    mission: &mut Mission,
    globals: &MiningGlobals,
    user: &UserProfile,
    prices: &PriceTable,
) {
    let mut revenue: i64 = 0;
    for (name, kg) in &mission.elements_mined {
        if !is_commodity(name) {
            continue;
        }
        let price = prices.get(name).copied().unwrap_or(0);
        revenue += kg * price;
        log::info!("mission {}: sold {kg} kg {name} at ${price}/kg", mission.id);
    }
    revenue = (revenue as f64 * mission.revenue_multiplier) as i64;

    let cost_base = mission.mission_cost + mission.ship_repair_cost;
    let total_duration = i64::from(mission.days_into_mission());
    let deadline_overrun = (total_duration - mission.scheduled_days).max(0);
    let penalties = deadline_overrun * globals.deadline_overrun_fine_per_day
        + (cost_base - mission.budget).max(0);

    let mut total_cost = cost_base + penalties;
    let mut profit = revenue - total_cost;

    if profit < globals.minimum_funding {
        let loan = globals.investor_loan_amount;
        let rate = globals.loan_rate_for(user.loan_count);
        let repayment = (loan as f64 * rate) as i64;
        total_cost += repayment;
        profit = revenue - total_cost;
        mission.investor_loan = loan;
        mission.investor_repayment = repayment;
        log::info!(
            "mission {}: profit below ${} minimum, investor loan ${loan} at {rate}x",
            mission.id,
            globals.minimum_funding
        );
    }

    mission.total_revenue = revenue;
    mission.total_cost = total_cost;
    mission.profit = profit;
    mission.penalties = penalties;
    mission.previous_debt = (-profit).max(0);
    mission.status = MissionStatus::Completed;
    mission.completed_at = Some(Utc::now());
    log::info!(
        "mission {}: settled, revenue ${revenue}, cost ${total_cost}, profit ${profit}",
        mission.id
    );
}
