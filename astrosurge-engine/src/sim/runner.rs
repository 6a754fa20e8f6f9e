//! Run-to-completion driver over the per-day state machine.
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::market::MarketPriceProvider;
use crate::mission::MissionStatus;
use crate::sim::MissionEngine;
use crate::stores::Backend;

/// Final accounting of a completed or failed mission run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionReport {
    pub mission_id: u64,
    pub status: MissionStatus,
    pub days_simulated: u32,
    pub total_yield_kg: i64,
    pub total_revenue: i64,
    pub total_cost: i64,
    pub profit: i64,
    pub penalties: i64,
    pub investor_repayment: i64,
    /// Profit actually credited to the owner after loan repayment.
    pub banked: i64,
    pub loan_repaid: i64,
    pub ship_destroyed: bool,
}

/// Step a mission day-by-day until it reaches a terminal state.
///
/// On completion a positive profit first repays the owner's outstanding
/// loan in full; only the remainder reaches the bank. Losses are not drawn
/// from the bank here, they ride forward as carried debt on the mission.
/// The per-day transitions are exactly those of `advance_mission`; this is
/// a scheduling convenience, not a second simulator.
///
/// # Errors
///
/// Propagates the first [`EngineError`] raised by a day advancement.
pub fn run_to_completion<B, P>(
    engine: &MissionEngine<B, P>,
    mission_id: u64,
) -> Result<MissionReport, EngineError>
where
    B: Backend,
    P: MarketPriceProvider,
{
    let mut day = engine.backend().get_mission(mission_id)?.days_into_mission();
    loop {
        day += 1;
        let outcome = engine.advance_mission(mission_id, day)?;
        let mission = engine.backend().get_mission(mission_id)?;
        // Multi-day calls (forced return) advance the clock further.
        day = mission.days_into_mission();

        if outcome.ship_destroyed || mission.status.is_terminal() {
            let mut banked = 0;
            let mut loan_repaid = 0;
            if mission.status == MissionStatus::Completed && mission.profit > 0 {
                let mut user = engine.backend().get_user(&mission.user_id)?;
                if user.current_loan > 0 {
                    loan_repaid = user.current_loan;
                    banked = (mission.profit - user.current_loan).max(0);
                    user.current_loan = 0;
                } else {
                    banked = mission.profit;
                }
                user.bank += banked;
                engine.backend().update_user(&user)?;
                log::info!(
                    "mission {mission_id}: completed, profit ${}, repaid ${loan_repaid}, banked ${banked}",
                    mission.profit
                );
            }
            return Ok(MissionReport {
                mission_id,
                status: mission.status,
                days_simulated: mission.days_into_mission(),
                total_yield_kg: mission.total_yield_kg,
                total_revenue: mission.total_revenue,
                total_cost: mission.total_cost,
                profit: mission.profit,
                penalties: mission.penalties,
                investor_repayment: mission.investor_repayment,
                banked,
                loan_repaid,
                ship_destroyed: outcome.ship_destroyed,
            });
        }
    }
}
