//! Mission state, daily summaries, and applied-event records.
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::asteroid::WeightedElement;
use crate::events::EffectKind;

/// Lifecycle state of a mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionStatus {
    Active,
    Completed,
    Failed,
}

impl MissionStatus {
    /// Numeric status code used by external reporting (0/1/2).
    #[must_use]
    pub const fn as_code(self) -> u8 {
        match self {
            Self::Active => 0,
            Self::Completed => 1,
            Self::Failed => 2,
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Active)
    }
}

/// One event that fired during a day's simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedEvent {
    pub name: String,
    pub effects: SmallVec<[EffectKind; 2]>,
}

/// An applied event tagged with the mission day it occurred on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionEvent {
    pub day: u32,
    #[serde(flatten)]
    pub event: AppliedEvent,
}

/// One simulated day's record. Immutable once appended to the mission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub day: u32,
    /// Mass mined this day; zero on travel days.
    pub total_kg: i64,
    pub note: String,
    #[serde(default)]
    pub events: Vec<AppliedEvent>,
    #[serde(default)]
    pub elements_mined: BTreeMap<String, i64>,
    /// Market value of this day's yield at the day's price snapshot.
    #[serde(default)]
    pub daily_value: i64,
}

impl DaySummary {
    /// A travel or idle day with the given note and no yield.
    #[must_use]
    pub fn empty(day: u32, note: &str) -> Self {
        Self {
            day,
            total_kg: 0,
            note: note.to_string(),
            events: Vec::new(),
            elements_mined: BTreeMap::new(),
            daily_value: 0,
        }
    }
}

/// One mining expedition.
///
/// Planning attributes are fixed at creation; the simulation state block is
/// mutated exactly once per simulated day by the progression engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mission {
    pub id: u64,
    pub user_id: String,
    pub ship_name: String,
    pub asteroid_name: String,

    // Planning attributes.
    pub target_yield_kg: i64,
    /// One-way outbound travel time in days (the asteroid's moid_days).
    pub base_travel_days: i64,
    pub estimated_mining_days: i64,
    pub scheduled_days: i64,
    pub budget: i64,
    #[serde(default)]
    pub projected_profit: i64,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub weighted_elements: Vec<WeightedElement>,

    // Simulation state.
    #[serde(default)]
    pub ship_location: i64,
    #[serde(default)]
    pub total_yield_kg: i64,
    #[serde(default)]
    pub elements_mined: BTreeMap<String, i64>,
    #[serde(default)]
    pub events: Vec<MissionEvent>,
    #[serde(default)]
    pub daily_summaries: Vec<DaySummary>,
    #[serde(default)]
    pub travel_delays: i64,
    #[serde(default = "Mission::default_multiplier")]
    pub yield_multiplier: f64,
    #[serde(default = "Mission::default_multiplier")]
    pub revenue_multiplier: f64,
    #[serde(default = "Mission::default_multiplier")]
    pub travel_yield_mod: f64,
    #[serde(default)]
    pub ship_repair_cost: i64,
    /// Accumulated daily mission cost to date.
    #[serde(default)]
    pub mission_cost: i64,
    /// Debt carried in from the owner's previous mission.
    #[serde(default)]
    pub previous_debt: i64,
    pub status: MissionStatus,

    // Settlement results, populated when the mission terminates.
    #[serde(default)]
    pub total_cost: i64,
    #[serde(default)]
    pub total_revenue: i64,
    #[serde(default)]
    pub profit: i64,
    #[serde(default)]
    pub penalties: i64,
    #[serde(default)]
    pub investor_loan: i64,
    #[serde(default)]
    pub investor_repayment: i64,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Mission {
    const fn default_multiplier() -> f64 {
        1.0
    }

    /// Build a fresh active mission from its planning attributes.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        id: u64,
        user_id: &str,
        ship_name: &str,
        asteroid_name: &str,
        target_yield_kg: i64,
        base_travel_days: i64,
        estimated_mining_days: i64,
        scheduled_days: i64,
        budget: i64,
    ) -> Self {
        Self {
            id,
            user_id: user_id.to_string(),
            ship_name: ship_name.to_string(),
            asteroid_name: asteroid_name.to_string(),
            target_yield_kg,
            base_travel_days,
            estimated_mining_days,
            scheduled_days,
            budget,
            projected_profit: 0,
            confidence: 0.0,
            weighted_elements: Vec::new(),
            ship_location: 0,
            total_yield_kg: 0,
            elements_mined: BTreeMap::new(),
            events: Vec::new(),
            daily_summaries: Vec::new(),
            travel_delays: 0,
            yield_multiplier: 1.0,
            revenue_multiplier: 1.0,
            travel_yield_mod: 1.0,
            ship_repair_cost: 0,
            mission_cost: 0,
            previous_debt: 0,
            status: MissionStatus::Active,
            total_cost: 0,
            total_revenue: 0,
            profit: 0,
            penalties: 0,
            investor_loan: 0,
            investor_repayment: 0,
            completed_at: None,
        }
    }

    /// Number of days simulated so far. Always equals the summary count.
    #[must_use]
    pub fn days_into_mission(&self) -> u32 {
        u32::try_from(self.daily_summaries.len()).unwrap_or(u32::MAX)
    }

    /// Days remaining before the (delay-adjusted) schedule runs out while
    /// still accumulating yield, or the remaining return distance once the
    /// yield target is met.
    #[must_use]
    pub fn days_left(&self) -> i64 {
        if self.total_yield_kg < self.target_yield_kg {
            (self.scheduled_days + self.travel_delays - i64::from(self.days_into_mission())).max(0)
        } else {
            self.ship_location
        }
    }

    /// Append a completed day's record and fold its totals into the mission.
    pub fn record_day(&mut self, summary: DaySummary) {
        let day = summary.day;
        for (name, kg) in &summary.elements_mined {
            *self.elements_mined.entry(name.clone()).or_insert(0) += kg;
        }
        self.total_yield_kg += summary.total_kg;
        for applied in &summary.events {
            self.events.push(MissionEvent {
                day,
                event: applied.clone(),
            });
        }
        self.daily_summaries.push(summary);
    }

    /// Apply a schedule delay or reduction, flooring accumulated delays at 0.
    pub fn adjust_travel_delays(&mut self, delta: i64) {
        self.travel_delays = (self.travel_delays + delta).max(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    fn test_mission() -> Mission {
        Mission::create(1, "u-1", "Artemis", "433 Eros", 50_000, 10, 5, 25, 200_000_000)
    }

    #[test]
    fn record_day_folds_totals_and_tags_events() {
        let mut mission = test_mission();
        let mut summary = DaySummary::empty(1, "Mining - No incident");
        summary.total_kg = 300;
        summary.elements_mined.insert("Gold".to_string(), 300);
        summary.events.push(AppliedEvent {
            name: "Solar Flare".to_string(),
            effects: smallvec![EffectKind::DelayDays(2)],
        });
        mission.record_day(summary);

        assert_eq!(mission.days_into_mission(), 1);
        assert_eq!(mission.total_yield_kg, 300);
        assert_eq!(mission.elements_mined["Gold"], 300);
        assert_eq!(mission.events.len(), 1);
        assert_eq!(mission.events[0].day, 1);
    }

    #[test]
    fn travel_delays_never_go_negative() {
        let mut mission = test_mission();
        mission.adjust_travel_delays(3);
        mission.adjust_travel_delays(-5);
        assert_eq!(mission.travel_delays, 0);
    }

    #[test]
    fn days_left_switches_to_return_distance() {
        let mut mission = test_mission();
        mission.travel_delays = 2;
        for d in 1..=4 {
            mission.record_day(DaySummary::empty(d, "Travel - No incident"));
        }
        assert_eq!(mission.days_left(), 23);

        mission.total_yield_kg = mission.target_yield_kg;
        mission.ship_location = 7;
        assert_eq!(mission.days_left(), 7);
    }

    #[test]
    fn status_codes() {
        assert_eq!(MissionStatus::Active.as_code(), 0);
        assert_eq!(MissionStatus::Completed.as_code(), 1);
        assert_eq!(MissionStatus::Failed.as_code(), 2);
        assert!(MissionStatus::Failed.is_terminal());
        assert!(!MissionStatus::Active.is_terminal());
    }
}
