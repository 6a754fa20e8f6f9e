//! Event catalog and the daily event engine.
//!
//! Events are Bernoulli-per-day hazards and windfalls filtered by mission
//! phase. Each catalog entry carries a typed list of effects so every kind is
//! handled exhaustively at apply time.

use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::constants::NOTE_SHIP_DESTROYED;
use crate::mission::{AppliedEvent, DaySummary, Mission};
use crate::ship::Ship;

/// Mission phase an event can fire in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventPhase {
    Travel,
    Mining,
}

/// What an event's effects act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventTarget {
    Mission,
    Ship,
}

/// A single typed effect magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// Scales this day's mined yield; mining phase only.
    YieldMultiplier(f64),
    /// Compounds into the mission's cumulative revenue multiplier.
    RevenueMultiplier(f64),
    /// Adds to the mission's accumulated ship repair cost.
    RepairCost(i64),
    DelayDays(i64),
    ReduceDays(i64),
    /// Scales the mission's accumulated cost at fire time.
    CostReduction(f64),
    ShieldDamage(i32),
    HullDamage(i32),
}

/// One catalog entry. Read-only reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDefinition {
    pub name: String,
    pub phase: EventPhase,
    pub target: EventTarget,
    pub probability: f64,
    #[serde(default)]
    pub effects: SmallVec<[EffectKind; 2]>,
}

/// Container for all event definitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EventCatalog {
    pub events: Vec<EventDefinition>,
}

impl EventCatalog {
    /// Create an empty catalog (useful for tests).
    #[must_use]
    pub fn empty() -> Self {
        Self { events: Vec::new() }
    }

    /// Load a catalog from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into valid definitions.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The built-in hazard catalog shipped with the engine.
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_json(include_str!("../assets/events.json"))
            .expect("bundled event catalog is valid JSON")
    }

    #[must_use]
    pub fn from_events(events: Vec<EventDefinition>) -> Self {
        Self { events }
    }
}

fn percent(value: f64) -> i64 {
    (value * 100.0) as i64
}

/// Apply the day's probabilistic events to a mission/ship pair.
///
/// The phase is derived from the summary: zero yield means a travel day.
/// An `api_event` is merged into the candidates with probability forced to
/// 1.0, enabling deterministic externally-triggered events. Returns true when
/// the ship was destroyed this day; the caller halts further progression.
pub fn apply_daily_events<R: Rng + ?Sized>(
    catalog: &EventCatalog,
    mission: &mut Mission,
    summary: &mut DaySummary,
    ship: &mut Ship,
    api_event: Option<&EventDefinition>,
    rng: &mut R,
) -> bool {
    let phase = if summary.total_kg == 0 {
        EventPhase::Travel
    } else {
        EventPhase::Mining
    };

    let mut candidates: Vec<EventDefinition> = Vec::with_capacity(catalog.events.len() + 1);
    if let Some(forced) = api_event {
        candidates.push(EventDefinition {
            probability: 1.0,
            phase,
            ..forced.clone()
        });
    }
    candidates.extend(catalog.events.iter().cloned());

    let mut day_yield_multiplier = 1.0_f64;
    let mut ship_destroyed = false;

    for event in &candidates {
        if event.phase != phase || !rng.gen_bool(event.probability.clamp(0.0, 1.0)) {
            continue;
        }
        summary.events.push(AppliedEvent {
            name: event.name.clone(),
            effects: event.effects.clone(),
        });
        log::info!("day {}: event fired: {}", summary.day, event.name);
        match event.target {
            EventTarget::Mission => {
                for effect in &event.effects {
                    match *effect {
                        EffectKind::YieldMultiplier(m) => {
                            if phase == EventPhase::Mining {
                                day_yield_multiplier *= m;
                                summary.note =
                                    format!("{}: Yield {}%", event.name, percent(m));
                            }
                        }
                        EffectKind::RevenueMultiplier(m) => {
                            mission.revenue_multiplier *= m;
                            summary.note = format!("{}: Revenue {}%", event.name, percent(m));
                        }
                        EffectKind::RepairCost(cost) => {
                            mission.ship_repair_cost += cost;
                            summary.note = format!("{}: Repair +${cost}", event.name);
                        }
                        EffectKind::DelayDays(days) => {
                            mission.adjust_travel_delays(days);
                            summary.note = format!("{}: Delay +{days} days", event.name);
                        }
                        EffectKind::ReduceDays(days) => {
                            mission.adjust_travel_delays(-days);
                            summary.note = format!("{}: Recovery -{days} days", event.name);
                        }
                        EffectKind::CostReduction(factor) => {
                            mission.mission_cost =
                                (mission.mission_cost as f64 * factor) as i64;
                            summary.note = format!(
                                "{}: Cost -{}%",
                                event.name,
                                percent(1.0 - factor)
                            );
                        }
                        EffectKind::ShieldDamage(_) | EffectKind::HullDamage(_) => {}
                    }
                }
            }
            EventTarget::Ship => {
                for effect in &event.effects {
                    match *effect {
                        EffectKind::ShieldDamage(damage) => {
                            ship.apply_shield_damage(damage);
                            summary.note = format!(
                                "{}: Shield -{damage} (Shield: {})",
                                event.name, ship.shield
                            );
                        }
                        EffectKind::HullDamage(damage) => {
                            let absorbed = ship.shield > 0;
                            let destroyed = ship.apply_hull_damage(damage);
                            if absorbed {
                                summary.note = format!(
                                    "{}: Shield -{damage} (Shield: {})",
                                    event.name, ship.shield
                                );
                            } else {
                                summary.note = format!(
                                    "{}: Hull -{damage} (Hull: {})",
                                    event.name, ship.hull
                                );
                            }
                            if destroyed {
                                ship_destroyed = true;
                                summary.note.push_str(NOTE_SHIP_DESTROYED);
                                log::warn!(
                                    "day {}: hull reached 0, ship destroyed",
                                    summary.day
                                );
                            }
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    // The day's yield multiplier scales this day's figures only; it does not
    // carry into later days.
    if phase == EventPhase::Mining && (day_yield_multiplier - 1.0).abs() > f64::EPSILON {
        summary.total_kg = (summary.total_kg as f64 * day_yield_multiplier) as i64;
        summary.daily_value = (summary.daily_value as f64 * day_yield_multiplier) as i64;
        for kg in summary.elements_mined.values_mut() {
            *kg = (*kg as f64 * day_yield_multiplier) as i64;
        }
    }

    ship_destroyed
}
