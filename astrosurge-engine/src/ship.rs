//! Mining vessel state and damage model.
use serde::{Deserialize, Serialize};

use crate::constants::INTEGRITY_MAX;

/// One lot of extracted material held in the ship's cargo bay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CargoLot {
    pub name: String,
    pub mass_kg: i64,
}

/// A mining vessel owned by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ship {
    pub name: String,
    /// Cargo capacity in kg; defines the yield target of its missions.
    pub capacity_kg: i64,
    /// Extraction rate in kg per hour.
    pub mining_power: i64,
    #[serde(default = "Ship::default_integrity")]
    pub shield: i32,
    #[serde(default = "Ship::default_integrity")]
    pub hull: i32,
    /// Travel-days from Earth; mirrors the active mission's ship location.
    #[serde(default)]
    pub location: i64,
    /// Whether the ship is committed to an active mission.
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub destroyed: bool,
    #[serde(default)]
    pub cargo: Vec<CargoLot>,
    /// Completed mission count; drives the reuse discount.
    #[serde(default)]
    pub missions_flown: u32,
}

impl Ship {
    const fn default_integrity() -> i32 {
        INTEGRITY_MAX
    }

    /// Build a fresh ship docked at Earth with full integrity.
    #[must_use]
    pub fn new(name: &str, capacity_kg: i64, mining_power: i64) -> Self {
        Self {
            name: name.to_string(),
            capacity_kg,
            mining_power,
            shield: Self::default_integrity(),
            hull: Self::default_integrity(),
            location: 0,
            active: false,
            destroyed: false,
            cargo: Vec::new(),
            missions_flown: 0,
        }
    }

    /// Direct shield damage, floored at zero. Never touches the hull.
    pub fn apply_shield_damage(&mut self, damage: i32) {
        if damage <= 0 {
            return;
        }
        self.shield = (self.shield - damage).max(0);
    }

    /// Hull damage with shield absorption.
    ///
    /// While the shield holds any charge it soaks the full declared damage of
    /// the event; the hull is only reduced once the shield was already down
    /// when the hit landed. Returns true when the hull collapses to zero.
    pub fn apply_hull_damage(&mut self, damage: i32) -> bool {
        if damage <= 0 {
            return false;
        }
        if self.shield > 0 {
            self.shield = (self.shield - damage).max(0);
            return false;
        }
        self.hull = (self.hull - damage).max(0);
        if self.hull == 0 {
            self.destroyed = true;
            self.active = false;
        }
        self.destroyed
    }

    /// Restore shield and hull to full integrity. Destroyed ships stay dead.
    pub fn repair(&mut self) {
        if self.destroyed {
            return;
        }
        self.shield = Self::default_integrity();
        self.hull = Self::default_integrity();
    }

    /// Add extracted mass to the cargo manifest, merging same-name lots.
    pub fn load_cargo(&mut self, name: &str, mass_kg: i64) {
        if mass_kg <= 0 {
            return;
        }
        if let Some(lot) = self.cargo.iter_mut().find(|lot| lot.name == name) {
            lot.mass_kg += mass_kg;
        } else {
            self.cargo.push(CargoLot {
                name: name.to_string(),
                mass_kg,
            });
        }
    }

    /// Total mass currently in the cargo bay.
    #[must_use]
    pub fn cargo_mass_kg(&self) -> i64 {
        self.cargo.iter().map(|lot| lot.mass_kg).sum()
    }

    /// Empty the cargo bay, returning the removed lots.
    pub fn unload_cargo(&mut self) -> Vec<CargoLot> {
        std::mem::take(&mut self.cargo)
    }

    /// Whether the ship can be committed to a new mission.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        !self.destroyed && !self.active && self.location == 0
    }
}
