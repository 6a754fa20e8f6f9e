//! Persistence collaborator contracts and the in-memory backend.
//!
//! The engine only ever talks to these traits; a database layer implements
//! them at the process boundary. `MemoryStore` is the single-process backend
//! used by the batch driver and the test suites.

use std::cell::RefCell;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::asteroid::Asteroid;
use crate::config::MiningGlobals;
use crate::constants::DEFAULT_MAX_OVERRUN_DAYS;
use crate::error::{ResourceKind, StoreError};
use crate::mission::Mission;
use crate::ship::Ship;

/// Account snapshot of a mission owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub company_name: String,
    #[serde(default)]
    pub bank: i64,
    /// Lifetime count of loans taken; indexes the interest-rate ladder.
    #[serde(default)]
    pub loan_count: u32,
    /// Outstanding repayment owed to investors, zero when clear.
    #[serde(default)]
    pub current_loan: i64,
    #[serde(default = "UserProfile::default_max_overrun_days")]
    pub max_overrun_days: i64,
}

impl UserProfile {
    const fn default_max_overrun_days() -> i64 {
        DEFAULT_MAX_OVERRUN_DAYS
    }

    /// A fresh account with the given starting bank balance.
    #[must_use]
    pub fn new(id: &str, username: &str, company_name: &str, bank: i64) -> Self {
        Self {
            id: id.to_string(),
            username: username.to_string(),
            company_name: company_name.to_string(),
            bank,
            loan_count: 0,
            current_loan: 0,
            max_overrun_days: Self::default_max_overrun_days(),
        }
    }
}

/// Source of the process-wide mining configuration.
pub trait ConfigStore {
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the configuration document is absent,
    /// which is fatal for the calling operation.
    fn mining_globals(&self) -> Result<MiningGlobals, StoreError>;
}

/// Ship persistence. Updates replace the whole document atomically.
pub trait ShipStore {
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no such ship exists for the user.
    fn get_ship(&self, user_id: &str, ship_name: &str) -> Result<Ship, StoreError>;

    /// # Errors
    ///
    /// Returns a [`StoreError`] on write failure.
    fn update_ship(&self, user_id: &str, ship: &Ship) -> Result<(), StoreError>;
}

/// Asteroid persistence with destructive element decrement.
pub trait AsteroidStore {
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no such asteroid exists.
    fn get_asteroid(&self, full_name: &str) -> Result<Asteroid, StoreError>;

    /// Decrement an element's remaining mass, never below zero. Returns the
    /// mass actually removed, which may be less than requested.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the asteroid is missing or the write
    /// fails.
    fn decrement_element_mass(
        &self,
        full_name: &str,
        element_name: &str,
        amount_kg: i64,
    ) -> Result<i64, StoreError>;
}

/// User account persistence.
pub trait UserStore {
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown user id.
    fn get_user(&self, user_id: &str) -> Result<UserProfile, StoreError>;

    /// # Errors
    ///
    /// Returns a [`StoreError`] on write failure.
    fn update_user(&self, user: &UserProfile) -> Result<(), StoreError>;
}

/// Mission persistence. Updates replace the whole document atomically.
pub trait MissionStore {
    /// # Errors
    ///
    /// Returns a [`StoreError`] on write failure.
    fn insert_mission(&self, mission: &Mission) -> Result<(), StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown mission id.
    fn get_mission(&self, mission_id: u64) -> Result<Mission, StoreError>;

    /// # Errors
    ///
    /// Returns a [`StoreError`] on write failure.
    fn update_mission(&self, mission: &Mission) -> Result<(), StoreError>;

    /// Ids of all active missions owned by the user.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] on read failure.
    fn active_mission_ids(&self, user_id: &str) -> Result<Vec<u64>, StoreError>;

    /// Debt handed forward by the user's most recently settled mission.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] on read failure.
    fn carried_debt(&self, user_id: &str) -> Result<i64, StoreError>;
}

/// The full persistence surface the engine requires.
pub trait Backend: ConfigStore + ShipStore + AsteroidStore + UserStore + MissionStore {}

impl<T: ConfigStore + ShipStore + AsteroidStore + UserStore + MissionStore> Backend for T {}

/// Single-process in-memory backend.
///
/// Interior mutability keeps the store shareable by reference across the
/// engine and its callers; the engine itself is single-threaded.
#[derive(Debug, Default)]
pub struct MemoryStore {
    globals: RefCell<Option<MiningGlobals>>,
    ships: RefCell<HashMap<(String, String), Ship>>,
    asteroids: RefCell<HashMap<String, Asteroid>>,
    users: RefCell<HashMap<String, UserProfile>>,
    missions: RefCell<HashMap<u64, Mission>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the configuration document.
    pub fn put_globals(&self, globals: MiningGlobals) {
        *self.globals.borrow_mut() = Some(globals);
    }

    pub fn put_ship(&self, user_id: &str, ship: Ship) {
        self.ships
            .borrow_mut()
            .insert((user_id.to_string(), ship.name.clone()), ship);
    }

    pub fn put_asteroid(&self, asteroid: Asteroid) {
        self.asteroids
            .borrow_mut()
            .insert(asteroid.full_name.clone(), asteroid);
    }

    pub fn put_user(&self, user: UserProfile) {
        self.users.borrow_mut().insert(user.id.clone(), user);
    }
}

impl ConfigStore for MemoryStore {
    fn mining_globals(&self) -> Result<MiningGlobals, StoreError> {
        self.globals
            .borrow()
            .clone()
            .ok_or_else(|| StoreError::not_found(ResourceKind::Config, "mining_globals"))
    }
}

impl ShipStore for MemoryStore {
    fn get_ship(&self, user_id: &str, ship_name: &str) -> Result<Ship, StoreError> {
        self.ships
            .borrow()
            .get(&(user_id.to_string(), ship_name.to_string()))
            .cloned()
            .ok_or_else(|| StoreError::not_found(ResourceKind::Ship, ship_name))
    }

    fn update_ship(&self, user_id: &str, ship: &Ship) -> Result<(), StoreError> {
        self.ships
            .borrow_mut()
            .insert((user_id.to_string(), ship.name.clone()), ship.clone());
        Ok(())
    }
}

impl AsteroidStore for MemoryStore {
    fn get_asteroid(&self, full_name: &str) -> Result<Asteroid, StoreError> {
        self.asteroids
            .borrow()
            .get(full_name)
            .cloned()
            .ok_or_else(|| StoreError::not_found(ResourceKind::Asteroid, full_name))
    }

    fn decrement_element_mass(
        &self,
        full_name: &str,
        element_name: &str,
        amount_kg: i64,
    ) -> Result<i64, StoreError> {
        let mut asteroids = self.asteroids.borrow_mut();
        let asteroid = asteroids
            .get_mut(full_name)
            .ok_or_else(|| StoreError::not_found(ResourceKind::Asteroid, full_name))?;
        let Some(deposit) = asteroid.elements.iter_mut().find(|e| e.name == element_name) else {
            return Ok(0);
        };
        let removed = amount_kg.max(0).min(deposit.mass_kg);
        deposit.mass_kg -= removed;
        Ok(removed)
    }
}

impl UserStore for MemoryStore {
    fn get_user(&self, user_id: &str) -> Result<UserProfile, StoreError> {
        self.users
            .borrow()
            .get(user_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(ResourceKind::User, user_id))
    }

    fn update_user(&self, user: &UserProfile) -> Result<(), StoreError> {
        self.users.borrow_mut().insert(user.id.clone(), user.clone());
        Ok(())
    }
}

impl MissionStore for MemoryStore {
    fn insert_mission(&self, mission: &Mission) -> Result<(), StoreError> {
        self.missions.borrow_mut().insert(mission.id, mission.clone());
        Ok(())
    }

    fn get_mission(&self, mission_id: u64) -> Result<Mission, StoreError> {
        self.missions
            .borrow()
            .get(&mission_id)
            .cloned()
            .ok_or_else(|| {
                StoreError::not_found(ResourceKind::Mission, &mission_id.to_string())
            })
    }

    fn update_mission(&self, mission: &Mission) -> Result<(), StoreError> {
        self.missions.borrow_mut().insert(mission.id, mission.clone());
        Ok(())
    }

    fn active_mission_ids(&self, user_id: &str) -> Result<Vec<u64>, StoreError> {
        let mut ids: Vec<u64> = self
            .missions
            .borrow()
            .values()
            .filter(|m| m.user_id == user_id && !m.status.is_terminal())
            .map(|m| m.id)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }

    fn carried_debt(&self, user_id: &str) -> Result<i64, StoreError> {
        Ok(self
            .missions
            .borrow()
            .values()
            .filter(|m| m.user_id == user_id && m.status.is_terminal())
            .max_by_key(|m| m.completed_at)
            .map_or(0, |m| m.previous_debt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asteroid::ElementDeposit;

    #[test]
    fn missing_config_is_not_found() {
        let store = MemoryStore::new();
        assert!(store.mining_globals().is_err());
        store.put_globals(MiningGlobals::default());
        assert!(store.mining_globals().is_ok());
    }

    #[test]
    fn decrement_clamps_at_zero() {
        let store = MemoryStore::new();
        store.put_asteroid(Asteroid {
            full_name: "433 Eros".to_string(),
            moid_days: 10,
            elements: vec![ElementDeposit {
                name: "Gold".to_string(),
                mass_kg: 100,
            }],
            commodity_factor: 1.0,
        });
        assert_eq!(
            store.decrement_element_mass("433 Eros", "Gold", 70).unwrap(),
            70
        );
        assert_eq!(
            store.decrement_element_mass("433 Eros", "Gold", 70).unwrap(),
            30
        );
        assert_eq!(
            store.decrement_element_mass("433 Eros", "Gold", 70).unwrap(),
            0
        );
        assert_eq!(
            store
                .decrement_element_mass("433 Eros", "Silver", 10)
                .unwrap(),
            0
        );
        let asteroid = store.get_asteroid("433 Eros").unwrap();
        assert_eq!(asteroid.element_mass("Gold"), 0);
    }

    #[test]
    fn active_mission_ids_skip_terminal() {
        use crate::mission::MissionStatus;

        let store = MemoryStore::new();
        for (id, status) in [
            (1, MissionStatus::Active),
            (2, MissionStatus::Completed),
            (3, MissionStatus::Active),
        ] {
            let mut mission = Mission::create(id, "u-1", "Artemis", "433 Eros", 1, 1, 1, 3, 0);
            mission.status = status;
            store.insert_mission(&mission).unwrap();
        }
        assert_eq!(store.active_mission_ids("u-1").unwrap(), vec![1, 3]);
    }
}
