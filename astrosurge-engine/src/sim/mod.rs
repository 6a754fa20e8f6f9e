//! Simulation engine: day simulators, the progression state machine, and
//! the `MissionEngine` facade that binds them to a persistence backend.

pub mod mining;
pub mod progression;
pub mod runner;
pub mod settlement;
pub mod travel;

use std::rc::Rc;

pub use progression::{DayContext, DayOutcome, MissionPhase};
pub use runner::MissionReport;

use crate::config::{ConfigError, MiningGlobals};
use crate::error::{EngineError, StoreError};
use crate::events::EventCatalog;
use crate::market::{MarketPriceProvider, PriceTable, StaticPriceTable};
use crate::mission::Mission;
use crate::planning::plan_mission;
use crate::stores::Backend;

/// Facade binding a persistence backend, a market price source, the event
/// catalog, and a seeded RNG bundle into one mission-simulation engine.
pub struct MissionEngine<B, P>
where
    B: Backend,
    P: MarketPriceProvider,
{
    backend: B,
    market: P,
    catalog: EventCatalog,
    rng: Rc<crate::rng::RngBundle>,
    seed: u64,
    next_mission_id: std::cell::Cell<u64>,
}

impl<B, P> MissionEngine<B, P>
where
    B: Backend,
    P: MarketPriceProvider,
{
    /// Create an engine over the given collaborators.
    pub fn new(backend: B, market: P, catalog: EventCatalog, seed: u64) -> Self {
        Self {
            backend,
            market,
            catalog,
            rng: Rc::new(crate::rng::RngBundle::from_user_seed(seed)),
            seed,
            next_mission_id: std::cell::Cell::new(0),
        }
    }

    /// Access the underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The seed this engine's RNG streams derive from.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Replace the RNG bundle with streams derived from a new seed.
    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = Rc::new(crate::rng::RngBundle::from_user_seed(seed));
    }

    /// Current prices, falling back to the static table when the live
    /// provider is unreachable.
    fn prices(&self) -> PriceTable {
        match self.market.fetch_current() {
            Ok(prices) => prices,
            Err(err) => {
                log::warn!("market price fetch failed, using static table: {err}");
                StaticPriceTable::snapshot()
            }
        }
    }

    /// Load and validate the mining-globals snapshot.
    fn globals(&self) -> Result<MiningGlobals, EngineError> {
        let globals = self.backend.mining_globals().map_err(|err| match err {
            StoreError::NotFound { .. } => EngineError::Config(ConfigError::Missing),
            other => EngineError::from(other),
        })?;
        globals.validate()?;
        Ok(globals)
    }

    /// Plan and persist a new mission for a docked ship.
    ///
    /// # Errors
    ///
    /// Config, not-found, and store errors per the engine taxonomy. An
    /// unavailable ship (away from Earth, already committed, or destroyed)
    /// surfaces as not-found, matching the lookup the caller performed.
    pub fn start_mission(
        &self,
        user_id: &str,
        ship_name: &str,
        asteroid_name: &str,
    ) -> Result<Mission, EngineError> {
        let globals = self.globals()?;
        let mut user = self.backend.get_user(user_id)?;
        let mut ship = self.backend.get_ship(user_id, ship_name)?;
        if !ship.is_available() {
            return Err(EngineError::from(StoreError::not_found(
                crate::error::ResourceKind::Ship,
                ship_name,
            )));
        }
        let asteroid = self.backend.get_asteroid(asteroid_name)?;
        let previous_debt = self.backend.carried_debt(user_id)?;

        let id = self.next_mission_id.get() + 1;
        self.next_mission_id.set(id);

        let prices = self.prices();
        let mission = plan_mission(
            id,
            &mut user,
            &mut ship,
            &asteroid,
            &globals,
            &prices,
            previous_debt,
            &mut *self.rng.weights(),
        );
        self.backend.insert_mission(&mission)?;
        self.backend.update_ship(user_id, &ship)?;
        self.backend.update_user(&user)?;
        Ok(mission)
    }

    /// Advance one mission by one simulated day and persist the result.
    ///
    /// # Errors
    ///
    /// See [`progression::advance_mission`]; store failures while loading or
    /// persisting are surfaced per the engine taxonomy.
    pub fn advance_mission(&self, mission_id: u64, day: u32) -> Result<DayOutcome, EngineError> {
        let globals = self.globals()?;
        let mut mission = self.backend.get_mission(mission_id)?;
        let mut ship = self.backend.get_ship(&mission.user_id, &mission.ship_name)?;
        let mut user = self.backend.get_user(&mission.user_id)?;
        self.backend.get_asteroid(&mission.asteroid_name)?;
        let prices = self.prices();

        let ctx = DayContext {
            globals: &globals,
            catalog: &self.catalog,
            prices: &prices,
            asteroids: &self.backend,
            rng: &self.rng,
        };
        let outcome = progression::advance_mission(&mut mission, &mut ship, &mut user, day, &ctx)?;

        self.backend.update_mission(&mission)?;
        self.backend.update_ship(&mission.user_id, &ship)?;
        self.backend.update_user(&user)?;
        Ok(outcome)
    }

    /// Advance every active mission of a user by its next day.
    ///
    /// Missions are independent; one failing does not stop the others, and
    /// each error is reported alongside the mission id.
    ///
    /// # Errors
    ///
    /// Config and store errors raised before any mission was advanced.
    pub fn advance_all(
        &self,
        user_id: &str,
    ) -> Result<Vec<(u64, Result<DayOutcome, EngineError>)>, EngineError> {
        let ids = self.backend.active_mission_ids(user_id)?;
        let mut results = Vec::with_capacity(ids.len());
        for id in ids {
            let next_day = match self.backend.get_mission(id) {
                Ok(mission) => mission.days_into_mission() + 1,
                Err(err) => {
                    results.push((id, Err(EngineError::from(err))));
                    continue;
                }
            };
            results.push((id, self.advance_mission(id, next_day)));
        }
        Ok(results)
    }

    /// Run one mission to a terminal state, crediting the owner's bank.
    ///
    /// # Errors
    ///
    /// See [`runner::run_to_completion`].
    pub fn complete_mission(&self, mission_id: u64) -> Result<MissionReport, EngineError> {
        runner::run_to_completion(self, mission_id)
    }
}
