//! AstroSurge Mission Engine
//!
//! Platform-agnostic core of the asteroid-mining business simulation: the
//! daily mission-progression state machine, day simulators, event engine,
//! and financial settlement, behind trait seams for persistence and market
//! prices. No transport, storage, or UI dependencies live here.

pub mod asteroid;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod market;
pub mod mission;
pub mod planning;
pub mod rng;
pub mod ship;
pub mod sim;
pub mod stores;

// Re-export commonly used types
pub use asteroid::{Asteroid, ElementDeposit, WeightedElement, build_weighted_elements};
pub use config::{ConfigError, MiningGlobals};
pub use error::{EngineError, ResourceKind, StoreError};
pub use events::{
    EffectKind, EventCatalog, EventDefinition, EventPhase, EventTarget, apply_daily_events,
};
pub use market::{FallbackProvider, MarketPriceProvider, PriceTable, StaticPriceTable};
pub use mission::{AppliedEvent, DaySummary, Mission, MissionEvent, MissionStatus};
pub use planning::{MissionProjection, average_daily_yield, calculate_confidence, plan_mission};
pub use rng::{CountingRng, RngBundle};
pub use ship::{CargoLot, Ship};
pub use sim::{DayContext, DayOutcome, MissionEngine, MissionPhase, MissionReport};
pub use sim::mining::simulate_mining_day;
pub use sim::progression::advance_mission;
pub use sim::runner::run_to_completion;
pub use sim::settlement::settle_mission;
pub use sim::travel::simulate_travel_day;
pub use stores::{
    AsteroidStore, Backend, ConfigStore, MemoryStore, MissionStore, ShipStore, UserProfile,
    UserStore,
};
