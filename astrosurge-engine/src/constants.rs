//! Game balance constants shared across the engine.

/// Simulated mining hours per day.
pub const HOURS_PER_DAY: i64 = 24;

/// Commodities that fetch a market price when sold on Earth.
pub const COMMODITIES: [&str; 5] = ["Copper", "Silver", "Palladium", "Platinum", "Gold"];

/// Commodities carrying the premium weighting class.
pub const PRECIOUS_COMMODITIES: [&str; 2] = ["Platinum", "Gold"];

/// Maximum shield and hull integrity.
pub const INTEGRITY_MAX: i32 = 100;

/// Overrun window granted to users with no explicit allowance.
pub const DEFAULT_MAX_OVERRUN_DAYS: i64 = 10;

/// Lower bound of the per-day extraction fraction draw.
pub const ELEMENT_FRACTION_MIN: f64 = 0.01;

/// Upper bound of the per-day extraction fraction draw.
pub const ELEMENT_FRACTION_MAX: f64 = 0.10;

/// Scale applied to the drawn extraction fraction when sizing a mining day.
pub const DAILY_YIELD_SCALE: f64 = 3.0;

/// Most distinct elements a single extraction hour can pull.
pub const MAX_ELEMENTS_PER_HOUR: usize = 4;

/// Day-summary note used for an uneventful outbound travel day.
pub const NOTE_TRAVEL_OUT: &str = "Travel - No incident";

/// Day-summary note used for an uneventful return travel day.
pub const NOTE_TRAVEL_RETURN: &str = "Return Travel - No incident";

/// Day-summary note used for an uneventful mining day.
pub const NOTE_MINING: &str = "Mining - No incident";

/// Note suffix appended when hull integrity collapses.
pub const NOTE_SHIP_DESTROYED: &str = " - Ship Destroyed!";
