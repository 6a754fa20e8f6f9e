//! Travel-day simulation.
use rand::Rng;

use crate::constants::{NOTE_TRAVEL_OUT, NOTE_TRAVEL_RETURN};
use crate::events::{EventCatalog, apply_daily_events};
use crate::mission::{DaySummary, Mission};
use crate::ship::Ship;

/// Simulate one travel day, outbound or return.
///
/// Travel days carry no yield; the zero total marks the summary as
/// travel-phase for event selection. Returns the day's summary and whether
/// the ship was destroyed by an event.
pub fn simulate_travel_day<R: Rng + ?Sized>(
    mission: &mut Mission,
    ship: &mut Ship,
    catalog: &EventCatalog,
    day: u32,
    is_return: bool,
    rng: &mut R,
) -> (DaySummary, bool) {
    let note = if is_return {
        NOTE_TRAVEL_RETURN
    } else {
        NOTE_TRAVEL_OUT
    };
    let mut summary = DaySummary::empty(day, note);
    let destroyed = apply_daily_events(catalog, mission, &mut summary, ship, None, rng);
    (summary, destroyed)
}
