//! Shot resolution against a single fleet.

use crate::board::Fleet;
use crate::common::ShotResult;
use crate::geometry::Cell;

/// Resolve a shot at `cell`. A hit is recorded on the ship covering the
/// cell; resolving the same cell again reports the same result without
/// counting the hit twice. Fleet defeat is left to the caller.
pub fn resolve_shot(cell: Cell, fleet: &mut Fleet) -> ShotResult {
    match fleet.ship_at_mut(cell) {
        Some(ship) => {
            ship.register_hit(cell);
            ShotResult {
                hit: true,
                sunk: ship.is_sunk(),
                ship: Some(ship.kind()),
            }
        }
        None => ShotResult::MISS,
    }
}
