//! Placement legality and random fleet placement.

use std::collections::HashSet;

use rand::Rng;

use crate::board::Fleet;
use crate::common::{GameError, PlacementViolation};
use crate::config::{BoardRules, MAX_PLACEMENT_ATTEMPTS};
use crate::geometry::{is_adjacent, Cell, Orientation};
use crate::ship::Placement;

/// Check a hull of `length` at `placement` against the cells already
/// occupied by other ships.
pub fn validate_placement(
    placement: Placement,
    length: u8,
    occupied: &HashSet<Cell>,
    rules: &BoardRules,
) -> Result<(), PlacementViolation> {
    let cells = placement.cells(length);
    if cells.len() != length as usize || !cells.iter().all(|c| rules.contains(*c)) {
        return Err(PlacementViolation::OutOfBounds);
    }
    if cells.iter().any(|c| occupied.contains(c)) {
        return Err(PlacementViolation::Overlap);
    }
    if rules.adjacency_required && cells.iter().any(|c| is_adjacent(*c, occupied)) {
        return Err(PlacementViolation::Adjacent);
    }
    Ok(())
}

pub fn is_valid_placement(
    placement: Placement,
    length: u8,
    occupied: &HashSet<Cell>,
    rules: &BoardRules,
) -> bool {
    validate_placement(placement, length, occupied, rules).is_ok()
}

/// Place every ship of `fleet` at a random legal position.
///
/// Ships are placed in fleet order, each validated against the ships placed
/// before it in the same pass. Each ship gets [`MAX_PLACEMENT_ATTEMPTS`]
/// samples; if one runs out the fleet is left unchanged and
/// `PlacementExhausted` is returned.
pub fn random_placement<R: Rng + ?Sized>(
    fleet: &mut Fleet,
    rules: &BoardRules,
    rng: &mut R,
) -> Result<(), GameError> {
    if fleet.is_ready() {
        return Err(GameError::FleetLocked);
    }
    let mut candidate = fleet.clone();
    candidate.clear();
    let mut occupied = HashSet::new();

    for kind in candidate.ships().iter().map(|s| s.kind()).collect::<Vec<_>>() {
        let length = kind.length();
        let placement = sample_placement(length, &occupied, rules, rng).ok_or(
            GameError::PlacementExhausted {
                ship: kind,
                attempts: MAX_PLACEMENT_ATTEMPTS,
            },
        )?;
        occupied.extend(placement.cells(length));
        candidate.place(kind, placement, rules)?;
    }

    *fleet = candidate;
    Ok(())
}

fn sample_placement<R: Rng + ?Sized>(
    length: u8,
    occupied: &HashSet<Cell>,
    rules: &BoardRules,
    rng: &mut R,
) -> Option<Placement> {
    if length == 0 || length > rules.grid_size {
        return None;
    }
    let lo = rules.board_margin;
    let span = rules.grid_size - length;
    for _ in 0..MAX_PLACEMENT_ATTEMPTS {
        let orientation = if rng.random() {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        };
        let (max_x, max_y) = match orientation {
            Orientation::Horizontal => (span, rules.grid_size - 1),
            Orientation::Vertical => (rules.grid_size - 1, span),
        };
        let x = lo.checked_add(rng.random_range(0..=max_x))?;
        let y = lo.checked_add(rng.random_range(0..=max_y))?;
        let placement = Placement::new(Cell::new(x, y), orientation);
        if is_valid_placement(placement, length, occupied, rules) {
            return Some(placement);
        }
    }
    None
}
