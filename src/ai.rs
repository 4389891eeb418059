//! Move policy for the automated opponent: uniform over unguessed cells.

use std::collections::HashSet;

use rand::seq::IndexedRandom;
use rand::Rng;

use crate::config::BoardRules;
use crate::geometry::Cell;

/// Pick a not-yet-guessed cell uniformly at random. Returns `None` once every
/// cell on the board has been guessed.
pub fn choose_move<R: Rng + ?Sized>(
    guessed: &HashSet<Cell>,
    rules: &BoardRules,
    rng: &mut R,
) -> Option<Cell> {
    let available: Vec<Cell> = rules.cells().filter(|c| !guessed.contains(c)).collect();
    available.choose(rng).copied()
}
