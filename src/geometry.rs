//! Board geometry: cells, orientations and the pure functions that map a ship
//! hull onto the grid.
//!
//! Coordinates are absolute board coordinates: a board with margin `m` and
//! edge length `n` covers `[m, m + n)` on both axes.

use core::fmt;
use core::str::FromStr;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// A single grid cell, addressed by column (`x`) and row (`y`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub x: u8,
    pub y: u8,
}

impl Cell {
    pub const fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    /// Neighbour at the given offset, if it is representable.
    pub fn offset(self, dx: i16, dy: i16) -> Option<Cell> {
        let x = u8::try_from(self.x as i16 + dx).ok()?;
        let y = u8::try_from(self.y as i16 + dy).ok()?;
        Some(Cell { x, y })
    }

    /// The up to eight cells surrounding this one.
    pub fn neighbours(self) -> impl Iterator<Item = Cell> {
        const OFFSETS: [(i16, i16); 8] = [
            (-1, -1),
            (0, -1),
            (1, -1),
            (-1, 0),
            (1, 0),
            (-1, 1),
            (0, 1),
            (1, 1),
        ];
        OFFSETS
            .into_iter()
            .filter_map(move |(dx, dy)| self.offset(dx, dy))
    }
}

/// Canonical cell id: `"x,y"`.
impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Error returned when a cell id cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCellError(pub String);

impl fmt::Display for ParseCellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid cell '{}'", self.0)
    }
}

impl std::error::Error for ParseCellError {}

impl FromStr for Cell {
    type Err = ParseCellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .trim()
            .split_once(',')
            .ok_or_else(|| ParseCellError(s.to_string()))?;
        let x = x.trim().parse().map_err(|_| ParseCellError(s.to_string()))?;
        let y = y.trim().parse().map_err(|_| ParseCellError(s.to_string()))?;
        Ok(Cell { x, y })
    }
}

/// Orientation of a ship on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    pub fn is_vertical(self) -> bool {
        matches!(self, Orientation::Vertical)
    }
}

impl FromStr for Orientation {
    type Err = ParseCellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "h" | "horizontal" => Ok(Orientation::Horizontal),
            "v" | "vertical" => Ok(Orientation::Vertical),
            other => Err(ParseCellError(other.to_string())),
        }
    }
}

/// Cells covered by a hull of `length` anchored at `anchor`, extending in +y
/// when vertical and +x otherwise. Cells past the coordinate range are
/// dropped, so a truncated result is always rejected by the bounds check.
pub fn occupied_cells(anchor: Cell, length: u8, orientation: Orientation) -> Vec<Cell> {
    debug_assert!(length > 0, "ship length must be positive");
    (0..length as i16)
        .filter_map(|i| match orientation {
            Orientation::Horizontal => anchor.offset(i, 0),
            Orientation::Vertical => anchor.offset(0, i),
        })
        .collect()
}

/// Whether `cell` lies in `[margin, margin + grid_size)` on both axes.
pub fn in_bounds(cell: Cell, grid_size: u8, margin: u8) -> bool {
    let lo = margin as u16;
    let hi = lo + grid_size as u16;
    let (x, y) = (cell.x as u16, cell.y as u16);
    x >= lo && x < hi && y >= lo && y < hi
}

/// True if any of the eight neighbours of `cell` is occupied.
pub fn is_adjacent(cell: Cell, occupied: &HashSet<Cell>) -> bool {
    cell.neighbours().any(|n| occupied.contains(&n))
}
