use std::collections::HashSet;

use battleship_lobby::{
    in_bounds, is_adjacent, occupied_cells, BoardRules, Cell, GameError, Orientation, RulesError,
    ShipKind,
};
use proptest::prelude::*;

#[test]
fn test_occupied_cells_horizontal_and_vertical() {
    let h = occupied_cells(Cell::new(2, 3), 3, Orientation::Horizontal);
    assert_eq!(h, vec![Cell::new(2, 3), Cell::new(3, 3), Cell::new(4, 3)]);

    let v = occupied_cells(Cell::new(7, 1), 4, Orientation::Vertical);
    assert_eq!(
        v,
        vec![Cell::new(7, 1), Cell::new(7, 2), Cell::new(7, 3), Cell::new(7, 4)]
    );
}

#[test]
fn test_in_bounds_respects_margin() {
    // margin 0: [0, 10)
    assert!(in_bounds(Cell::new(0, 0), 10, 0));
    assert!(in_bounds(Cell::new(9, 9), 10, 0));
    assert!(!in_bounds(Cell::new(10, 0), 10, 0));

    // margin 1: [1, 11)
    assert!(!in_bounds(Cell::new(0, 5), 10, 1));
    assert!(!in_bounds(Cell::new(5, 0), 10, 1));
    assert!(in_bounds(Cell::new(1, 1), 10, 1));
    assert!(in_bounds(Cell::new(10, 10), 10, 1));
    assert!(!in_bounds(Cell::new(11, 1), 10, 1));
}

#[test]
fn test_rules_reject_unrepresentable_boards() {
    assert_eq!(
        BoardRules::new(10, 250, true),
        Err(RulesError::OutOfRange {
            grid_size: 10,
            margin: 250,
        })
    );
    assert_eq!(BoardRules::new(0, 0, true), Err(RulesError::EmptyGrid));

    // the largest board that still fits
    let rules = BoardRules::new(10, 245, true).unwrap();
    assert_eq!(rules.cells().count(), 100);
    assert!(rules.cells().all(|c| rules.contains(c)));
    assert!(rules.contains(Cell::new(254, 254)));
    assert!(BoardRules::default().validate().is_ok());
}

#[test]
fn test_neighbours_and_adjacency() {
    assert_eq!(Cell::new(0, 0).neighbours().count(), 3);
    assert_eq!(Cell::new(5, 5).neighbours().count(), 8);

    let occupied: HashSet<Cell> = [Cell::new(4, 4)].into_iter().collect();
    assert!(is_adjacent(Cell::new(5, 5), &occupied)); // diagonal
    assert!(is_adjacent(Cell::new(4, 3), &occupied));
    assert!(!is_adjacent(Cell::new(6, 4), &occupied));
    // a cell is not its own neighbour
    assert!(!is_adjacent(Cell::new(4, 4), &occupied));
}

#[test]
fn test_cell_id_parse_and_display() {
    let cell: Cell = "3,4".parse().unwrap();
    assert_eq!(cell, Cell::new(3, 4));
    assert_eq!(cell.to_string(), "3,4");
    assert!("3".parse::<Cell>().is_err());
    assert!("a,b".parse::<Cell>().is_err());
}

#[test]
fn test_letter_notation() {
    let rules = BoardRules::default();
    assert_eq!(rules.parse_cell("A0"), Some(Cell::new(0, 0)));
    assert_eq!(rules.parse_cell("J9"), Some(Cell::new(9, 9)));
    assert_eq!(rules.parse_cell("c7"), Some(Cell::new(2, 7)));
    assert_eq!(rules.parse_cell("3,4"), Some(Cell::new(3, 4)));
    assert_eq!(rules.parse_cell(""), None);
    assert_eq!(rules.parse_cell("1A"), None);
    assert_eq!(rules.notation(Cell::new(2, 7)), "C7");

    let offset = BoardRules {
        board_margin: 1,
        ..BoardRules::default()
    };
    assert_eq!(offset.parse_cell("A0"), Some(Cell::new(1, 1)));
    assert_eq!(offset.notation(Cell::new(1, 1)), "A0");
}

#[test]
fn test_orientation_and_ship_names_parse() {
    assert_eq!("h".parse::<Orientation>().unwrap(), Orientation::Horizontal);
    assert_eq!("Vertical".parse::<Orientation>().unwrap(), Orientation::Vertical);
    assert!("diagonal".parse::<Orientation>().is_err());

    assert_eq!("carrier".parse::<ShipKind>().unwrap(), ShipKind::Carrier);
    assert_eq!("DESTROYER".parse::<ShipKind>().unwrap(), ShipKind::Destroyer);
    assert!(matches!(
        "Dinghy".parse::<ShipKind>(),
        Err(GameError::UnknownShip { .. })
    ));
}

#[test]
fn test_board_cells_cover_grid_once() {
    let rules = BoardRules {
        board_margin: 1,
        ..BoardRules::default()
    };
    let cells: HashSet<Cell> = rules.cells().collect();
    assert_eq!(cells.len(), rules.cell_count());
    assert!(cells.iter().all(|c| rules.contains(*c)));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn occupied_cells_form_a_contiguous_line(
        x in 0u8..=200,
        y in 0u8..=200,
        length in 1u8..=5,
        vertical in any::<bool>(),
    ) {
        let orientation = if vertical { Orientation::Vertical } else { Orientation::Horizontal };
        let cells = occupied_cells(Cell::new(x, y), length, orientation);
        prop_assert_eq!(cells.len(), length as usize);
        for (i, cell) in cells.iter().enumerate() {
            let i = i as u8;
            if vertical {
                prop_assert_eq!(*cell, Cell::new(x, y + i));
            } else {
                prop_assert_eq!(*cell, Cell::new(x + i, y));
            }
        }
    }
}
