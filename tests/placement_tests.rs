use std::collections::HashSet;

use battleship_lobby::{
    random_placement, validate_placement, BoardRules, Cell, Fleet, GameError, Placement,
    PlacementViolation, ShipKind, FLEET, TOTAL_SHIP_CELLS,
};
use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;

fn touching() -> BoardRules {
    BoardRules {
        adjacency_required: false,
        ..BoardRules::default()
    }
}

#[test]
fn test_adjacent_placement_rejected_when_buffer_enforced() {
    let rules = BoardRules::default();
    let mut fleet = Fleet::new();
    fleet
        .place(ShipKind::Carrier, Placement::horizontal(1, 1), &rules)
        .unwrap();

    // end to end with the carrier
    let err = fleet
        .place(ShipKind::Battleship, Placement::horizontal(6, 1), &rules)
        .unwrap_err();
    assert_eq!(
        err,
        GameError::InvalidPlacement {
            ship: ShipKind::Battleship,
            reason: PlacementViolation::Adjacent,
        }
    );

    // directly below the carrier
    let err = fleet
        .place(ShipKind::Battleship, Placement::horizontal(1, 2), &rules)
        .unwrap_err();
    assert!(matches!(
        err,
        GameError::InvalidPlacement {
            reason: PlacementViolation::Adjacent,
            ..
        }
    ));
    assert!(!fleet.ship(ShipKind::Battleship).is_placed());

    // one empty row in between is fine
    fleet
        .place(ShipKind::Battleship, Placement::horizontal(1, 3), &rules)
        .unwrap();
}

#[test]
fn test_adjacent_placement_accepted_when_touching_allowed() {
    let rules = touching();
    let mut fleet = Fleet::new();
    fleet
        .place(ShipKind::Carrier, Placement::horizontal(1, 1), &rules)
        .unwrap();
    fleet
        .place(ShipKind::Battleship, Placement::horizontal(6, 1), &rules)
        .unwrap();
    fleet
        .place(ShipKind::Cruiser, Placement::horizontal(1, 2), &rules)
        .unwrap();

    // overlap is still illegal
    let err = fleet
        .place(ShipKind::Destroyer, Placement::vertical(3, 0), &rules)
        .unwrap_err();
    assert!(matches!(
        err,
        GameError::InvalidPlacement {
            reason: PlacementViolation::Overlap,
            ..
        }
    ));
}

#[test]
fn test_out_of_bounds_with_and_without_margin() {
    let rules = BoardRules::default();
    let none = HashSet::new();
    assert_eq!(
        validate_placement(Placement::horizontal(6, 0), 5, &none, &rules),
        Err(PlacementViolation::OutOfBounds)
    );
    assert_eq!(
        validate_placement(Placement::horizontal(5, 0), 5, &none, &rules),
        Ok(())
    );
    assert_eq!(
        validate_placement(Placement::vertical(0, 250), 5, &none, &rules),
        Err(PlacementViolation::OutOfBounds)
    );

    let offset = BoardRules {
        board_margin: 1,
        ..BoardRules::default()
    };
    assert_eq!(
        validate_placement(Placement::horizontal(0, 1), 2, &none, &offset),
        Err(PlacementViolation::OutOfBounds)
    );
    assert_eq!(
        validate_placement(Placement::horizontal(9, 10), 2, &none, &offset),
        Ok(())
    );
    assert_eq!(
        validate_placement(Placement::vertical(10, 10), 2, &none, &offset),
        Err(PlacementViolation::OutOfBounds)
    );
}

#[test]
fn test_replacing_a_ship_ignores_its_old_cells() {
    let rules = BoardRules::default();
    let mut fleet = Fleet::new();
    fleet
        .place(ShipKind::Destroyer, Placement::horizontal(0, 0), &rules)
        .unwrap();
    // moving a ship one cell over must not collide with itself
    fleet
        .place(ShipKind::Destroyer, Placement::horizontal(1, 0), &rules)
        .unwrap();
    assert_eq!(
        fleet.ship(ShipKind::Destroyer).cells(),
        vec![Cell::new(1, 0), Cell::new(2, 0)]
    );
}

#[test]
fn test_locked_fleet_rejects_changes() {
    let rules = BoardRules::default();
    let mut rng = SmallRng::seed_from_u64(7);
    let mut fleet = Fleet::new();
    assert_eq!(fleet.lock(), Err(GameError::FleetIncomplete { unplaced: 5 }));

    random_placement(&mut fleet, &rules, &mut rng).unwrap();
    fleet.lock().unwrap();
    assert_eq!(
        fleet.place(ShipKind::Destroyer, Placement::horizontal(0, 0), &rules),
        Err(GameError::FleetLocked)
    );
    assert_eq!(
        random_placement(&mut fleet, &rules, &mut rng),
        Err(GameError::FleetLocked)
    );
}

#[test]
fn test_random_placement_fails_closed_on_tiny_board() {
    let rules = BoardRules {
        grid_size: 4,
        ..BoardRules::default()
    };
    let mut rng = SmallRng::seed_from_u64(1);
    let mut fleet = Fleet::new();
    let err = random_placement(&mut fleet, &rules, &mut rng).unwrap_err();
    assert!(matches!(err, GameError::PlacementExhausted { .. }));
    // nothing half-placed is left behind
    assert_eq!(fleet.unplaced(), FLEET.len());
}

#[test]
fn test_random_placement_fails_closed_when_crowded() {
    // every hull fits on its own, the fleet cannot fit with a buffer
    let rules = BoardRules {
        grid_size: 5,
        ..BoardRules::default()
    };
    let mut rng = SmallRng::seed_from_u64(3);
    let mut fleet = Fleet::new();
    assert!(matches!(
        random_placement(&mut fleet, &rules, &mut rng),
        Err(GameError::PlacementExhausted { .. })
    ));
    assert_eq!(fleet.unplaced(), FLEET.len());
}

fn assert_legal(fleet: &Fleet, rules: &BoardRules) -> Result<(), TestCaseError> {
    prop_assert!(fleet.all_placed());
    prop_assert_eq!(fleet.occupied().len(), TOTAL_SHIP_CELLS);
    for ship in fleet.ships() {
        let placement = ship.placement().unwrap();
        let others = fleet.occupied_except(ship.kind());
        prop_assert_eq!(
            validate_placement(placement, ship.length(), &others, rules),
            Ok(())
        );
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn random_placement_is_always_legal(seed in any::<u64>(), margin in 0u8..=2, touch in any::<bool>()) {
        let rules = BoardRules {
            grid_size: 10,
            board_margin: margin,
            adjacency_required: !touch,
        };
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut fleet = Fleet::new();
        random_placement(&mut fleet, &rules, &mut rng).unwrap();
        assert_legal(&fleet, &rules)?;
    }

    #[test]
    fn validate_rejects_any_overlap(seed in any::<u64>(), x in 0u8..10, y in 0u8..10, vertical in any::<bool>()) {
        let rules = touching();
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut fleet = Fleet::new();
        random_placement(&mut fleet, &rules, &mut rng).unwrap();
        let occupied = fleet.occupied();
        let placement = if vertical { Placement::vertical(x, y) } else { Placement::horizontal(x, y) };
        let cells = placement.cells(2);
        let on_board = cells.iter().all(|c| rules.contains(*c));
        if on_board && cells.iter().any(|c| occupied.contains(c)) {
            prop_assert_eq!(
                validate_placement(placement, 2, &occupied, &rules),
                Err(PlacementViolation::Overlap)
            );
        }
    }
}
