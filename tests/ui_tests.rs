use battleship_lobby::ui::{phase_label, render_view};
use battleship_lobby::{BoardRules, Cell, GameSession, Phase, PlayerId, Seat, SessionKey};
use rand::rngs::SmallRng;
use rand::SeedableRng;

#[test]
fn test_render_view_shows_both_boards() {
    let alice = PlayerId::from("alice");
    let mut game = GameSession::new(
        SessionKey::for_solo(&alice),
        alice,
        None,
        BoardRules::default(),
        SmallRng::seed_from_u64(3),
    )
    .unwrap();
    game.auto_place(Seat::A).unwrap();
    game.ready_up(Seat::A).unwrap();
    game.submit_shot(Seat::A, Cell::new(0, 0)).unwrap();

    let text = render_view(&game.view(Seat::A));
    assert!(text.contains("Session solo:alice"), "{}", text);
    assert!(text.contains("Your fleet"));
    assert!(text.contains("Target"));
    // the carrier is drawn on our own board
    assert!(text.contains('C'));
}

#[test]
fn test_phase_labels() {
    assert_eq!(phase_label(Phase::YourTurn), "your turn");
    assert_eq!(phase_label(Phase::Won), "you won");
}
