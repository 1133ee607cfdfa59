//! Betting legality: turn order, minimum raises and all-in edge cases.

mod common;

use common::{actor, assert_chips_conserved, check_down, deck, id, stack, table_with};
use holdem_table::{
    TableError, TableSettings,
    entities::{Action, ActionKind, Round},
};

#[test]
fn test_raise_must_match_last_raise() {
    let mut table = table_with(TableSettings::default(), &["a", "b", "c"]);
    table.deal_cards().unwrap();
    assert_eq!(actor(&table), id("a"));
    assert_eq!(table.current_bet(), 10);

    // No raise yet this round: the big blind is the minimum increment.
    assert_eq!(
        table.act(&id("a"), Action::Raise(15)),
        Err(TableError::BelowMinimumRaise { min: 20 })
    );
    assert_eq!(table.act(&id("a"), Action::Raise(20)), Ok(()));
    assert_eq!(table.last_raise(), Some(10));
    assert_eq!(table.current_bet(), 20);

    assert_eq!(
        table.act(&id("b"), Action::Raise(25)),
        Err(TableError::BelowMinimumRaise { min: 30 })
    );
    assert_eq!(table.act(&id("b"), Action::Raise(30)), Ok(()));
    assert_eq!(table.last_raise(), Some(10));

    // All-in is always allowed, whatever the minimum.
    assert_eq!(table.act(&id("c"), Action::Raise(1000)), Ok(()));
    assert_eq!(stack(&table, "c"), 0);
    assert_eq!(table.current_bet(), 1000);
    assert_eq!(table.last_raise(), Some(970));
    assert_chips_conserved(&table);
}

#[test]
fn test_raise_above_stack_is_invalid() {
    let mut table = table_with(TableSettings::default(), &["a", "b", "c"]);
    table.deal_cards().unwrap();
    assert_eq!(
        table.act(&id("a"), Action::Raise(1001)),
        Err(TableError::InvalidAmount)
    );
    assert_eq!(
        table.act(&id("a"), Action::Raise(10)),
        Err(TableError::BelowMinimumRaise { min: 20 })
    );
}

#[test]
fn test_bet_rules_on_an_open_round() {
    let mut table = table_with(TableSettings::default(), &["alice", "bob"]);
    table.deal_cards().unwrap();
    table.act(&id("alice"), Action::Call).unwrap();
    table.act(&id("bob"), Action::Check).unwrap();
    assert_eq!(table.current_round(), Some(Round::Flop));
    assert_eq!(actor(&table), id("bob"));

    let legal = table.legal_actions(&id("bob"));
    assert!(legal.contains_kind(ActionKind::Check));
    assert!(legal.contains_kind(ActionKind::Bet));
    assert!(!legal.contains_kind(ActionKind::Raise));
    assert!(!legal.contains_kind(ActionKind::Call));

    assert_eq!(
        table.act(&id("bob"), Action::Raise(20)),
        Err(TableError::IllegalAction {
            action: ActionKind::Raise
        })
    );
    assert_eq!(
        table.act(&id("bob"), Action::Bet(5)),
        Err(TableError::BelowMinimumRaise { min: 10 })
    );
    assert_eq!(
        table.act(&id("bob"), Action::Bet(2000)),
        Err(TableError::InvalidAmount)
    );
    assert_eq!(table.act(&id("bob"), Action::Bet(10)), Ok(()));
    assert_eq!(table.current_bet(), 10);
    assert_eq!(table.last_raise(), Some(10));

    let legal = table.legal_actions(&id("alice"));
    assert!(legal.contains_kind(ActionKind::Call));
    assert!(legal.contains_kind(ActionKind::Raise));
    assert!(!legal.contains_kind(ActionKind::Check));
}

#[test]
fn test_out_of_turn_changes_nothing() {
    let mut table = table_with(TableSettings::default(), &["a", "b", "c"]);
    table.deal_cards().unwrap();
    table.drain_events();
    let view = table.public_view();
    let key = table.turn_key();

    for player in ["b", "c"] {
        assert_eq!(table.act(&id(player), Action::Fold), Err(TableError::OutOfTurn));
        assert_eq!(table.act(&id(player), Action::Call), Err(TableError::OutOfTurn));
    }
    assert_eq!(
        table.act(&id("nobody"), Action::Check),
        Err(TableError::UnknownPlayer)
    );

    assert_eq!(table.public_view(), view);
    assert_eq!(table.turn_key(), key);
    assert!(table.drain_events().is_empty());
}

#[test]
fn test_failed_actions_leave_state_untouched() {
    let mut table = table_with(TableSettings::default(), &["a", "b", "c"]);
    table.deal_cards().unwrap();
    let view = table.public_view();
    let key = table.turn_key();

    assert!(table.act(&id("a"), Action::Check).is_err());
    assert!(table.act(&id("a"), Action::Bet(50)).is_err());
    assert!(table.act(&id("a"), Action::Raise(15)).is_err());
    assert!(table.act(&id("a"), Action::Raise(5000)).is_err());

    assert_eq!(table.public_view(), view);
    assert_eq!(table.turn_key(), key);
}

#[test]
fn test_full_raise_reopens_betting() {
    let mut table = table_with(TableSettings::default(), &["a", "b", "c"]);
    table.deal_cards().unwrap();
    table.act(&id("a"), Action::Raise(20)).unwrap();
    table.act(&id("b"), Action::Call).unwrap();
    table.act(&id("c"), Action::Raise(40)).unwrap();

    assert_eq!(actor(&table), id("a"));
    assert!(table.legal_actions(&id("a")).contains_kind(ActionKind::Raise));
    table.act(&id("a"), Action::Call).unwrap();
    assert!(table.legal_actions(&id("b")).contains_kind(ActionKind::Raise));
    table.act(&id("b"), Action::Call).unwrap();
    assert_eq!(table.current_round(), Some(Round::Flop));
    assert_eq!(table.pots()[0].amount, 120);
}

#[test]
fn test_short_all_in_does_not_reopen_betting() {
    let mut table = table_with(TableSettings::default(), &["x", "y"]);

    // Heads-up: x loses 900 to y's kings.
    table
        .deal_cards_with_deck(deck("Kh 7c Kd 2d 3s 8h 9d Jc 4h"))
        .unwrap();
    table.act(&id("x"), Action::Raise(900)).unwrap();
    table.act(&id("y"), Action::Call).unwrap();
    check_down(&mut table);
    assert_eq!(stack(&table, "x"), 100);
    assert_eq!(stack(&table, "y"), 1900);

    table.sit_down(id("z"), 1000, None).unwrap();
    table.deal_cards().unwrap();
    // Button y, small blind z, big blind x.
    assert_eq!(table.button(), Some(1));
    assert_eq!(actor(&table), id("y"));

    table.act(&id("y"), Action::Raise(60)).unwrap();
    table.act(&id("z"), Action::Call).unwrap();
    assert!(table.legal_actions(&id("x")).contains_kind(ActionKind::Raise));
    // All-in for 100 is 40 more, short of the 50 needed for a full raise.
    table.act(&id("x"), Action::Raise(100)).unwrap();
    assert_eq!(stack(&table, "x"), 0);
    assert_eq!(table.current_bet(), 100);
    assert_eq!(table.last_raise(), Some(50));

    assert_eq!(actor(&table), id("y"));
    assert!(!table.legal_actions(&id("y")).contains_kind(ActionKind::Raise));
    assert_eq!(
        table.act(&id("y"), Action::Raise(200)),
        Err(TableError::IllegalAction {
            action: ActionKind::Raise
        })
    );
    table.act(&id("y"), Action::Call).unwrap();

    assert_eq!(actor(&table), id("z"));
    assert!(!table.legal_actions(&id("z")).contains_kind(ActionKind::Raise));
    table.act(&id("z"), Action::Call).unwrap();

    assert_eq!(table.current_round(), Some(Round::Flop));
    assert_eq!(table.pots()[0].amount, 300);
    assert_chips_conserved(&table);
}

#[test]
fn test_short_call_goes_all_in() {
    let mut table = table_with(TableSettings::default(), &["x", "y"]);
    table
        .deal_cards_with_deck(deck("Kh 7c Kd 2d 3s 8h 9d Jc 4h"))
        .unwrap();
    table.act(&id("x"), Action::Raise(900)).unwrap();
    table.act(&id("y"), Action::Call).unwrap();
    check_down(&mut table);

    // y has the button now and x, with 100 left, faces a 500 raise.
    table.deal_cards().unwrap();
    assert_eq!(actor(&table), id("y"));
    table.act(&id("y"), Action::Raise(500)).unwrap();
    let legal = table.legal_actions(&id("x"));
    assert!(legal.contains_kind(ActionKind::Call));
    assert!(!legal.contains_kind(ActionKind::Raise));
    table.act(&id("x"), Action::Call).unwrap();

    // Nobody left to bet against: the board runs out.
    assert!(!table.is_hand_in_progress());
    let result = table.winners().unwrap();
    assert_eq!(result.board.len(), 5);
    // The uncalled 400 comes back to y as a pot only y can win.
    assert_eq!(result.pots.len(), 2);
    assert_eq!(result.pots[0].amount, 200);
    assert_eq!(result.pots[1].amount, 400);
    assert_eq!(result.pots[1].eligible, vec![id("y")]);
    assert!(result.amount_won(&id("y")) >= 400);
    assert_chips_conserved(&table);
}
