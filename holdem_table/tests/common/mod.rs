//! Helpers shared by the integration tests.

#![allow(dead_code)]

use holdem_table::{
    Table, TableSettings,
    entities::{Action, ActionKind, Card, Deck, PlayerId, SubHand, Suit},
    functional::{HandEvaluator, StandardEvaluator},
};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

/// Parse a card like "As", "Td" or "9c".
pub fn card(s: &str) -> Card {
    let mut chars = s.chars();
    let value = match chars.next().unwrap() {
        'A' => 14,
        'K' => 13,
        'Q' => 12,
        'J' => 11,
        'T' => 10,
        c => c.to_digit(10).unwrap() as u8,
    };
    let suit = match chars.next().unwrap() {
        'c' => Suit::Club,
        's' => Suit::Spade,
        'd' => Suit::Diamond,
        'h' => Suit::Heart,
        c => panic!("bad suit {c}"),
    };
    Card(value, suit)
}

/// A deck dealing `cards` (space separated) first.
pub fn deck(cards: &str) -> Deck {
    let top: Vec<Card> = cards.split_whitespace().map(card).collect();
    Deck::stacked(&top)
}

pub fn id(s: &str) -> PlayerId {
    PlayerId::from(s)
}

/// A seeded table with the given players seated in order from seat 0.
pub fn table_with(settings: TableSettings, ids: &[&str]) -> Table {
    let buy_in = settings.buy_in;
    let mut table = Table::new(settings.with_seed(42));
    for player in ids {
        table.sit_down(id(player), buy_in, None).unwrap();
    }
    table
}

pub fn actor(table: &Table) -> PlayerId {
    table.current_actor().unwrap().id.clone()
}

/// Check (or call when facing a bet) until the hand is over.
pub fn check_down(table: &mut Table) {
    while table.is_hand_in_progress() {
        let player = actor(table);
        let action = if table.legal_actions(&player).contains_kind(ActionKind::Check) {
            Action::Check
        } else {
            Action::Call
        };
        table.act(&player, action).unwrap();
    }
}

pub fn stack(table: &Table, player: &str) -> u32 {
    table.player(&id(player)).map_or(0, |p| p.stack)
}

pub fn assert_chips_conserved(table: &Table) {
    assert_eq!(
        table.chips_in_play(),
        table.total_bought_in() - table.total_cashed_out(),
        "chips created or destroyed: {table:?}"
    );
}

/// Standard evaluator that counts how often it's asked.
#[derive(Clone, Default)]
pub struct CountingEvaluator {
    pub calls: Arc<AtomicUsize>,
}

impl CountingEvaluator {
    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl HandEvaluator for CountingEvaluator {
    fn evaluate(&self, cards: &[Card]) -> SubHand {
        self.calls.fetch_add(1, Ordering::SeqCst);
        StandardEvaluator.evaluate(cards)
    }
}
