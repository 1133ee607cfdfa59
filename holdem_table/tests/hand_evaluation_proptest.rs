/// Property-based tests for hand evaluation.
use holdem_table::{
    entities::{Card, Rank, Suit},
    functional::{argmax, eval},
};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn suit_strategy() -> impl Strategy<Value = Suit> {
    prop_oneof![
        Just(Suit::Club),
        Just(Suit::Diamond),
        Just(Suit::Heart),
        Just(Suit::Spade),
    ]
}

// Aces are high (14); the evaluator treats them as low only in the wheel.
fn card_strategy() -> impl Strategy<Value = Card> {
    (2u8..=14, suit_strategy()).prop_map(|(value, suit)| Card(value, suit))
}

fn unique_cards_strategy(n: usize) -> impl Strategy<Value = Vec<Card>> {
    prop::collection::vec(card_strategy(), n).prop_filter("cards must be unique", |cards| {
        let set: BTreeSet<_> = cards.iter().collect();
        set.len() == cards.len()
    })
}

proptest! {
    #[test]
    fn test_eval_is_deterministic(cards in unique_cards_strategy(7)) {
        prop_assert_eq!(eval(&cards), eval(&cards));
    }

    #[test]
    fn test_eval_ignores_card_order(cards in unique_cards_strategy(7)) {
        let mut reversed = cards.clone();
        reversed.reverse();
        prop_assert_eq!(eval(&cards), eval(&reversed));
    }

    #[test]
    fn test_more_cards_never_hurt(cards in unique_cards_strategy(7)) {
        // The best of seven is at least as good as the best of the first five.
        prop_assert!(eval(&cards) >= eval(&cards[..5]));
    }

    #[test]
    fn test_argmax_identical_hands_all_win(cards in unique_cards_strategy(5)) {
        let hand = eval(&cards);
        prop_assert_eq!(argmax(&[hand.clone(), hand.clone(), hand]), vec![0, 1, 2]);
    }

    #[test]
    fn test_argmax_returns_sorted_valid_indices(
        hands in prop::collection::vec(unique_cards_strategy(5), 2..=9)
    ) {
        let evaluated: Vec<_> = hands.iter().map(|cards| eval(cards)).collect();
        let winners = argmax(&evaluated);
        prop_assert!(!winners.is_empty());

        let mut sorted = winners.clone();
        sorted.sort_unstable();
        sorted.dedup();
        prop_assert_eq!(&winners, &sorted);
        for &i in &winners {
            prop_assert!(i < evaluated.len());
            prop_assert!(evaluated.iter().all(|hand| *hand <= evaluated[i]));
        }
    }

    #[test]
    fn test_straight_flush_beats_four_of_a_kind(suit in suit_strategy(), low in 2u8..=10) {
        let straight_flush: Vec<Card> = (low..low + 5).map(|value| Card(value, suit)).collect();
        let quads = [
            Card(14, Suit::Club),
            Card(14, Suit::Diamond),
            Card(14, Suit::Heart),
            Card(14, Suit::Spade),
            Card(13, Suit::Club),
        ];
        let sf = eval(&straight_flush);
        prop_assert_eq!(sf.rank, Rank::StraightFlush);
        prop_assert_eq!(argmax(&[sf, eval(&quads)]), vec![0]);
    }

    #[test]
    fn test_four_of_a_kind_beats_full_house(quad in 2u8..=14, trip in 2u8..=14) {
        prop_assume!(quad != trip);
        let quads = [
            Card(quad, Suit::Club),
            Card(quad, Suit::Diamond),
            Card(quad, Suit::Heart),
            Card(quad, Suit::Spade),
            Card(trip, Suit::Club),
        ];
        let full_house = [
            Card(trip, Suit::Club),
            Card(trip, Suit::Diamond),
            Card(trip, Suit::Heart),
            Card(quad, Suit::Club),
            Card(quad, Suit::Diamond),
        ];
        let full_house = eval(&full_house);
        prop_assert_eq!(full_house.rank, Rank::FullHouse);
        prop_assert_eq!(argmax(&[eval(&quads), full_house]), vec![0]);
    }

    #[test]
    fn test_three_of_a_kind_beats_two_pair(trip in 2u8..=14, pair1 in 2u8..=14, pair2 in 2u8..=14) {
        prop_assume!(trip != pair1 && trip != pair2 && pair1 != pair2);
        let three = [
            Card(trip, Suit::Club),
            Card(trip, Suit::Diamond),
            Card(trip, Suit::Heart),
            Card(pair1, Suit::Club),
            Card(pair2, Suit::Diamond),
        ];
        let two_pair = [
            Card(pair1, Suit::Club),
            Card(pair1, Suit::Diamond),
            Card(pair2, Suit::Heart),
            Card(pair2, Suit::Spade),
            Card(trip, Suit::Club),
        ];
        prop_assert_eq!(argmax(&[eval(&three), eval(&two_pair)]), vec![0]);
    }

    #[test]
    fn test_flush_beats_straight(suit in suit_strategy()) {
        let flush = [
            Card(2, suit),
            Card(5, suit),
            Card(8, suit),
            Card(10, suit),
            Card(13, suit),
        ];
        let straight = [
            Card(7, Suit::Club),
            Card(8, Suit::Diamond),
            Card(9, Suit::Heart),
            Card(10, Suit::Spade),
            Card(11, Suit::Club),
        ];
        prop_assert_eq!(argmax(&[eval(&flush), eval(&straight)]), vec![0]);
    }

    #[test]
    fn test_comparison_is_transitive(
        a in unique_cards_strategy(7),
        b in unique_cards_strategy(7),
        c in unique_cards_strategy(7),
    ) {
        let (a, b, c) = (eval(&a), eval(&b), eval(&c));
        if a > b && b > c {
            prop_assert!(a > c);
        }
    }
}
