//! Hand evaluation.
//!
//! The table only needs two capabilities from an evaluator: rank a set of
//! cards, and pick the best of several ranked hands. The standard
//! evaluator ranks the best five-card hand found in up to seven cards.

use std::collections::BTreeMap;

use super::entities::{Card, Rank, SubHand, Value};

/// Ranks a set of cards. Implementations must be pure.
pub trait HandEvaluator: Send + Sync {
    fn evaluate(&self, cards: &[Card]) -> SubHand;
}

/// Best-five-of-n evaluator for standard hold'em rankings.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardEvaluator;

impl HandEvaluator for StandardEvaluator {
    fn evaluate(&self, cards: &[Card]) -> SubHand {
        eval(cards)
    }
}

/// Return the best hand that can be made from `cards`.
///
/// Hands of five or more cards consider every five-card combination.
/// Smaller hands are ranked on their pairings alone.
#[must_use]
pub fn eval(cards: &[Card]) -> SubHand {
    if cards.len() < 5 {
        return eval_groups(cards);
    }
    let n = cards.len();
    let mut best: Option<SubHand> = None;
    let mut five = [cards[0]; 5];
    for mask in 0u32..(1 << n) {
        if mask.count_ones() != 5 {
            continue;
        }
        let mut i = 0;
        for (j, card) in cards.iter().enumerate() {
            if mask & (1 << j) != 0 {
                five[i] = *card;
                i += 1;
            }
        }
        let hand = eval_five(&five);
        if best.as_ref().is_none_or(|b| hand > *b) {
            best = Some(hand);
        }
    }
    best.unwrap_or_else(|| eval_groups(cards))
}

/// Indices of the best hands. Ties return every tied index.
#[must_use]
pub fn argmax(hands: &[SubHand]) -> Vec<usize> {
    let Some(best) = hands.iter().max() else {
        return Vec::new();
    };
    hands
        .iter()
        .enumerate()
        .filter(|(_, hand)| *hand == best)
        .map(|(i, _)| i)
        .collect()
}

fn eval_five(cards: &[Card; 5]) -> SubHand {
    let mut values: Vec<Value> = cards.iter().map(|c| c.0).collect();
    values.sort_unstable_by(|a, b| b.cmp(a));
    let is_flush = cards.iter().all(|c| c.1 == cards[0].1);
    let straight_high = straight_high(&values);

    match (is_flush, straight_high) {
        (true, Some(high)) => SubHand {
            rank: Rank::StraightFlush,
            values: vec![high],
        },
        _ => {
            let grouped = eval_groups(cards);
            match grouped.rank {
                Rank::FourOfAKind | Rank::FullHouse => grouped,
                _ if is_flush => SubHand {
                    rank: Rank::Flush,
                    values,
                },
                _ if straight_high.is_some() => SubHand {
                    rank: Rank::Straight,
                    values: straight_high.into_iter().collect(),
                },
                _ => grouped,
            }
        }
    }
}

/// High card of a five-card straight in descending `values`. The wheel
/// (A-2-3-4-5) plays as a five-high straight.
fn straight_high(values: &[Value]) -> Option<Value> {
    if values.windows(2).all(|w| w[0] == w[1] + 1) {
        return Some(values[0]);
    }
    if values == [14, 5, 4, 3, 2] {
        return Some(5);
    }
    None
}

/// Rank cards by how their values group together.
fn eval_groups(cards: &[Card]) -> SubHand {
    let mut counts: BTreeMap<Value, usize> = BTreeMap::new();
    for card in cards {
        *counts.entry(card.0).or_default() += 1;
    }
    // Largest groups first, higher values breaking ties.
    let mut groups: Vec<(usize, Value)> = counts.into_iter().map(|(v, c)| (c, v)).collect();
    groups.sort_unstable_by(|a, b| b.cmp(a));

    let rank = match groups.as_slice() {
        [(4, _), ..] => Rank::FourOfAKind,
        [(3, _), (2, _), ..] => Rank::FullHouse,
        [(3, _), ..] => Rank::ThreeOfAKind,
        [(2, _), (2, _), ..] => Rank::TwoPair,
        [(2, _), ..] => Rank::OnePair,
        _ => Rank::HighCard,
    };
    let values = groups.into_iter().map(|(_, v)| v).collect();
    SubHand { rank, values }
}
