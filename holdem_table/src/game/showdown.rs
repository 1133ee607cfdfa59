//! Pot building and distribution.

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::{
    entities::{Card, Chips, PlayerId, Pot, Round, SeatIndex, SubHand},
    functional::argmax,
    table::{Table, TableEvent},
};

/// What a single player put into the hand.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Contribution {
    pub seat: SeatIndex,
    pub player_id: PlayerId,
    pub amount: Chips,
    /// Still in the hand (not folded).
    pub live: bool,
}

/// Chips won by a player over all pots of a hand.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Payout {
    pub player_id: PlayerId,
    pub amount: Chips,
}

/// A showdown participant's cards and best hand.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Reveal {
    pub player_id: PlayerId,
    pub cards: Vec<Card>,
    pub hand: SubHand,
}

/// Outcome of a completed hand.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct HandResult {
    pub hand_id: Uuid,
    pub hand_number: u64,
    pub board: Vec<Card>,
    /// Pots with their winners filled in.
    pub pots: Vec<Pot>,
    /// Total won per player, in seat order.
    pub payouts: Vec<Payout>,
    /// Hands shown at showdown. Empty when everyone else folded.
    pub revealed: Vec<Reveal>,
    pub completed_at: DateTime<Utc>,
}

impl HandResult {
    /// Total won by a player in this hand.
    #[must_use]
    pub fn amount_won(&self, id: &PlayerId) -> Chips {
        self.payouts
            .iter()
            .filter(|payout| &payout.player_id == id)
            .map(|payout| payout.amount)
            .sum()
    }
}

/// Split contributions into a main pot and side pots.
///
/// Each distinct contribution level reached by a live player closes one
/// pot. A pot holds every player's chips up to its level (folded players
/// included) and is contested by the live players who reached that level.
/// Chips above the highest live level belong to the last pot.
#[must_use]
pub fn build_pots(contributions: &[Contribution]) -> Vec<Pot> {
    let mut live: Vec<&Contribution> = contributions.iter().filter(|c| c.live).collect();
    live.sort_by_key(|c| c.seat);
    let mut levels: Vec<Chips> = live.iter().map(|c| c.amount).filter(|&a| a > 0).collect();
    levels.sort_unstable();
    levels.dedup();

    let mut pots: Vec<Pot> = Vec::with_capacity(levels.len());
    let mut prev_level = 0;
    for level in levels {
        let amount = contributions
            .iter()
            .map(|c| c.amount.min(level) - c.amount.min(prev_level))
            .sum();
        let eligible: Vec<PlayerId> = live
            .iter()
            .filter(|c| c.amount >= level)
            .map(|c| c.player_id.clone())
            .collect();
        match pots.last_mut() {
            Some(pot) if pot.eligible == eligible => pot.amount += amount,
            _ => pots.push(Pot {
                amount,
                eligible,
                winners: None,
            }),
        }
        prev_level = level;
    }

    let overflow: Chips = contributions
        .iter()
        .map(|c| c.amount - c.amount.min(prev_level))
        .sum();
    if overflow > 0 {
        match pots.last_mut() {
            Some(pot) => pot.amount += overflow,
            None => pots.push(Pot {
                amount: overflow,
                eligible: live.iter().map(|c| c.player_id.clone()).collect(),
                winners: None,
            }),
        }
    }
    pots
}

/// Split `amount` evenly between `winners`, who must already be ordered
/// starting left of the button. Odd chips go one each to the earliest
/// winners.
#[must_use]
pub fn split_pot(amount: Chips, winners: &[PlayerId]) -> Vec<(PlayerId, Chips)> {
    if winners.is_empty() {
        return Vec::new();
    }
    let num_winners = winners.len() as Chips;
    let share = amount / num_winners;
    let remainder = (amount % num_winners) as usize;
    winners
        .iter()
        .enumerate()
        .map(|(i, id)| (id.clone(), share + Chips::from(i < remainder)))
        .collect()
}

impl Table {
    fn contributions(&self) -> Vec<Contribution> {
        self.seats
            .iter()
            .flatten()
            .filter(|p| p.contribution() > 0)
            .map(|p| Contribution {
                seat: p.seat_idx,
                player_id: p.id.clone(),
                amount: p.contribution(),
                live: p.is_live(),
            })
            .collect()
    }

    /// Move every bet into the pots and rebuild the pots from the hand's
    /// total contributions.
    pub(super) fn sweep_bets(&mut self) {
        let swept: Chips = self.seats.iter_mut().flatten().map(|p| p.sweep()).sum();
        // Rebuilt even when nothing was bet: a fold on an unbet street still
        // changes eligibility.
        self.pots = build_pots(&self.contributions());
        debug!(
            "swept ${swept} into {} pot(s): {:?}",
            self.pots.len(),
            self.pots.iter().map(|pot| pot.amount).collect::<Vec<_>>()
        );
    }

    /// Order winners starting from the first seat left of the button.
    fn order_from_button(&self, ids: &[PlayerId]) -> Vec<PlayerId> {
        let button = self.button.unwrap_or_default();
        self.seat_order(button)
            .filter_map(|seat| self.seats[seat].as_ref())
            .filter(|p| ids.contains(&p.id))
            .map(|p| p.id.clone())
            .collect()
    }

    /// Everyone else folded: the last live player takes every pot without
    /// showing.
    pub(super) fn award_uncontested(&mut self) {
        let Some(winner) = self.live_players().next().map(|p| p.id.clone()) else {
            return;
        };
        let mut pots = std::mem::take(&mut self.pots);
        for pot in &mut pots {
            pot.winners = Some(vec![winner.clone()]);
        }
        debug!("{winner} wins uncontested");
        self.finish_hand(pots, Vec::new());
    }

    /// Compare hands for every contested pot and pay out the winners.
    pub(super) fn showdown(&mut self) {
        self.current_round = Some(Round::Showdown);
        let mut pots = std::mem::take(&mut self.pots);
        let mut hands: HashMap<PlayerId, SubHand> = HashMap::new();
        let live: Vec<PlayerId> = self.live_players().map(|p| p.id.clone()).collect();

        for pot in &mut pots {
            pot.eligible.retain(|id| live.contains(id));
            let winners = if pot.is_contested() {
                for id in &pot.eligible {
                    if !hands.contains_key(id) {
                        let hand = self.evaluate(id);
                        hands.insert(id.clone(), hand);
                    }
                }
                let ranked: Vec<SubHand> = pot.eligible.iter().map(|id| hands[id].clone()).collect();
                let best: Vec<PlayerId> = argmax(&ranked)
                    .into_iter()
                    .map(|i| pot.eligible[i].clone())
                    .collect();
                self.order_from_button(&best)
            } else {
                pot.eligible.clone()
            };
            pot.winners = Some(winners);
        }

        let revealed = self
            .live_players()
            .map(|p| Reveal {
                player_id: p.id.clone(),
                cards: p.hole_cards.clone(),
                hand: hands
                    .get(&p.id)
                    .cloned()
                    .unwrap_or_else(|| self.evaluate(&p.id)),
            })
            .collect();
        self.finish_hand(pots, revealed);
    }

    fn evaluate(&self, id: &PlayerId) -> SubHand {
        let mut cards = self
            .player(id)
            .map(|p| p.hole_cards.clone())
            .unwrap_or_default();
        cards.extend_from_slice(&self.board);
        self.evaluator.evaluate(&cards)
    }

    /// Pay out decided pots, publish the result and clear the hand.
    fn finish_hand(&mut self, pots: Vec<Pot>, revealed: Vec<Reveal>) {
        let mut won: HashMap<PlayerId, Chips> = HashMap::new();
        for pot in &pots {
            let winners = pot.winners.as_deref().unwrap_or_default();
            for (id, amount) in split_pot(pot.amount, winners) {
                *won.entry(id).or_default() += amount;
            }
        }

        let mut payouts = Vec::with_capacity(won.len());
        for player in self.seats.iter_mut().flatten() {
            if let Some(&amount) = won.get(&player.id) {
                player.stack += amount;
                payouts.push(Payout {
                    player_id: player.id.clone(),
                    amount,
                });
            }
        }
        for payout in &payouts {
            info!("{} wins ${}", payout.player_id, payout.amount);
        }

        let result = HandResult {
            hand_id: Uuid::new_v4(),
            hand_number: self.hand_number,
            board: self.board.clone(),
            pots,
            payouts,
            revealed,
            completed_at: Utc::now(),
        };
        self.events.push_back(TableEvent::HandComplete(result.clone()));
        self.winners = Some(result);

        self.current_round = None;
        self.current_position = None;
        self.last_position = None;
        self.current_bet = 0;
        self.last_raise = None;
        self.action_sequence += 1;
        for player in self.seats.iter_mut().flatten() {
            player.hole_cards.clear();
            player.committed = 0;
        }

        for seat in 0..self.seats.len() {
            let Some(player) = self.seats[seat].as_ref() else {
                continue;
            };
            if player.stack == 0 {
                let id = player.id.clone();
                info!("{id} is out of chips");
                self.events.push_back(TableEvent::Eliminated(id));
                self.remove_player(seat);
            } else if player.leaving {
                self.remove_player(seat);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contribution(seat: SeatIndex, id: &str, amount: Chips, live: bool) -> Contribution {
        Contribution {
            seat,
            player_id: id.into(),
            amount,
            live,
        }
    }

    #[test]
    fn test_single_pot_when_everyone_matches() {
        let pots = build_pots(&[
            contribution(0, "a", 100, true),
            contribution(1, "b", 100, true),
            contribution(2, "c", 100, true),
        ]);
        assert_eq!(pots.len(), 1);
        assert_eq!(pots[0].amount, 300);
        assert_eq!(pots[0].eligible.len(), 3);
    }

    #[test]
    fn test_three_way_side_pots() {
        let pots = build_pots(&[
            contribution(0, "a", 50, true),
            contribution(1, "b", 120, true),
            contribution(2, "c", 120, true),
        ]);
        assert_eq!(pots.len(), 2);
        assert_eq!(pots[0].amount, 150);
        assert_eq!(pots[0].eligible, vec![PlayerId::from("a"), "b".into(), "c".into()]);
        assert_eq!(pots[1].amount, 140);
        assert_eq!(pots[1].eligible, vec![PlayerId::from("b"), "c".into()]);
    }

    #[test]
    fn test_folded_chips_stay_in_pot() {
        let pots = build_pots(&[
            contribution(0, "a", 50, false),
            contribution(1, "b", 100, true),
            contribution(2, "c", 100, true),
        ]);
        assert_eq!(pots.len(), 1);
        assert_eq!(pots[0].amount, 250);
        assert_eq!(pots[0].eligible, vec![PlayerId::from("b"), "c".into()]);
    }

    #[test]
    fn test_four_levels() {
        let pots = build_pots(&[
            contribution(0, "a", 25, true),
            contribution(1, "b", 75, true),
            contribution(2, "c", 150, true),
            contribution(3, "d", 150, true),
        ]);
        let amounts: Vec<Chips> = pots.iter().map(|pot| pot.amount).collect();
        assert_eq!(amounts, vec![100, 150, 150]);
        assert_eq!(pots[2].eligible, vec![PlayerId::from("c"), "d".into()]);
    }

    #[test]
    fn test_folded_overflow_joins_last_pot() {
        // c raised big and then folded to a short all-in.
        let pots = build_pots(&[
            contribution(0, "a", 40, true),
            contribution(1, "b", 40, true),
            contribution(2, "c", 90, false),
        ]);
        assert_eq!(pots.len(), 1);
        assert_eq!(pots[0].amount, 170);
    }

    #[test]
    fn test_split_pot_odd_chips_go_first() {
        let winners: Vec<PlayerId> = vec!["a".into(), "b".into(), "c".into()];
        let shares = split_pot(100, &winners);
        let amounts: Vec<Chips> = shares.iter().map(|(_, amount)| *amount).collect();
        assert_eq!(amounts, vec![34, 33, 33]);
        assert!(split_pot(10, &[]).is_empty());
    }
}
