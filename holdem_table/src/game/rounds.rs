//! Turn order and betting-round transitions.

use log::debug;
use serde::{Deserialize, Serialize};

use super::{
    entities::{Player, Round, SeatIndex},
    table::{Table, TableEvent},
};

/// Identifies one specific turn. Any accepted action, deal or forced fold
/// moves the table to a new key, so an intent captured under an old key
/// can be recognised as stale.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct TurnKey {
    pub hand_number: u64,
    pub round: Round,
    pub seat: SeatIndex,
    pub sequence: u64,
}

impl Table {
    /// Key of the turn in progress, if someone is due to act.
    #[must_use]
    pub fn turn_key(&self) -> Option<TurnKey> {
        Some(TurnKey {
            hand_number: self.hand_number,
            round: self.current_round?,
            seat: self.current_position?,
            sequence: self.action_sequence,
        })
    }

    /// Seats after `seat` in dealing order, wrapping around and ending
    /// with `seat` itself.
    pub(super) fn seat_order(&self, seat: SeatIndex) -> impl Iterator<Item = SeatIndex> + use<> {
        let num_seats = self.seats.len();
        (1..=num_seats).map(move |offset| (seat + offset) % num_seats)
    }

    pub(super) fn prev_seat(&self, seat: SeatIndex) -> SeatIndex {
        let num_seats = self.seats.len();
        (seat + num_seats - 1) % num_seats
    }

    /// Players dealt into the hand who haven't folded.
    pub(super) fn live_players(&self) -> impl Iterator<Item = &Player> {
        self.seats.iter().flatten().filter(|p| p.is_live())
    }

    pub(super) fn live_count(&self) -> usize {
        self.live_players().count()
    }

    pub(super) fn acting_seats(&self) -> impl Iterator<Item = SeatIndex> + '_ {
        self.seats
            .iter()
            .flatten()
            .filter(|p| p.is_acting())
            .map(|p| p.seat_idx)
    }

    fn is_acting_seat(&self, seat: SeatIndex) -> bool {
        self.seats
            .get(seat)
            .and_then(Option::as_ref)
            .is_some_and(Player::is_acting)
    }

    /// The next seat after `seat` whose player can act. May be `seat`
    /// itself if nobody else can.
    pub(super) fn next_acting_seat(&self, seat: SeatIndex) -> Option<SeatIndex> {
        self.seat_order(seat).find(|&s| self.is_acting_seat(s))
    }

    /// The nearest seat at or before `seat`, walking backward, whose
    /// player can act.
    pub(super) fn acting_seat_at_or_before(&self, seat: SeatIndex) -> Option<SeatIndex> {
        let num_seats = self.seats.len();
        (0..num_seats)
            .map(|offset| (seat + num_seats - offset) % num_seats)
            .find(|&s| self.is_acting_seat(s))
    }

    /// Whether anyone still has a decision to make this round. A lone
    /// player who can act only needs to if they're facing a bet.
    pub(super) fn action_pending(&self) -> bool {
        let mut acting = self.seats.iter().flatten().filter(|p| p.is_acting());
        match (acting.next(), acting.next()) {
            (None, _) => false,
            (Some(player), None) => player.bet < self.current_bet,
            (Some(_), Some(_)) => true,
        }
    }

    /// Pass the turn on after the current actor's action, closing the
    /// round when the closing seat has acted or nobody is left to act.
    pub(super) fn next_action(&mut self) {
        let Some(current) = self.current_position else {
            return;
        };
        self.action_sequence += 1;

        if self.live_count() <= 1 {
            self.end_round();
            return;
        }
        if self.last_position == Some(current) || !self.action_pending() {
            self.end_round();
            return;
        }
        match self.next_acting_seat(current) {
            Some(seat) if seat != current => self.current_position = Some(seat),
            _ => self.end_round(),
        }
    }

    /// Close the current betting round: sweep bets into the pots, then
    /// either finish the hand or open the next street. When fewer than two
    /// players can still act, the remaining streets are dealt without
    /// asking anyone.
    pub(super) fn end_round(&mut self) {
        self.current_position = None;
        self.last_position = None;
        loop {
            self.sweep_bets();
            self.current_bet = 0;
            self.last_raise = None;
            self.raise_epoch += 1;

            if self.live_count() <= 1 {
                self.award_uncontested();
                return;
            }
            let Some(round) = self.current_round else {
                return;
            };
            let next = round.next();
            if next == Round::Showdown {
                self.showdown();
                return;
            }

            self.current_round = Some(next);
            self.action_sequence += 1;
            let cards: Vec<_> = (0..next.board_cards())
                .map(|_| self.deck.deal_card())
                .collect();
            self.board.extend_from_slice(&cards);
            debug!("dealt the {next}, board is now {} cards", self.board.len());
            self.events.push_back(TableEvent::StreetDealt { round: next, cards });

            if self.acting_seats().nth(1).is_some() {
                let button = self.button.unwrap_or_default();
                let first = self.next_acting_seat(button);
                self.current_position = first;
                self.last_position = first.and_then(|seat| {
                    self.acting_seat_at_or_before(self.prev_seat(seat))
                });
                return;
            }
            debug!("no more betting possible, running out the board");
        }
    }
}
