//! Legal actions and raise boundaries.
//!
//! Nothing in here mutates the table. The same functions gate incoming
//! actions and build the action hints shown to the current actor.

use serde::{Deserialize, Serialize};

use super::{
    entities::{ActionChoices, ActionKind, Chips, PlayerId, SeatIndex},
    table::Table,
};

/// Raise boundaries for a player, as total-bet amounts.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RaiseBounds {
    /// Smallest total bet that counts as a full raise.
    pub min_raise_to: Chips,
    /// The player's all-in total.
    pub max_bet: Chips,
}

/// The seat that closes the betting round after a raise from
/// `raiser_seat`: the nearest seat behind the raiser that can still act.
/// Everyone between the raiser and that seat must act again.
///
/// Returns `None` when nobody else can act.
#[must_use]
pub fn closing_seat_after_raise(
    raiser_seat: SeatIndex,
    acting_seats: &[SeatIndex],
    num_seats: usize,
) -> Option<SeatIndex> {
    (1..num_seats)
        .map(|offset| (raiser_seat + num_seats - offset) % num_seats)
        .find(|seat| acting_seats.contains(seat))
}

impl Table {
    /// Actions the player may take right now. Empty for anyone who cannot
    /// act (not seated, not in the hand, folded, or all-in).
    #[must_use]
    pub fn legal_actions(&self, id: &PlayerId) -> ActionChoices {
        self.seat_of(id)
            .map(|seat| self.legal_actions_at(seat))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn raise_bounds(&self, id: &PlayerId) -> Option<RaiseBounds> {
        self.seat_of(id).map(|seat| self.raise_bounds_at(seat))
    }

    pub(super) fn raise_bounds_at(&self, seat: SeatIndex) -> RaiseBounds {
        let player = self.seat_ref(seat);
        RaiseBounds {
            min_raise_to: self.current_bet + self.min_raise_increment(),
            max_bet: player.stack + player.bet,
        }
    }

    /// Minimum raise increment: the last full raise this round, or the big
    /// blind if nobody has raised yet.
    pub(super) fn min_raise_increment(&self) -> Chips {
        self.last_raise.unwrap_or(self.settings.big_blind)
    }

    pub(super) fn legal_actions_at(&self, seat: SeatIndex) -> ActionChoices {
        let mut actions = ActionChoices::default();
        if !self.is_hand_in_progress() {
            return actions;
        }
        let Some(player) = self.seats.get(seat).and_then(Option::as_ref) else {
            return actions;
        };
        if !player.is_acting() {
            return actions;
        }

        let opponents_can_act = self.acting_seats().any(|s| s != seat);
        // A short all-in doesn't reopen the betting for anyone who has
        // already acted since the last full raise.
        let may_reraise = player.acted_epoch != Some(self.raise_epoch);
        let kinds = &mut actions.0;

        if self.current_bet == 0 {
            kinds.insert(ActionKind::Check);
            if opponents_can_act {
                kinds.insert(ActionKind::Bet);
            }
        } else if player.bet >= self.current_bet {
            kinds.insert(ActionKind::Check);
            if opponents_can_act && may_reraise {
                kinds.insert(ActionKind::Raise);
            }
        } else {
            kinds.insert(ActionKind::Call);
            let call_amount = self.current_bet - player.bet;
            if player.stack > call_amount
                && self.min_raise_increment() <= player.stack
                && opponents_can_act
                && may_reraise
            {
                kinds.insert(ActionKind::Raise);
            }
        }
        kinds.insert(ActionKind::Fold);
        actions
    }
}
