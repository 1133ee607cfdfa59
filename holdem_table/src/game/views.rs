//! Read-only projections of the table for broadcast.
//!
//! The public part is identical for every viewer and is built once and
//! shared behind an `Arc`. The private part carries hole cards and action
//! hints and is only ever built for its owner.

use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc};

use super::{
    entities::{Action, ActionChoices, ActionKind, Card, Chips, PlayerId, Round, SeatIndex},
    showdown::HandResult,
    table::Table,
};

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SeatView {
    pub seat: SeatIndex,
    pub player_id: PlayerId,
    pub stack: Chips,
    pub bet: Chips,
    pub folded: bool,
    pub all_in: bool,
    pub in_hand: bool,
    pub leaving: bool,
    pub last_action: Option<Action>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PotView {
    pub amount: Chips,
    pub eligible: Vec<PlayerId>,
}

/// Everything any observer may see.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PublicView {
    pub hand_number: u64,
    pub small_blind: Chips,
    pub big_blind: Chips,
    /// One entry per seat, `None` for empty seats.
    pub seats: Vec<Option<SeatView>>,
    pub board: Vec<Card>,
    pub pots: Vec<PotView>,
    /// Pots plus every outstanding bet.
    pub pot_total: Chips,
    pub current_bet: Chips,
    pub current_round: Option<Round>,
    pub current_actor: Option<PlayerId>,
    pub button: Option<SeatIndex>,
    pub winners: Option<HandResult>,
}

/// What only `player_id` may see.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PrivateView {
    pub player_id: PlayerId,
    pub hole_cards: Vec<Card>,
    /// Empty unless it's this player's turn.
    pub legal_actions: ActionChoices,
    pub min_raise_to: Option<Chips>,
    pub max_bet: Chips,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct TableView {
    #[serde(with = "arc_serde")]
    pub public: Arc<PublicView>,
    pub private: Option<PrivateView>,
}

pub type TableViews = HashMap<PlayerId, TableView>;

mod arc_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::sync::Arc;

    pub fn serialize<S, T>(arc: &Arc<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        T::serialize(arc, serializer)
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Arc<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        T::deserialize(deserializer).map(Arc::new)
    }
}

impl Table {
    #[must_use]
    pub fn public_view(&self) -> PublicView {
        let seats = self
            .seats
            .iter()
            .map(|seat| {
                seat.as_ref().map(|p| SeatView {
                    seat: p.seat_idx,
                    player_id: p.id.clone(),
                    stack: p.stack,
                    bet: p.bet,
                    folded: p.folded,
                    all_in: p.is_all_in(),
                    in_hand: p.in_hand(),
                    leaving: p.leaving,
                    last_action: p.last_action,
                })
            })
            .collect();
        let pots = self
            .pots
            .iter()
            .map(|pot| PotView {
                amount: pot.amount,
                eligible: pot.eligible.clone(),
            })
            .collect();
        let bets: Chips = self.seats.iter().flatten().map(|p| p.bet).sum();
        let pot_total = self.pots.iter().map(|pot| pot.amount).sum::<Chips>() + bets;

        PublicView {
            hand_number: self.hand_number,
            small_blind: self.settings.small_blind,
            big_blind: self.settings.big_blind,
            seats,
            board: self.board.clone(),
            pots,
            pot_total,
            current_bet: self.current_bet,
            current_round: self.current_round,
            current_actor: self.current_actor().map(|p| p.id.clone()),
            button: self.button,
            winners: self.winners.clone(),
        }
    }

    /// The private projection for a seated player.
    #[must_use]
    pub fn private_view(&self, id: &PlayerId) -> Option<PrivateView> {
        let seat = self.seat_of(id)?;
        let player = self.seat_ref(seat);
        let is_turn = self.current_position == Some(seat);
        let legal_actions = if is_turn {
            self.legal_actions_at(seat)
        } else {
            ActionChoices::default()
        };
        let bounds = self.raise_bounds_at(seat);
        let can_raise = legal_actions.contains_kind(ActionKind::Raise)
            || legal_actions.contains_kind(ActionKind::Bet);
        Some(PrivateView {
            player_id: id.clone(),
            hole_cards: player.hole_cards.clone(),
            min_raise_to: can_raise.then(|| bounds.min_raise_to.min(bounds.max_bet)),
            max_bet: bounds.max_bet,
            legal_actions,
        })
    }

    /// The view for one observer. Spectators (`None` or unseated ids) get
    /// the public part only.
    #[must_use]
    pub fn view_for(&self, id: Option<&PlayerId>) -> TableView {
        TableView {
            public: Arc::new(self.public_view()),
            private: id.and_then(|id| self.private_view(id)),
        }
    }

    /// Views for every seated player, sharing one public projection.
    #[must_use]
    pub fn get_views(&self) -> TableViews {
        let public = Arc::new(self.public_view());
        self.seats
            .iter()
            .flatten()
            .map(|p| {
                let view = TableView {
                    public: Arc::clone(&public),
                    private: self.private_view(&p.id),
                };
                (p.id.clone(), view)
            })
            .collect()
    }
}
