//! The authoritative table state and the betting mutators.

use log::{debug, info};
use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use std::{collections::VecDeque, fmt, sync::Arc};

use super::{
    constants::{
        BOARD_SIZE, DEFAULT_BIG_BLIND, DEFAULT_BUY_IN, DEFAULT_SMALL_BLIND, TABLE_CAPACITY,
    },
    entities::{Action, Card, Chips, Deck, Player, PlayerId, Pot, Round, SeatIndex},
    errors::TableError,
    functional::{HandEvaluator, StandardEvaluator},
    showdown::HandResult,
    validator::closing_seat_after_raise,
};

/// Stakes and seating for a table.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TableSettings {
    pub buy_in: Chips,
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub capacity: usize,
    /// Seed for the shuffling RNG. Unseeded tables draw from OS entropy.
    pub seed: Option<u64>,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self::new(DEFAULT_BUY_IN, DEFAULT_SMALL_BLIND, DEFAULT_BIG_BLIND)
    }
}

impl TableSettings {
    #[must_use]
    pub const fn new(buy_in: Chips, small_blind: Chips, big_blind: Chips) -> Self {
        Self {
            buy_in,
            small_blind,
            big_blind,
            capacity: TABLE_CAPACITY,
            seed: None,
        }
    }

    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Things that happened at the table, in order. The session drains these
/// after every call to fan them out.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum TableEvent {
    SatDown {
        player_id: PlayerId,
        seat: SeatIndex,
        buy_in: Chips,
    },
    StoodUp {
        player_id: PlayerId,
        cash_out: Chips,
    },
    LeaveQueued(PlayerId),
    HandStarted {
        hand_number: u64,
        button: SeatIndex,
    },
    BlindPosted {
        player_id: PlayerId,
        amount: Chips,
    },
    Acted {
        player_id: PlayerId,
        action: Action,
    },
    StreetDealt {
        round: Round,
        cards: Vec<Card>,
    },
    HandComplete(HandResult),
    Eliminated(PlayerId),
}

impl fmt::Display for TableEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SatDown {
                player_id, seat, ..
            } => write!(f, "{player_id} sat down at seat {seat}"),
            Self::StoodUp {
                player_id,
                cash_out,
            } => write!(f, "{player_id} stood up with ${cash_out}"),
            Self::LeaveQueued(player_id) => {
                write!(f, "{player_id} will leave after the hand")
            }
            Self::HandStarted { hand_number, .. } => write!(f, "hand #{hand_number} started"),
            Self::BlindPosted { player_id, amount } => {
                write!(f, "{player_id} posted a ${amount} blind")
            }
            Self::Acted { player_id, action } => write!(f, "{player_id} {action}"),
            Self::StreetDealt { round, cards } => {
                let cards = cards.iter().map(Card::to_string).collect::<Vec<_>>();
                write!(f, "{round}: {}", cards.join(" "))
            }
            Self::HandComplete(result) => write!(f, "hand #{} complete", result.hand_number),
            Self::Eliminated(player_id) => write!(f, "{player_id} was eliminated"),
        }
    }
}

/// What happened to a player who asked to stand up.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum StandUpOutcome {
    /// Removed from the table with their remaining stack.
    Left { cash_out: Chips },
    /// Folded out of the running hand; removed once it completes.
    Queued,
}

/// A single poker table. All mutation goes through `&mut self`; the
/// owner is responsible for serialising calls.
pub struct Table {
    pub(super) settings: TableSettings,
    pub(super) seats: Vec<Option<Player>>,
    pub(super) deck: Deck,
    pub(super) rng: StdRng,
    pub(super) evaluator: Arc<dyn HandEvaluator>,
    /// Community cards shared amongst all players.
    pub(super) board: Vec<Card>,
    pub(super) pots: Vec<Pot>,
    /// Highest bet this round among live players, 0 before any bet.
    pub(super) current_bet: Chips,
    /// Size of the last full raise this round. Absent means the minimum
    /// raise is the big blind.
    pub(super) last_raise: Option<Chips>,
    /// Bumped on every full bet or raise. Players who acted at the
    /// current epoch may not raise again until it moves.
    pub(super) raise_epoch: u32,
    pub(super) button: Option<SeatIndex>,
    pub(super) current_position: Option<SeatIndex>,
    pub(super) last_position: Option<SeatIndex>,
    pub(super) current_round: Option<Round>,
    pub(super) winners: Option<HandResult>,
    pub(super) hand_number: u64,
    pub(super) action_sequence: u64,
    pub(super) events: VecDeque<TableEvent>,
    pub(super) total_bought_in: u64,
    pub(super) total_cashed_out: u64,
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("settings", &self.settings)
            .field("seats", &self.seats)
            .field("board", &self.board)
            .field("pots", &self.pots)
            .field("current_bet", &self.current_bet)
            .field("last_raise", &self.last_raise)
            .field("current_position", &self.current_position)
            .field("last_position", &self.last_position)
            .field("current_round", &self.current_round)
            .finish_non_exhaustive()
    }
}

impl Default for Table {
    fn default() -> Self {
        Self::new(TableSettings::default())
    }
}

impl Table {
    #[must_use]
    pub fn new(settings: TableSettings) -> Self {
        Self::with_evaluator(settings, Arc::new(StandardEvaluator))
    }

    #[must_use]
    pub fn with_evaluator(settings: TableSettings, evaluator: Arc<dyn HandEvaluator>) -> Self {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            seats: vec![None; settings.capacity],
            deck: Deck::default(),
            rng,
            evaluator,
            board: Vec::with_capacity(BOARD_SIZE),
            pots: Vec::new(),
            current_bet: 0,
            last_raise: None,
            raise_epoch: 0,
            button: None,
            current_position: None,
            last_position: None,
            current_round: None,
            winners: None,
            hand_number: 0,
            action_sequence: 0,
            events: VecDeque::new(),
            total_bought_in: 0,
            total_cashed_out: 0,
            settings,
        }
    }

    /// A fresh, empty table with the same settings and evaluator.
    #[must_use]
    pub fn restarted(&self) -> Self {
        Self::with_evaluator(self.settings.clone(), Arc::clone(&self.evaluator))
    }

    #[must_use]
    pub fn settings(&self) -> &TableSettings {
        &self.settings
    }

    #[must_use]
    pub fn seats(&self) -> &[Option<Player>] {
        &self.seats
    }

    #[must_use]
    pub fn board(&self) -> &[Card] {
        &self.board
    }

    #[must_use]
    pub fn pots(&self) -> &[Pot] {
        &self.pots
    }

    #[must_use]
    pub fn current_bet(&self) -> Chips {
        self.current_bet
    }

    #[must_use]
    pub fn last_raise(&self) -> Option<Chips> {
        self.last_raise
    }

    #[must_use]
    pub fn current_round(&self) -> Option<Round> {
        self.current_round
    }

    #[must_use]
    pub fn current_position(&self) -> Option<SeatIndex> {
        self.current_position
    }

    #[must_use]
    pub fn last_position(&self) -> Option<SeatIndex> {
        self.last_position
    }

    #[must_use]
    pub fn button(&self) -> Option<SeatIndex> {
        self.button
    }

    #[must_use]
    pub fn hand_number(&self) -> u64 {
        self.hand_number
    }

    /// Result of the last completed hand, until the next deal.
    #[must_use]
    pub fn winners(&self) -> Option<&HandResult> {
        self.winners.as_ref()
    }

    #[must_use]
    pub fn is_hand_in_progress(&self) -> bool {
        self.current_round.is_some()
    }

    #[must_use]
    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.seats.iter().flatten().find(|p| &p.id == id)
    }

    #[must_use]
    pub fn seat_of(&self, id: &PlayerId) -> Option<SeatIndex> {
        self.player(id).map(|p| p.seat_idx)
    }

    #[must_use]
    pub fn current_actor(&self) -> Option<&Player> {
        self.current_position
            .and_then(|seat| self.seats.get(seat))
            .and_then(Option::as_ref)
    }

    #[must_use]
    pub fn num_seated(&self) -> usize {
        self.seats.iter().flatten().count()
    }

    /// Chips on the table: every stack and bet plus every pot.
    #[must_use]
    pub fn chips_in_play(&self) -> u64 {
        let seated: u64 = self
            .seats
            .iter()
            .flatten()
            .map(|p| u64::from(p.stack) + u64::from(p.bet))
            .sum();
        let pots: u64 = self.pots.iter().map(|pot| u64::from(pot.amount)).sum();
        seated + pots
    }

    #[must_use]
    pub fn total_bought_in(&self) -> u64 {
        self.total_bought_in
    }

    #[must_use]
    pub fn total_cashed_out(&self) -> u64 {
        self.total_cashed_out
    }

    pub fn drain_events(&mut self) -> VecDeque<TableEvent> {
        std::mem::take(&mut self.events)
    }

    pub(super) fn seat_mut(&mut self, seat: SeatIndex) -> &mut Player {
        match self.seats[seat].as_mut() {
            Some(player) => player,
            None => unreachable!("seat {seat} is empty"),
        }
    }

    pub(super) fn seat_ref(&self, seat: SeatIndex) -> &Player {
        match self.seats[seat].as_ref() {
            Some(player) => player,
            None => unreachable!("seat {seat} is empty"),
        }
    }

    /// Seat a new player with the table's fixed buy-in.
    pub fn sit_down(
        &mut self,
        id: PlayerId,
        buy_in: Chips,
        seat: Option<SeatIndex>,
    ) -> Result<SeatIndex, TableError> {
        if self.player(&id).is_some() {
            return Err(TableError::DuplicateIdentity);
        }
        if buy_in != self.settings.buy_in {
            return Err(TableError::InvalidBuyIn {
                required: self.settings.buy_in,
            });
        }
        let seat = match seat {
            Some(seat) if seat >= self.seats.len() => return Err(TableError::InvalidSeat(seat)),
            Some(seat) if self.seats[seat].is_some() => return Err(TableError::SeatOccupied(seat)),
            Some(seat) => seat,
            None => self
                .seats
                .iter()
                .position(Option::is_none)
                .ok_or(TableError::NoAvailableSeat)?,
        };

        info!("{id} sat down at seat {seat} with ${buy_in}");
        self.events.push_back(TableEvent::SatDown {
            player_id: id.clone(),
            seat,
            buy_in,
        });
        self.seats[seat] = Some(Player::new(id, seat, buy_in));
        self.total_bought_in += u64::from(buy_in);
        Ok(seat)
    }

    /// Remove a player. Mid-hand, a player dealt into the hand is folded
    /// immediately and leaves once the hand is over.
    pub fn stand_up(&mut self, id: &PlayerId) -> Result<StandUpOutcome, TableError> {
        let seat = self.seat_of(id).ok_or(TableError::UnknownPlayer)?;
        let player = self.seat_ref(seat);
        if !self.is_hand_in_progress() || !player.in_hand() {
            let cash_out = self.remove_player(seat);
            return Ok(StandUpOutcome::Left { cash_out });
        }
        if player.leaving {
            return Ok(StandUpOutcome::Queued);
        }

        let is_live = player.is_live();
        self.seat_mut(seat).leaving = true;
        self.events.push_back(TableEvent::LeaveQueued(id.clone()));
        info!("{id} will leave after hand #{}", self.hand_number);

        if is_live {
            if self.current_position == Some(seat) {
                self.act(id, Action::Fold)?;
            } else {
                self.fold_out_of_turn(seat);
            }
        }

        // Folding may have ended the hand, in which case the player is
        // already gone.
        if self.seats[seat].is_none() {
            let cash_out = self
                .events
                .iter()
                .rev()
                .find_map(|event| match event {
                    TableEvent::StoodUp {
                        player_id,
                        cash_out,
                    } if player_id == id => Some(*cash_out),
                    _ => None,
                })
                .unwrap_or(0);
            return Ok(StandUpOutcome::Left { cash_out });
        }
        Ok(StandUpOutcome::Queued)
    }

    pub(super) fn remove_player(&mut self, seat: SeatIndex) -> Chips {
        let Some(player) = self.seats[seat].take() else {
            return 0;
        };
        let cash_out = player.stack;
        self.total_cashed_out += u64::from(cash_out);
        info!("{} stood up with ${cash_out}", player.id);
        self.events.push_back(TableEvent::StoodUp {
            player_id: player.id,
            cash_out,
        });
        cash_out
    }

    /// Shuffle and deal a new hand.
    pub fn deal_cards(&mut self) -> Result<(), TableError> {
        let mut deck = Deck::default();
        deck.shuffle(&mut self.rng);
        self.deal_cards_with_deck(deck)
    }

    /// Deal a new hand from a pre-arranged deck. Hole cards go out one at
    /// a time starting left of the button, then the board is dealt from
    /// the top as streets open.
    pub fn deal_cards_with_deck(&mut self, deck: Deck) -> Result<(), TableError> {
        if self.is_hand_in_progress() {
            return Err(TableError::HandInProgress);
        }
        let funded: Vec<SeatIndex> = self
            .seats
            .iter()
            .flatten()
            .filter(|p| p.stack > 0)
            .map(|p| p.seat_idx)
            .collect();
        if funded.len() < 2 {
            return Err(TableError::InsufficientSeats);
        }

        self.deck = deck;
        self.board.clear();
        self.pots.clear();
        self.winners = None;
        self.current_bet = 0;
        self.last_raise = None;
        self.raise_epoch = 0;
        self.hand_number += 1;
        self.action_sequence += 1;
        for player in self.seats.iter_mut().flatten() {
            player.reset();
        }

        let button = match self.button {
            Some(prev) => self
                .seat_order(prev)
                .find(|seat| funded.contains(seat))
                .unwrap_or(funded[0]),
            None => funded[0],
        };
        self.button = Some(button);
        let order: Vec<SeatIndex> = self
            .seat_order(button)
            .filter(|seat| funded.contains(seat))
            .collect();
        let (small_blind_idx, big_blind_idx) = if order.len() == 2 {
            (button, order[0])
        } else {
            (order[0], order[1])
        };

        info!(
            "hand #{} starting with {} players, button at seat {button}",
            self.hand_number,
            order.len()
        );
        self.events.push_back(TableEvent::HandStarted {
            hand_number: self.hand_number,
            button,
        });

        for _ in 0..super::constants::HOLE_CARDS {
            for &seat in &order {
                let card = self.deck.deal_card();
                self.seat_mut(seat).hole_cards.push(card);
            }
        }

        let (small_blind, big_blind) = (self.settings.small_blind, self.settings.big_blind);
        for (seat, blind) in [(small_blind_idx, small_blind), (big_blind_idx, big_blind)] {
            let player = self.seat_mut(seat);
            let amount = player.wager(blind);
            let player_id = player.id.clone();
            debug!("{player_id} posts ${amount}");
            self.events
                .push_back(TableEvent::BlindPosted { player_id, amount });
        }
        self.current_bet = self.live_players().map(|p| p.bet).max().unwrap_or(0);
        self.current_round = Some(Round::PreFlop);

        self.current_position = self.next_acting_seat(big_blind_idx);
        self.last_position = self.acting_seat_at_or_before(big_blind_idx);
        if !self.action_pending() {
            self.current_position = None;
            self.end_round();
        }
        Ok(())
    }

    /// The seat of `id` if it's their turn.
    pub fn ensure_turn(&self, id: &PlayerId) -> Result<SeatIndex, TableError> {
        if !self.is_hand_in_progress() {
            return Err(TableError::NoHandInProgress);
        }
        let seat = self.seat_of(id).ok_or(TableError::UnknownPlayer)?;
        if self.current_position != Some(seat) {
            return Err(TableError::OutOfTurn);
        }
        Ok(seat)
    }

    /// Apply an action for the current actor.
    pub fn act(&mut self, id: &PlayerId, action: Action) -> Result<(), TableError> {
        let seat = self.ensure_turn(id)?;
        if !self.legal_actions_at(seat).contains(&action) {
            return Err(TableError::IllegalAction {
                action: action.kind(),
            });
        }

        match action {
            Action::Check => {
                let epoch = self.raise_epoch;
                self.seat_mut(seat).acted_epoch = Some(epoch);
            }
            Action::Fold => {
                self.seat_mut(seat).folded = true;
                self.current_bet = self.live_players().map(|p| p.bet).max().unwrap_or(0);
            }
            Action::Call => self.call(seat),
            Action::Bet(amount) => self.bet(seat, amount)?,
            Action::Raise(amount) => self.raise(seat, amount)?,
        }

        self.seat_mut(seat).last_action = Some(action);
        debug!("{id} {action}");
        self.events.push_back(TableEvent::Acted {
            player_id: id.clone(),
            action,
        });
        self.next_action();
        Ok(())
    }

    fn call(&mut self, seat: SeatIndex) {
        let current_bet = self.current_bet;
        let epoch = self.raise_epoch;
        let player = self.seat_mut(seat);
        let call_amount = current_bet.saturating_sub(player.bet);
        // A short stack calls all-in for whatever is left.
        player.wager(call_amount);
        player.raise = None;
        player.acted_epoch = Some(epoch);
    }

    fn bet(&mut self, seat: SeatIndex, amount: Chips) -> Result<(), TableError> {
        let player = self.seat_ref(seat);
        if amount > player.stack + player.bet {
            return Err(TableError::InvalidAmount);
        }
        let is_all_in = amount == player.stack + player.bet;
        if amount < self.settings.big_blind && !is_all_in {
            return Err(TableError::BelowMinimumRaise {
                min: self.settings.big_blind,
            });
        }
        self.raise(seat, amount)
    }

    /// Raise the player's total bet for the round to `amount`.
    fn raise(&mut self, seat: SeatIndex, amount: Chips) -> Result<(), TableError> {
        let player = self.seat_ref(seat);
        let max_bet = player.stack + player.bet;
        if amount > max_bet {
            return Err(TableError::InvalidAmount);
        }
        let min_increment = self.last_raise.unwrap_or(self.settings.big_blind);
        let min_raise_to = self.current_bet + min_increment;
        let is_all_in = amount == max_bet;
        if amount <= self.current_bet || (amount < min_raise_to && !is_all_in) {
            return Err(TableError::BelowMinimumRaise { min: min_raise_to });
        }

        let increment = amount - self.current_bet;
        let is_full_raise = increment >= min_increment;
        if is_full_raise {
            self.last_raise = Some(increment);
            self.raise_epoch += 1;
        }
        let epoch = self.raise_epoch;
        let player = self.seat_mut(seat);
        let additional = amount - player.bet;
        player.wager(additional);
        player.acted_epoch = Some(epoch);
        if is_full_raise {
            player.raise = Some(increment);
        }
        self.current_bet = self.current_bet.max(amount);

        let acting: Vec<SeatIndex> = self.acting_seats().collect();
        self.last_position = closing_seat_after_raise(seat, &acting, self.seats.len());
        Ok(())
    }

    /// Fold a live player who is not the current actor, e.g. because they
    /// stood up.
    fn fold_out_of_turn(&mut self, seat: SeatIndex) {
        let player = self.seat_mut(seat);
        player.folded = true;
        player.last_action = Some(Action::Fold);
        let player_id = player.id.clone();
        debug!("{player_id} folds out of turn");
        self.events.push_back(TableEvent::Acted {
            player_id,
            action: Action::Fold,
        });
        self.action_sequence += 1;

        if self.live_count() <= 1 {
            self.end_round();
            return;
        }
        self.current_bet = self.live_players().map(|p| p.bet).max().unwrap_or(0);
        if self.last_position == Some(seat) {
            self.last_position = self.acting_seat_at_or_before(self.prev_seat(seat));
        }
        if self.last_position.is_none() || !self.action_pending() {
            self.end_round();
        }
    }
}
