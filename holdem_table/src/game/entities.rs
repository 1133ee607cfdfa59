use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Deserializer, Serialize};
use std::{collections::BTreeSet, fmt};

use super::constants;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    Club,
    Spade,
    Diamond,
    Heart,
}

impl Suit {
    pub const ALL: [Self; 4] = [Self::Club, Self::Spade, Self::Diamond, Self::Heart];
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Club => "♣",
            Self::Spade => "♠",
            Self::Diamond => "♦",
            Self::Heart => "♥",
        };
        write!(f, "{repr}")
    }
}

/// Placeholder for card values.
pub type Value = u8;

/// A card is a tuple of a value (deuce=2u8 ... ace=14u8) and a suit.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card(pub Value, pub Suit);

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let value = match self.0 {
            14 => "A",
            13 => "K",
            12 => "Q",
            11 => "J",
            v => &v.to_string(),
        };
        write!(f, "{value}{}", self.1)
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Rank {
    HighCard,
    OnePair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::HighCard => "high card",
            Self::OnePair => "one pair",
            Self::TwoPair => "two pair",
            Self::ThreeOfAKind => "three of a kind",
            Self::Straight => "straight",
            Self::Flush => "flush",
            Self::FullHouse => "full house",
            Self::FourOfAKind => "four of a kind",
            Self::StraightFlush => "straight flush",
        };
        write!(f, "{repr}")
    }
}

/// A ranked hand descriptor. Descriptors compare by rank first and then
/// by the tie-breaking values, highest first.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct SubHand {
    pub rank: Rank,
    pub values: Vec<Value>,
}

impl fmt::Display for SubHand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rank)
    }
}

#[derive(Clone, Debug)]
pub struct Deck {
    cards: Vec<Card>,
    pub deck_idx: usize,
}

impl Deck {
    pub fn deal_card(&mut self) -> Card {
        let card = self.cards[self.deck_idx];
        self.deck_idx += 1;
        card
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
        self.deck_idx = 0;
    }

    /// A deck whose top cards are `top`, in order, followed by the rest of
    /// a standard deck. Duplicates in `top` are ignored.
    #[must_use]
    pub fn stacked(top: &[Card]) -> Self {
        let mut cards: Vec<Card> = Vec::with_capacity(52);
        for card in top {
            if !cards.contains(card) {
                cards.push(*card);
            }
        }
        for card in Self::default().cards {
            if !cards.contains(&card) {
                cards.push(card);
            }
        }
        Self { cards, deck_idx: 0 }
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.cards.len() - self.deck_idx
    }
}

impl Default for Deck {
    fn default() -> Self {
        let mut cards = Vec::with_capacity(52);
        for value in 2u8..=14u8 {
            for suit in Suit::ALL {
                cards.push(Card(value, suit));
            }
        }
        Self { cards, deck_idx: 0 }
    }
}

/// Type alias for whole chips. Stacks, bets and pots never hold
/// fractional amounts.
pub type Chips = u32;

/// Opaque identity of a seated player.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(s: &str) -> Self {
        let mut id: String = s
            .trim()
            .chars()
            .map(|c| if c.is_ascii_whitespace() { '_' } else { c })
            .collect();
        id.truncate(constants::MAX_PLAYER_ID_LENGTH);
        Self(id)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for PlayerId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(&s))
    }
}

impl From<String> for PlayerId {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Type alias for seat positions at the table.
pub type SeatIndex = usize;

/// Betting rounds of a hand. A table with no hand in progress has no
/// round at all.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Round {
    PreFlop,
    Flop,
    Turn,
    River,
    Showdown,
}

impl Round {
    /// The round that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::PreFlop => Self::Flop,
            Self::Flop => Self::Turn,
            Self::Turn => Self::River,
            Self::River | Self::Showdown => Self::Showdown,
        }
    }

    /// Community cards dealt when entering this round.
    #[must_use]
    pub const fn board_cards(self) -> usize {
        match self {
            Self::Flop => 3,
            Self::Turn | Self::River => 1,
            Self::PreFlop | Self::Showdown => 0,
        }
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::PreFlop => "pre-flop",
            Self::Flop => "flop",
            Self::Turn => "turn",
            Self::River => "river",
            Self::Showdown => "showdown",
        };
        write!(f, "{repr}")
    }
}

/// The kinds of action a player can be offered.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Check,
    Call,
    Bet,
    Raise,
    Fold,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Check => "check",
            Self::Call => "call",
            Self::Bet => "bet",
            Self::Raise => "raise",
            Self::Fold => "fold",
        };
        write!(f, "{repr}")
    }
}

/// A betting action. Bet and raise amounts are the player's intended new
/// total bet for the round, not the increment.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Action {
    Check,
    Call,
    Fold,
    Bet(Chips),
    Raise(Chips),
}

impl Action {
    #[must_use]
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::Check => ActionKind::Check,
            Self::Call => ActionKind::Call,
            Self::Fold => ActionKind::Fold,
            Self::Bet(_) => ActionKind::Bet,
            Self::Raise(_) => ActionKind::Raise,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Check => write!(f, "checks"),
            Self::Call => write!(f, "calls"),
            Self::Fold => write!(f, "folds"),
            Self::Bet(amount) => write!(f, "bets ${amount}"),
            Self::Raise(amount) => write!(f, "raises to ${amount}"),
        }
    }
}

/// Set of action kinds available to a player.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ActionChoices(pub BTreeSet<ActionKind>);

impl ActionChoices {
    #[must_use]
    pub fn contains(&self, action: &Action) -> bool {
        self.0.contains(&action.kind())
    }

    #[must_use]
    pub fn contains_kind(&self, kind: ActionKind) -> bool {
        self.0.contains(&kind)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ActionChoices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let num_options = self.0.len();
        let repr = self
            .0
            .iter()
            .enumerate()
            .map(|(i, kind)| match i {
                0 => kind.to_string(),
                i if i == num_options - 1 => format!(" or {kind}"),
                _ => format!(", {kind}"),
            })
            .collect::<String>();
        write!(f, "{repr}")
    }
}

impl<I> From<I> for ActionChoices
where
    I: IntoIterator<Item = ActionKind>,
{
    fn from(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A seated player and their state within the current hand.
#[derive(Clone, Debug)]
pub struct Player {
    pub id: PlayerId,
    pub seat_idx: SeatIndex,
    /// Chips not wagered this round.
    pub stack: Chips,
    /// Chips committed this betting round.
    pub bet: Chips,
    /// Chips swept into the pots from earlier rounds of this hand.
    pub committed: Chips,
    pub hole_cards: Vec<Card>,
    pub folded: bool,
    /// Size of this player's last full raise this round.
    pub raise: Option<Chips>,
    /// Display-only record of the player's last action.
    pub last_action: Option<Action>,
    /// Raise epoch at which the player last acted voluntarily this round.
    pub(crate) acted_epoch: Option<u32>,
    /// Player asked to stand up mid-hand and will be removed when it ends.
    pub leaving: bool,
}

impl Player {
    #[must_use]
    pub fn new(id: PlayerId, seat_idx: SeatIndex, stack: Chips) -> Self {
        Self {
            id,
            seat_idx,
            stack,
            bet: 0,
            committed: 0,
            hole_cards: Vec::with_capacity(constants::HOLE_CARDS),
            folded: false,
            raise: None,
            last_action: None,
            acted_epoch: None,
            leaving: false,
        }
    }

    /// Dealt into the current hand.
    #[must_use]
    pub fn in_hand(&self) -> bool {
        !self.hole_cards.is_empty()
    }

    /// Dealt in and not folded.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.in_hand() && !self.folded
    }

    /// Still able to act voluntarily this hand.
    #[must_use]
    pub fn is_acting(&self) -> bool {
        self.is_live() && self.stack > 0
    }

    #[must_use]
    pub fn is_all_in(&self) -> bool {
        self.is_live() && self.stack == 0
    }

    /// Everything this player has put in during the current hand.
    #[must_use]
    pub fn contribution(&self) -> Chips {
        self.committed + self.bet
    }

    pub fn reset(&mut self) {
        self.bet = 0;
        self.committed = 0;
        self.hole_cards.clear();
        self.folded = false;
        self.raise = None;
        self.last_action = None;
        self.acted_epoch = None;
    }

    /// Moves chips from the stack into the current round's bet. The move is
    /// capped at the stack; the amount actually moved is returned.
    pub(crate) fn wager(&mut self, amount: Chips) -> Chips {
        let amount = amount.min(self.stack);
        self.stack -= amount;
        self.bet += amount;
        amount
    }

    /// Moves the current round's bet into the hand's committed total.
    pub(crate) fn sweep(&mut self) -> Chips {
        let bet = self.bet;
        self.committed += bet;
        self.bet = 0;
        self.raise = None;
        self.acted_epoch = None;
        bet
    }
}

/// A pot and the players eligible to win it.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Pot {
    pub amount: Chips,
    /// Eligible players in seat order.
    pub eligible: Vec<PlayerId>,
    pub winners: Option<Vec<PlayerId>>,
}

impl Pot {
    #[must_use]
    pub fn is_contested(&self) -> bool {
        self.eligible.len() > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};
    use std::collections::HashSet;

    #[test]
    fn test_deck_has_52_unique_cards() {
        let mut deck = Deck::default();
        let cards: HashSet<Card> = (0..52).map(|_| deck.deal_card()).collect();
        assert_eq!(cards.len(), 52);
        assert_eq!(deck.remaining(), 0);
    }

    #[test]
    fn test_deck_shuffle_resets_index() {
        let mut deck = Deck::default();
        deck.deal_card();
        deck.deal_card();
        deck.shuffle(&mut StdRng::seed_from_u64(7));
        assert_eq!(deck.deck_idx, 0);
        assert_eq!(deck.remaining(), 52);
    }

    #[test]
    fn test_stacked_deck_deals_top_cards_first() {
        let top = [Card(14, Suit::Spade), Card(2, Suit::Club)];
        let mut deck = Deck::stacked(&top);
        assert_eq!(deck.deal_card(), top[0]);
        assert_eq!(deck.deal_card(), top[1]);
        assert_eq!(deck.remaining(), 50);
    }

    #[test]
    fn test_player_id_replaces_whitespace() {
        assert_eq!(PlayerId::new(" big shot ").as_str(), "big_shot");
        let long = "x".repeat(100);
        assert_eq!(
            PlayerId::new(&long).as_str().len(),
            constants::MAX_PLAYER_ID_LENGTH
        );
    }

    #[test]
    fn test_round_progression() {
        assert_eq!(Round::PreFlop.next(), Round::Flop);
        assert_eq!(Round::River.next(), Round::Showdown);
        assert_eq!(Round::Flop.board_cards(), 3);
        assert_eq!(Round::Turn.board_cards(), 1);
    }

    #[test]
    fn test_action_choices_display() {
        let choices = ActionChoices::from([ActionKind::Check, ActionKind::Bet, ActionKind::Fold]);
        assert_eq!(choices.to_string(), "check, bet or fold");
        assert!(choices.contains(&Action::Bet(20)));
        assert!(!choices.contains(&Action::Call));
    }

    #[test]
    fn test_player_wager_caps_at_stack() {
        let mut player = Player::new("alice".into(), 0, 30);
        assert_eq!(player.wager(50), 30);
        assert_eq!(player.stack, 0);
        assert_eq!(player.bet, 30);
        assert_eq!(player.sweep(), 30);
        assert_eq!(player.contribution(), 30);
    }

    #[test]
    fn test_card_display() {
        assert_eq!(Card(14, Suit::Heart).to_string(), "A♥");
        assert_eq!(Card(10, Suit::Club).to_string(), "10♣");
    }
}
