//! Canonical card model.
//!
//! Every external encoding converts to and from the types in this module:
//! - [`Rank`] and [`Suit`] for the 52 standard cards
//! - [`JokerColor`] for the two jokers
//! - [`Card`], the tagged union of the two
//!
//! Loose `(rank, suit)` tokens coming off the wire go through [`Card::new`],
//! which rejects mixed combinations such as a red ace or a joker of spades.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised when loose rank/suit tokens do not form a card
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CardError {
    #[error("a {rank} cannot have suit {suit}")]
    InvalidCombination { rank: RankToken, suit: SuitToken },
}

/// Card suit, in canonical deck order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Spades,
    Hearts,
    Diamonds,
    Clubs,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];

    /// Full lowercase name, as used by verbose strings and asset filenames
    pub fn name(self) -> &'static str {
        match self {
            Suit::Spades => "spades",
            Suit::Hearts => "hearts",
            Suit::Diamonds => "diamonds",
            Suit::Clubs => "clubs",
        }
    }

    /// Lowercase initial (`s`, `h`, `d`, `c`)
    pub fn initial(self) -> char {
        match self {
            Suit::Spades => 's',
            Suit::Hearts => 'h',
            Suit::Diamonds => 'd',
            Suit::Clubs => 'c',
        }
    }

    /// Parse a full suit name, ignoring ASCII case
    pub fn from_name(name: &str) -> Option<Self> {
        Suit::ALL
            .into_iter()
            .find(|s| s.name().eq_ignore_ascii_case(name))
    }

    /// Parse a suit initial, ignoring ASCII case
    pub fn from_initial(c: char) -> Option<Self> {
        let c = c.to_ascii_lowercase();
        Suit::ALL.into_iter().find(|s| s.initial() == c)
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Standard card rank, ordered by game value (ace high)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    /// Game value from 2 to 14 (ace high)
    pub fn value(self) -> u8 {
        self as u8 + 2
    }

    /// Rank from its ace-high game value
    pub fn from_value(value: u8) -> Option<Self> {
        value
            .checked_sub(2)
            .and_then(|i| Rank::ALL.get(i as usize))
            .copied()
    }

    /// Lowercase name as used by verbose strings (`"10"`, `"jack"`, `"ace"`)
    pub fn name(self) -> &'static str {
        match self {
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "jack",
            Rank::Queen => "queen",
            Rank::King => "king",
            Rank::Ace => "ace",
        }
    }

    /// Parse a rank name, ignoring ASCII case
    pub fn from_name(name: &str) -> Option<Self> {
        Rank::ALL
            .into_iter()
            .find(|r| r.name().eq_ignore_ascii_case(name))
    }

    /// Uppercase single-character symbol (`2`-`9`, `T`, `J`, `Q`, `K`, `A`)
    pub fn symbol(self) -> char {
        match self {
            Rank::Ten => 'T',
            Rank::Jack => 'J',
            Rank::Queen => 'Q',
            Rank::King => 'K',
            Rank::Ace => 'A',
            pip => char::from(b'0' + pip.value()),
        }
    }

    /// Parse a rank symbol, ignoring ASCII case
    pub fn from_symbol(c: char) -> Option<Self> {
        let c = c.to_ascii_uppercase();
        Rank::ALL.into_iter().find(|r| r.symbol() == c)
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Joker color, black below red
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JokerColor {
    Black,
    Red,
}

impl JokerColor {
    pub const ALL: [JokerColor; 2] = [JokerColor::Black, JokerColor::Red];

    pub fn name(self) -> &'static str {
        match self {
            JokerColor::Black => "black",
            JokerColor::Red => "red",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        JokerColor::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for JokerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A rank as it appears on the wire, before validation against a suit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RankToken {
    Standard(Rank),
    Joker,
}

impl RankToken {
    /// Parse a rank name or the literal `joker`
    pub fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("joker") {
            return Some(RankToken::Joker);
        }
        Rank::from_name(name).map(RankToken::Standard)
    }
}

impl fmt::Display for RankToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankToken::Standard(rank) => write!(f, "{}", rank),
            RankToken::Joker => f.write_str("joker"),
        }
    }
}

/// A suit or joker color as it appears on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuitToken {
    Standard(Suit),
    Color(JokerColor),
}

impl SuitToken {
    /// Parse a full suit name or a joker color
    pub fn from_name(name: &str) -> Option<Self> {
        Suit::from_name(name)
            .map(SuitToken::Standard)
            .or_else(|| JokerColor::from_name(name).map(SuitToken::Color))
    }
}

impl fmt::Display for SuitToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuitToken::Standard(suit) => write!(f, "{}", suit),
            SuitToken::Color(color) => write!(f, "{}", color),
        }
    }
}

/// A playing card.
///
/// Two cards with equal fields are interchangeable; there is no identity
/// beyond `(rank, suit)`. Ordering is rank-major then suit, with both jokers
/// above every standard card.
///
/// Serializes as its verbose string (`"ace_of_spades"`, `"red_joker"`) and
/// deserializes from any encoding accepted by [`crate::codec::decode_value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "serde_json::Value")]
pub enum Card {
    Standard { rank: Rank, suit: Suit },
    Joker(JokerColor),
}

impl Card {
    /// Validate a loose `(rank, suit)` pair.
    pub fn new(rank: RankToken, suit: SuitToken) -> Result<Self, CardError> {
        match (rank, suit) {
            (RankToken::Standard(rank), SuitToken::Standard(suit)) => {
                Ok(Card::Standard { rank, suit })
            }
            (RankToken::Joker, SuitToken::Color(color)) => Ok(Card::Joker(color)),
            (rank, suit) => Err(CardError::InvalidCombination { rank, suit }),
        }
    }

    pub const fn standard(rank: Rank, suit: Suit) -> Self {
        Card::Standard { rank, suit }
    }

    pub const fn joker(color: JokerColor) -> Self {
        Card::Joker(color)
    }

    pub fn rank_token(&self) -> RankToken {
        match self {
            Card::Standard { rank, .. } => RankToken::Standard(*rank),
            Card::Joker(_) => RankToken::Joker,
        }
    }

    pub fn suit_token(&self) -> SuitToken {
        match self {
            Card::Standard { suit, .. } => SuitToken::Standard(*suit),
            Card::Joker(color) => SuitToken::Color(*color),
        }
    }

    pub fn is_joker(&self) -> bool {
        matches!(self, Card::Joker(_))
    }

    /// All 52 standard cards followed by the black and red jokers
    pub fn all() -> impl Iterator<Item = Card> {
        Suit::ALL
            .into_iter()
            .flat_map(|suit| Rank::ALL.into_iter().map(move |rank| Card::standard(rank, suit)))
            .chain(JokerColor::ALL.into_iter().map(Card::Joker))
    }
}

/// Short code (`AS`, `TD`, `RJ`)
impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::codec::short::encode(*self))
    }
}

impl From<Card> for String {
    fn from(card: Card) -> Self {
        crate::codec::verbose::encode(card)
    }
}

impl TryFrom<serde_json::Value> for Card {
    type Error = crate::codec::DecodeError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        crate::codec::decode_value(&value)
    }
}
