//! Numeric-rank objects: `{"rank": 14, "suit": "s"}`.
//!
//! Backends disagree on where the ace sits, so both `1` and `14` decode to
//! an ace; encoding always emits `14`. Ranks may also arrive as strings,
//! either numeric (`"12"`), a face symbol (`"A"`, `"t"`) or named
//! (`"queen"`). Suits are a single letter or a full name.

use super::{DecodeError, Form};
use crate::card::{Card, Rank, RankToken, Suit, SuitToken};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Rank field of a numeric card object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericRank {
    Number(i64),
    Text(String),
}

/// A card in numeric-rank object form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumericCard {
    pub rank: NumericRank,
    pub suit: String,
}

const ACE_LOW: i64 = 1;
const ACE_HIGH: i64 = 14;

pub fn encode(card: Card) -> NumericCard {
    match card {
        Card::Standard { rank, suit } => NumericCard {
            rank: NumericRank::Number(i64::from(rank.value())),
            suit: suit.initial().to_string(),
        },
        Card::Joker(color) => NumericCard {
            rank: NumericRank::Text("joker".to_string()),
            suit: color.name().to_string(),
        },
    }
}

pub fn decode(input: &NumericCard) -> Result<Card, DecodeError> {
    let rank = decode_rank(&input.rank).ok_or_else(|| unrecognized(input))?;
    let suit = decode_suit(&input.suit).ok_or_else(|| unrecognized(input))?;
    Ok(Card::new(rank, suit)?)
}

/// Decode a JSON object, rejecting objects that lack either field.
pub fn decode_value(value: &Value) -> Result<Card, DecodeError> {
    let card: NumericCard = serde_json::from_value(value.clone())
        .map_err(|_| DecodeError::unrecognized(Form::Numeric, value.to_string()))?;
    decode(&card)
}

fn decode_rank(rank: &NumericRank) -> Option<RankToken> {
    match rank {
        NumericRank::Number(n) => rank_from_number(*n),
        NumericRank::Text(text) => {
            let text = text.trim();
            if let Ok(n) = text.parse::<i64>() {
                return rank_from_number(n);
            }
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(symbol), None) => Rank::from_symbol(symbol).map(RankToken::Standard),
                _ => RankToken::from_name(text),
            }
        }
    }
}

fn rank_from_number(n: i64) -> Option<RankToken> {
    let rank = match n {
        ACE_LOW | ACE_HIGH => Rank::Ace,
        2..=13 => Rank::from_value(n as u8)?,
        _ => return None,
    };
    Some(RankToken::Standard(rank))
}

fn decode_suit(suit: &str) -> Option<SuitToken> {
    let suit = suit.trim();
    let mut chars = suit.chars();
    match (chars.next(), chars.next()) {
        (Some(initial), None) => Suit::from_initial(initial).map(SuitToken::Standard),
        _ => SuitToken::from_name(suit),
    }
}

fn unrecognized(input: &NumericCard) -> DecodeError {
    let rank = match &input.rank {
        NumericRank::Number(n) => n.to_string(),
        NumericRank::Text(t) => t.clone(),
    };
    DecodeError::unrecognized(Form::Numeric, format!("{{rank: {}, suit: {}}}", rank, input.suit))
}

impl From<Card> for NumericCard {
    fn from(card: Card) -> Self {
        encode(card)
    }
}

impl TryFrom<&NumericCard> for Card {
    type Error = DecodeError;

    fn try_from(input: &NumericCard) -> Result<Self, Self::Error> {
        decode(input)
    }
}
