//! Verbose `"<rank>_of_<suit>"` strings and the `"<color>_joker"` literals.
//!
//! The `_of_` separator and `_joker` suffix are matched literally; rank and suit tokens ignore
//! ASCII case.

use super::{DecodeError, Form};
use crate::card::{Card, JokerColor, RankToken, SuitToken};

const SEPARATOR: &str = "_of_";
const JOKER_SUFFIX: &str = "_joker";

pub fn encode(card: Card) -> String {
    match card {
        Card::Standard { rank, suit } => format!("{}{}{}", rank.name(), SEPARATOR, suit.name()),
        Card::Joker(color) => format!("{}{}", color.name(), JOKER_SUFFIX),
    }
}

pub fn decode(input: &str) -> Result<Card, DecodeError> {
    if input.is_empty() {
        return Err(DecodeError::Empty);
    }
    if let Some(color) = decode_joker(input) {
        return Ok(Card::Joker(color));
    }

    let (rank, suit) = input
        .split_once(SEPARATOR)
        .ok_or_else(|| DecodeError::unrecognized(Form::Verbose, input))?;
    let rank = RankToken::from_name(rank)
        .ok_or_else(|| DecodeError::unrecognized(Form::Verbose, input))?;
    let suit = SuitToken::from_name(suit)
        .ok_or_else(|| DecodeError::unrecognized(Form::Verbose, input))?;

    match Card::new(rank, suit)? {
        // jokers only exist as "<color>_joker"
        Card::Joker(_) => Err(DecodeError::unrecognized(Form::Verbose, input)),
        card => Ok(card),
    }
}

fn decode_joker(input: &str) -> Option<JokerColor> {
    let split = input.len().checked_sub(JOKER_SUFFIX.len())?;
    if !input.is_char_boundary(split) {
        return None;
    }
    let (color, suffix) = input.split_at(split);
    if suffix != JOKER_SUFFIX {
        return None;
    }
    JokerColor::from_name(color)
}
