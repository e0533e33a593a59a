//! Suit-letter plus number codes: `"s1"` is the ace of spades, `"c10"` the
//! ten of clubs. Ace is `1` and faces are `11`-`13`.
//!
//! The form has no spelling for jokers, so [`encode`] is only defined on
//! standard cards.

use super::{DecodeError, Form};
use crate::card::{Card, Rank, Suit};

pub fn encode(card: Card) -> Option<String> {
    match card {
        Card::Standard { rank, suit } => {
            let number = match rank {
                Rank::Ace => 1,
                other => other.value(),
            };
            Some(format!("{}{}", suit.initial(), number))
        }
        Card::Joker(_) => None,
    }
}

pub fn decode(input: &str) -> Result<Card, DecodeError> {
    let mut chars = input.chars();
    let Some(initial) = chars.next() else {
        return Err(DecodeError::Empty);
    };
    let suit =
        Suit::from_initial(initial).ok_or_else(|| DecodeError::unrecognized(Form::SuitValue, input))?;
    let digits = chars.as_str();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DecodeError::unrecognized(Form::SuitValue, input));
    }
    let number: u8 = digits
        .parse()
        .map_err(|_| DecodeError::unrecognized(Form::SuitValue, input))?;
    let rank = match number {
        1 => Rank::Ace,
        2..=13 => Rank::from_value(number)
            .ok_or_else(|| DecodeError::unrecognized(Form::SuitValue, input))?,
        _ => return Err(DecodeError::unrecognized(Form::SuitValue, input)),
    };
    Ok(Card::standard(rank, suit))
}
