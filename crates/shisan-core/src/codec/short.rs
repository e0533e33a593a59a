//! Two-character short codes: rank symbol then suit initial.
//!
//! Encoding is uppercase (`"AS"`, `"TD"`); decoding ignores case. Jokers are
//! `"RJ"` and `"BJ"`, which cannot collide with a standard code because `R`
//! and `B` are not rank symbols.

use super::{DecodeError, Form};
use crate::card::{Card, JokerColor, Rank, Suit};

pub fn encode(card: Card) -> String {
    match card {
        Card::Standard { rank, suit } => {
            let mut code = String::with_capacity(2);
            code.push(rank.symbol());
            code.push(suit.initial().to_ascii_uppercase());
            code
        }
        Card::Joker(JokerColor::Red) => "RJ".to_string(),
        Card::Joker(JokerColor::Black) => "BJ".to_string(),
    }
}

pub fn decode(input: &str) -> Result<Card, DecodeError> {
    let mut chars = input.chars();
    let (Some(first), Some(second), None) = (chars.next(), chars.next(), chars.next()) else {
        return Err(if input.is_empty() {
            DecodeError::Empty
        } else {
            DecodeError::unrecognized(Form::Short, input)
        });
    };

    if second.eq_ignore_ascii_case(&'j') {
        match first.to_ascii_uppercase() {
            'R' => return Ok(Card::Joker(JokerColor::Red)),
            'B' => return Ok(Card::Joker(JokerColor::Black)),
            _ => {}
        }
    }

    let rank =
        Rank::from_symbol(first).ok_or_else(|| DecodeError::unrecognized(Form::Short, input))?;
    let suit =
        Suit::from_initial(second).ok_or_else(|| DecodeError::unrecognized(Form::Short, input))?;
    Ok(Card::standard(rank, suit))
}
