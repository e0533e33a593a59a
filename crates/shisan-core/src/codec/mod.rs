//! Conversions between [`Card`] and the encodings found in the wild.
//!
//! Each submodule owns one form and exposes a total `encode` and a partial
//! `decode`:
//! - [`verbose`]: `"10_of_clubs"`, `"red_joker"`
//! - [`short`]: `"TC"`, `"as"`, `"RJ"`
//! - [`numeric`]: `{"rank": 14, "suit": "s"}`
//! - [`asset`]: `"10_of_clubs.svg"`, plus display path helpers
//! - [`suit_value`]: `"c10"`, `"s1"`
//!
//! [`decode`] and [`decode_value`] sniff the form from the input. Decoding
//! never panics; callers that only need an image fall back to the back of
//! the card via [`asset::path_or_back`].

pub mod asset;
pub mod numeric;
pub mod short;
pub mod suit_value;
pub mod verbose;

use crate::card::{Card, CardError};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

pub use asset::{AssetExt, AssetStyle};
pub use numeric::{NumericCard, NumericRank};

/// Which grammar a decoder was applying
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Form {
    Verbose,
    Short,
    Numeric,
    Asset,
    SuitValue,
    /// No grammar matched the shape of the input
    Any,
}

impl fmt::Display for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Form::Verbose => "verbose",
            Form::Short => "short",
            Form::Numeric => "numeric",
            Form::Asset => "asset",
            Form::SuitValue => "suit-value",
            Form::Any => "any",
        })
    }
}

/// Input that does not describe a card
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("empty card input")]
    Empty,

    #[error("null card input")]
    Null,

    #[error("unrecognized {form} card: {input:?}")]
    Unrecognized { form: Form, input: String },

    #[error(transparent)]
    Invalid(#[from] CardError),
}

impl DecodeError {
    pub(crate) fn unrecognized(form: Form, input: impl Into<String>) -> Self {
        DecodeError::Unrecognized {
            form,
            input: input.into(),
        }
    }
}

/// Decode a card from any textual form.
///
/// Strings containing `_of_` or ending in `_joker` are verbose (or asset
/// filenames when they carry an extension); two-character strings are short
/// codes, falling back to the suit-value form (`"s1"`); three-character
/// strings are tried as suit-value codes (`"c10"`).
pub fn decode(input: &str) -> Result<Card, DecodeError> {
    if input.is_empty() {
        return Err(DecodeError::Empty);
    }

    let lower = input.to_ascii_lowercase();
    if lower.contains("_of_") || lower.contains("_joker") {
        return if asset::has_known_ext(input) {
            asset::decode(input)
        } else {
            verbose::decode(input)
        };
    }

    match input.chars().count() {
        2 => short::decode(input).or_else(|_| suit_value::decode(input)),
        3 => suit_value::decode(input),
        _ => Err(DecodeError::unrecognized(Form::Any, input)),
    }
}

/// Decode a card from a JSON value: strings go through [`decode`], objects
/// through the numeric-rank form.
pub fn decode_value(value: &Value) -> Result<Card, DecodeError> {
    match value {
        Value::Null => Err(DecodeError::Null),
        Value::String(s) => decode(s),
        Value::Object(_) => numeric::decode_value(value),
        other => Err(DecodeError::unrecognized(Form::Any, other.to_string())),
    }
}

/// Decode a JSON array of cards; fails on the first undecodable entry.
pub fn decode_all(values: &[Value]) -> Result<Vec<Card>, DecodeError> {
    values.iter().map(decode_value).collect()
}
