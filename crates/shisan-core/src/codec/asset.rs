//! Asset filenames (`"10_of_clubs.svg"`) and display paths.
//!
//! Filenames are the verbose form with an image extension appended. They
//! exist to build image paths for the card faces; nothing stores them.

use super::{verbose, DecodeError, Form};
use crate::card::Card;
use serde::{Deserialize, Serialize};

/// Image format of the card face assets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetExt {
    #[default]
    Svg,
    Png,
}

impl AssetExt {
    pub const ALL: [AssetExt; 2] = [AssetExt::Svg, AssetExt::Png];

    pub fn extension(self) -> &'static str {
        match self {
            AssetExt::Svg => "svg",
            AssetExt::Png => "png",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        AssetExt::ALL
            .into_iter()
            .find(|e| e.extension().eq_ignore_ascii_case(ext))
    }
}

/// Where card images live and what to show when a card is unknown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetStyle {
    /// Directory or URL prefix, without a trailing slash
    pub base: String,
    pub ext: AssetExt,
    /// Filename of the back-of-card placeholder
    pub back: String,
}

impl AssetStyle {
    pub fn new(base: impl Into<String>, ext: AssetExt) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
            ext,
            back: format!("card_back.{}", ext.extension()),
        }
    }

    pub fn with_back(mut self, back: impl Into<String>) -> Self {
        self.back = back.into();
        self
    }

    /// Path of the back-of-card placeholder
    pub fn back_path(&self) -> String {
        self.join(&self.back)
    }

    fn join(&self, filename: &str) -> String {
        if self.base.is_empty() {
            filename.to_string()
        } else {
            format!("{}/{}", self.base, filename)
        }
    }
}

impl Default for AssetStyle {
    fn default() -> Self {
        AssetStyle::new("/cards", AssetExt::Svg)
    }
}

pub fn encode(card: Card, ext: AssetExt) -> String {
    format!("{}.{}", verbose::encode(card), ext.extension())
}

pub fn decode(input: &str) -> Result<Card, DecodeError> {
    if input.is_empty() {
        return Err(DecodeError::Empty);
    }
    let (stem, ext) = input
        .rsplit_once('.')
        .ok_or_else(|| DecodeError::unrecognized(Form::Asset, input))?;
    AssetExt::from_extension(ext).ok_or_else(|| DecodeError::unrecognized(Form::Asset, input))?;
    verbose::decode(stem).map_err(|e| match e {
        DecodeError::Invalid(_) => e,
        _ => DecodeError::unrecognized(Form::Asset, input),
    })
}

/// Whether the input ends in an image extension this module knows about
pub fn has_known_ext(input: &str) -> bool {
    input
        .rsplit_once('.')
        .is_some_and(|(_, ext)| AssetExt::from_extension(ext).is_some())
}

/// Display path of a card, or of the back when the card is unknown
pub fn path(card: Option<&Card>, style: &AssetStyle) -> String {
    match card {
        Some(card) => style.join(&encode(*card, style.ext)),
        None => style.back_path(),
    }
}

/// Decode any textual form and return its display path, or the back of the
/// card if the input is not a card.
pub fn path_or_back(input: &str, style: &AssetStyle) -> String {
    path(super::decode(input).ok().as_ref(), style)
}
