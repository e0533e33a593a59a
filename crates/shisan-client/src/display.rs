//! Image paths for rendering cards.

use serde_json::Value;
use shisan_core::codec::asset;
use shisan_core::{decode_value, AssetStyle, Card};
use tracing::debug;

/// Path of the face image for a raw card, or the card back if it cannot be
/// decoded. Never fails.
pub fn card_asset(raw: &Value, style: &AssetStyle) -> String {
    match decode_value(raw) {
        Ok(card) => asset::path(Some(&card), style),
        Err(e) => {
            debug!(card = %raw, error = %e, "Showing card back for undecodable card");
            style.back_path()
        }
    }
}

pub fn hand_assets(hand: &[Card], style: &AssetStyle) -> Vec<String> {
    hand.iter().map(|card| asset::path(Some(card), style)).collect()
}
