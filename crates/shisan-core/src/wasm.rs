//! WebAssembly bindings for the card codec and deck engine.
//!
//! This module exposes the codec and deck to JavaScript through wasm-bindgen
//! so the browser front end uses the same card model as the native client.

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

#[cfg(feature = "wasm")]
use crate::codec::{self, AssetExt, AssetStyle};
#[cfg(feature = "wasm")]
use crate::deck::Deck;

/// Initialize panic hook for better error messages in browser console
#[cfg(feature = "wasm")]
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Decode any card form into its verbose string (`"ace_of_spades"`)
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = toVerbose)]
pub fn to_verbose(input: &str) -> Result<String, JsValue> {
    codec::decode(input)
        .map(codec::verbose::encode)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Decode any card form into its short code (`"AS"`)
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = toShort)]
pub fn to_short(input: &str) -> Result<String, JsValue> {
    codec::decode(input)
        .map(codec::short::encode)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Decode a numeric-rank object given as JSON (`{"rank":14,"suit":"s"}`)
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = fromNumeric)]
pub fn from_numeric(card_json: &str) -> Result<String, JsValue> {
    let value: serde_json::Value = serde_json::from_str(card_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid card JSON: {}", e)))?;
    codec::decode_value(&value)
        .map(codec::verbose::encode)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Image path for a card in any form, or the back of the card when the
/// input is not a card. `ext` is `"svg"` or `"png"`.
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = cardImageUrl)]
pub fn card_image_url(input: &str, base: &str, ext: &str) -> String {
    let ext = AssetExt::from_extension(ext).unwrap_or_default();
    codec::asset::path_or_back(input, &AssetStyle::new(base, ext))
}

/// WASM-exposed deck wrapper
#[cfg(feature = "wasm")]
#[wasm_bindgen]
pub struct WasmDeck {
    deck: Deck,
}

#[cfg(feature = "wasm")]
#[wasm_bindgen]
impl WasmDeck {
    /// Create a fresh deck in canonical order
    #[wasm_bindgen(constructor)]
    pub fn new(with_jokers: bool) -> WasmDeck {
        let deck = if with_jokers {
            Deck::with_jokers()
        } else {
            Deck::standard()
        };
        WasmDeck { deck }
    }

    /// Shuffle in place
    pub fn shuffle(&mut self) {
        self.deck.shuffle(&mut rand::thread_rng());
    }

    /// Number of cards left
    #[wasm_bindgen(getter)]
    pub fn length(&self) -> usize {
        self.deck.len()
    }

    /// Cards as a JSON array of verbose strings
    #[wasm_bindgen(js_name = getCards)]
    pub fn get_cards(&self) -> String {
        serde_json::to_string(self.deck.cards()).unwrap_or_else(|_| "[]".to_string())
    }

    /// Deal round-robin and return `{hands, residual}` as JSON
    pub fn deal(&self, hand_count: usize, hand_size: usize) -> Result<String, JsValue> {
        let deal = self
            .deck
            .clone()
            .deal(hand_count, hand_size)
            .map_err(|e| JsValue::from_str(&format!("Deal failed: {}", e)))?;
        serde_json::to_string(&deal).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}
