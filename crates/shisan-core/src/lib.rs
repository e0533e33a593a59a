//! Shisan - card model and deck engine for a Thirteen Waters client
//!
//! This crate provides the pure, platform-agnostic core of the client:
//! - A canonical card model with validated construction
//! - Codecs for every card encoding the backends and assets use
//! - Deck construction, shuffling and dealing
//! - The game status lifecycle
//!
//! # Architecture
//!
//! Nothing here performs I/O. It can be compiled to:
//! - Native Rust for the synchronization client
//! - WebAssembly for the browser front end (feature `wasm`)
//!
//! # Modules
//!
//! - [`card`]: Rank, suit, joker and card types
//! - [`codec`]: Verbose, short, numeric, asset and suit-value encodings
//! - [`deck`]: Building, shuffling and dealing decks
//! - [`status`]: Monotonic game status

pub mod card;
pub mod codec;
pub mod deck;
pub mod status;
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use card::{Card, CardError, JokerColor, Rank, RankToken, Suit, SuitToken};
pub use codec::{decode, decode_value, AssetExt, AssetStyle, DecodeError, Form, NumericCard};
pub use deck::{Deal, Deck, DeckError, Hand, STANDARD_DECK_SIZE};
pub use status::{GameStatus, StatusError};
