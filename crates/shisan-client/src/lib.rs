//! Shisan client - keeps a Thirteen Waters table in sync with the backend
//!
//! # Architecture
//!
//! - [`bridge`]: Issues actions from an isolated worker task and correlates
//!   each reply with its caller by request id
//! - [`reconciler`]: Polls the game status endpoint and folds responses into
//!   a local [`Snapshot`]
//! - [`routing`]: Maps action names to GET or POST calls
//! - [`transport`]: The HTTP capability both of the above run on
//! - [`display`]: Card image paths with a card-back fallback
//!
//! Card types, codecs and the deck engine live in `shisan_core`.

pub mod bridge;
pub mod config;
pub mod display;
pub mod protocol;
pub mod reconciler;
pub mod routing;
pub mod transport;

pub use bridge::{Bridge, BridgeError};
pub use config::{ClientConfig, ConfigError};
pub use protocol::{ActionResponse, GameResult, PlayerId, PlayerRecord, PollResponse};
pub use reconciler::{
    spawn_poller, Applied, PollOutcome, PollTarget, PollerHandle, ProtocolViolation, Reconciler,
    Snapshot,
};
pub use routing::{ActionKind, HttpCall, Method, RouteError};
pub use transport::{HttpTransport, Transport, TransportError};
