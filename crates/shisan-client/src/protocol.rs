//! JSON messages exchanged with the game backend.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use shisan_core::GameStatus;
use std::fmt;
use uuid::Uuid;

/// A user or player identifier.
///
/// Backends send ids as numbers or strings; both compare by their decimal
/// text, so `7` and `"7"` are the same player.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for PlayerId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => PlayerId(n.to_string()),
            Raw::Text(s) => PlayerId(s),
        })
    }
}

/// A player entry as the backend reports it.
///
/// Only `id` is interpreted; every other field (name, score, readiness,
/// submitted hand) is carried through untouched for the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PlayerId>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl PlayerRecord {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// Final outcome of a game, evaluated server-side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    #[serde(default)]
    pub players: Vec<PlayerRecord>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GameResult {
    /// The record belonging to `id`, if the result lists it
    pub fn player(&self, id: &PlayerId) -> Option<&PlayerRecord> {
        self.players.iter().find(|p| p.id.as_ref() == Some(id))
    }
}

/// Body of the poll endpoint.
///
/// `gameStatus` and `players` are required whenever `success` is true;
/// they are optional here so a response missing them can be reported as a
/// protocol violation rather than a parse failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollResponse {
    pub success: bool,
    #[serde(default)]
    pub game_status: Option<GameStatus>,
    #[serde(default)]
    pub players: Option<Vec<PlayerRecord>>,
    /// Raw cards in whatever encoding the backend stores
    #[serde(default)]
    pub hand: Option<Vec<Value>>,
    #[serde(default)]
    pub result: Option<GameResult>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Successful, correlated outcome of a bridged action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResponse {
    pub request_id: Uuid,
    pub action: String,
    pub data: Value,
}

/// Human-readable message carried by a backend envelope, if any
pub fn envelope_message(body: &Value) -> Option<String> {
    ["message", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

/// Whether a backend envelope explicitly reports failure
pub fn envelope_failed(body: &Value) -> bool {
    body.get("success").and_then(Value::as_bool) == Some(false)
}
