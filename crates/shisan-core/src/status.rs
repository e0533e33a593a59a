//! Game status as reported by the backend.
//!
//! Status only moves forward: `matching -> dealt / in progress -> finished`.
//! Once a session is finished it stays finished.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusError {
    #[error("Status cannot go back from {from} to {to}")]
    Regression { from: GameStatus, to: GameStatus },
}

/// Lifecycle of one game session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    /// Waiting for seats to fill
    #[default]
    #[serde(alias = "waiting")]
    Matching,
    /// Hands have been dealt
    Dealt,
    /// Players are arranging or playing their hands
    #[serde(
        alias = "playing",
        alias = "in-progress",
        alias = "arranging",
        alias = "comparing"
    )]
    InProgress,
    /// Results are final
    #[serde(alias = "ended")]
    Finished,
}

impl GameStatus {
    /// Position in the lifecycle. `Dealt` and `InProgress` share a stage.
    fn stage(self) -> u8 {
        match self {
            GameStatus::Matching => 0,
            GameStatus::Dealt | GameStatus::InProgress => 1,
            GameStatus::Finished => 2,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == GameStatus::Finished
    }

    /// Move to `next`, refusing to go back to an earlier stage.
    pub fn advance(self, next: GameStatus) -> Result<GameStatus, StatusError> {
        if next.stage() < self.stage() {
            return Err(StatusError::Regression {
                from: self,
                to: next,
            });
        }
        Ok(next)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GameStatus::Matching => "matching",
            GameStatus::Dealt => "dealt",
            GameStatus::InProgress => "in_progress",
            GameStatus::Finished => "finished",
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
