// JSON request and response bodies exchanged with the browser client.

use checkers_core::game::serialize_winner;
use checkers_core::{Board, Color, GameState, MoveOutcome, Square, Status, WinnerCheck};
use serde::{Deserialize, Serialize, Serializer};

pub const NEW_GAME_MESSAGE: &str = "New game started.";
pub const MOVE_MESSAGE: &str = "Move successful.";
pub const GREETING: &str = "Hello World!";

/// Body of `POST /game/move`. Missing fields decode as empty labels; labels
/// are parsed against the board after decoding.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MoveRequest {
    pub source: String,
    pub destination: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewGameResponse {
    pub message: &'static str,
    pub board: Board,
    pub turn: Color,
}

impl NewGameResponse {
    pub fn from_state(state: &GameState) -> Self {
        NewGameResponse {
            message: NEW_GAME_MESSAGE,
            board: state.board.clone(),
            turn: state.turn,
        }
    }
}

/// Body returned for an accepted move.
#[derive(Debug, Clone, Serialize)]
pub struct MoveResponse {
    pub message: &'static str,
    pub board: Board,
    pub turn: Color,
    pub captured: bool,
    /// Label of the captured square, or `""` when nothing was taken.
    #[serde(serialize_with = "serialize_captured")]
    pub captured_pos: Option<Square>,
    pub promoted: bool,
    pub status: Status,
    #[serde(serialize_with = "serialize_winner")]
    pub winner: Option<Color>,
}

fn serialize_captured<S: Serializer>(
    captured: &Option<Square>,
    s: S,
) -> Result<S::Ok, S::Error> {
    match captured {
        Some(sq) => s.collect_str(sq),
        None => s.serialize_str(""),
    }
}

impl MoveResponse {
    pub fn new(state: &GameState, outcome: MoveOutcome) -> Self {
        MoveResponse {
            message: MOVE_MESSAGE,
            board: state.board.clone(),
            turn: state.turn,
            captured: outcome.captured.is_some(),
            captured_pos: outcome.captured,
            promoted: outcome.promoted,
            status: outcome.status,
            winner: outcome.winner,
        }
    }
}

/// Body of `GET /game/check-winner`.
pub type WinnerResponse = WinnerCheck;
