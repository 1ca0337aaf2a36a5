// Game state and the transitions applied to it: new game, move, winner check.

use serde::{Serialize, Serializer};
use thiserror::Error;
use tracing::{debug, info};

use crate::board::Board;
use crate::piece::{Color, Piece};
use crate::rules::{ClassicRules, MoveRules};
use crate::square::Square;

/// Reasons a move is rejected. The board is never touched when one of these
/// is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("Invalid source or not your turn")]
    InvalidSource,

    #[error("Destination already occupied")]
    DestinationOccupied,

    #[error("Illegal move")]
    Illegal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ongoing,
    Won,
}

/// Writes `None` as an empty string to keep the `"winner": ""` wire form.
pub fn serialize_winner<S: Serializer>(winner: &Option<Color>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(winner.map(Color::as_str).unwrap_or(""))
}

/// The complete state of the single game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameState {
    pub board: Board,
    /// The color allowed to move next.
    pub turn: Color,
    pub status: Status,
    #[serde(serialize_with = "serialize_winner")]
    pub winner: Option<Color>,
}

/// Result of a winner check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WinnerCheck {
    pub status: Status,
    #[serde(serialize_with = "serialize_winner")]
    pub winner: Option<Color>,
}

/// What an accepted move did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Square whose piece was taken, if the move captured.
    pub captured: Option<Square>,
    pub promoted: bool,
    pub status: Status,
    pub winner: Option<Color>,
}

impl GameState {
    /// Opening position, red to move.
    pub fn new() -> Self {
        GameState::with_board(Board::standard(), Color::Red)
    }

    /// Arbitrary position. Status and winner are derived from the board.
    pub fn with_board(board: Board, turn: Color) -> Self {
        let mut state = GameState {
            board,
            turn,
            status: Status::Ongoing,
            winner: None,
        };
        state.check_winner();
        state
    }

    /// Count pieces per color and update status/winner. Red running out is
    /// checked first, so an empty board is a black win.
    pub fn check_winner(&mut self) -> WinnerCheck {
        let red = self.board.count(Color::Red);
        let black = self.board.count(Color::Black);

        (self.status, self.winner) = if red == 0 {
            (Status::Won, Some(Color::Black))
        } else if black == 0 {
            (Status::Won, Some(Color::Red))
        } else {
            (Status::Ongoing, None)
        };

        WinnerCheck {
            status: self.status,
            winner: self.winner,
        }
    }

    /// The piece on `from` if it belongs to the side to move.
    pub fn movable_piece(&self, from: Square) -> Result<Piece, MoveError> {
        match self.board.get(from) {
            Some(p) if p.color == self.turn => Ok(p),
            _ => Err(MoveError::InvalidSource),
        }
    }

    /// Move the piece on `from` to `to` under `rules`.
    ///
    /// The source must hold a piece of the side to move and the destination
    /// must be empty. After the piece lands the turn passes to the other side
    /// unconditionally and the winner is recomputed.
    pub fn apply_move(
        &mut self,
        rules: &dyn MoveRules,
        from: Square,
        to: Square,
    ) -> Result<MoveOutcome, MoveError> {
        let piece = self.movable_piece(from)?;
        if self.board.is_occupied(to) {
            return Err(MoveError::DestinationOccupied);
        }
        rules.validate(&self.board, piece, from, to)?;

        let captured = rules.capture(&self.board, piece.color, from, to);
        if let Some(sq) = captured {
            self.board.remove(sq);
        }

        let promoted = rules.promotes(piece.color, to);
        let landed = if promoted { piece.crowned() } else { piece };

        self.board.remove(from);
        self.board.place(to, landed);
        self.turn = self.turn.opponent();
        let check = self.check_winner();

        debug!(%from, %to, ?captured, promoted, "move applied");

        Ok(MoveOutcome {
            captured,
            promoted,
            status: check.status,
            winner: check.winner,
        })
    }
}

impl Default for GameState {
    fn default() -> Self {
        GameState::new()
    }
}

/// Owns the game state together with the rule set used to move in it.
#[derive(Debug)]
pub struct Game {
    state: GameState,
    rules: Box<dyn MoveRules>,
}

impl Game {
    pub fn new(rules: Box<dyn MoveRules>) -> Self {
        Game {
            state: GameState::new(),
            rules,
        }
    }

    /// Start from an arbitrary position.
    pub fn from_state(state: GameState, rules: Box<dyn MoveRules>) -> Self {
        Game { state, rules }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn rules(&self) -> &dyn MoveRules {
        self.rules.as_ref()
    }

    /// Replace the whole state with a fresh opening position.
    pub fn reset(&mut self) {
        self.state = GameState::new();
        info!(rules = self.rules.name(), "new game started");
    }

    pub fn apply_move(&mut self, from: Square, to: Square) -> Result<MoveOutcome, MoveError> {
        let outcome = self.state.apply_move(self.rules.as_ref(), from, to)?;
        if let Some(winner) = outcome.winner {
            info!(%winner, "game won");
        }
        Ok(outcome)
    }

    pub fn check_winner(&mut self) -> WinnerCheck {
        self.state.check_winner()
    }
}

impl Default for Game {
    fn default() -> Self {
        Game::new(Box::new(ClassicRules))
    }
}
