// Checkers game engine: board model, move rules, and game state transitions.

pub mod board;
pub mod game;
pub mod piece;
pub mod rules;
pub mod square;

pub use board::Board;
pub use game::{Game, GameState, MoveError, MoveOutcome, Status, WinnerCheck};
pub use piece::{Color, Piece};
pub use rules::{ClassicRules, DiagonalRules, MoveRules, RuleSet};
pub use square::{PositionError, Square};
