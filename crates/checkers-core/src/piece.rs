// Piece colors and the pieces placed on the board.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The two sides. Red always moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Black,
}

impl Color {
    pub fn opponent(self) -> Color {
        match self {
            Color::Red => Color::Black,
            Color::Black => Color::Red,
        }
    }

    /// The 1-based row on which a piece of this color is crowned.
    pub fn promotion_row(self) -> u8 {
        match self {
            Color::Red => 8,
            Color::Black => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Black => "black",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A piece sitting on a square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub color: Color,
    pub king: bool,
}

impl Piece {
    pub fn man(color: Color) -> Self {
        Piece { color, king: false }
    }

    pub fn king(color: Color) -> Self {
        Piece { color, king: true }
    }

    pub fn crowned(self) -> Self {
        Piece { king: true, ..self }
    }
}
