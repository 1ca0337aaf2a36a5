// Board coordinates and their two-character labels ("A1" .. "H8").

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of columns and rows on the board.
pub const BOARD_SIZE: u8 = 8;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    #[error("position label must be two characters, got {0:?}")]
    BadLength(String),

    #[error("column must be a letter A-H, got {0:?}")]
    BadColumn(char),

    #[error("row must be a digit 1-8, got {0:?}")]
    BadRow(char),
}

/// A square on the 8x8 board, stored as zero-based column and row indices.
///
/// Labels exist only at the boundary: `"C5"` parses to column 2, row 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Square {
    col: u8,
    row: u8,
}

impl Square {
    /// Build a square from zero-based indices, or `None` if off the board.
    pub fn new(col: u8, row: u8) -> Option<Self> {
        (col < BOARD_SIZE && row < BOARD_SIZE).then_some(Square { col, row })
    }

    /// Const constructor for fixed layouts. Out-of-range indices fail at
    /// compile time when used in a const context.
    pub const fn at(col: u8, row: u8) -> Self {
        assert!(col < BOARD_SIZE && row < BOARD_SIZE);
        Square { col, row }
    }

    pub fn col(self) -> u8 {
        self.col
    }

    pub fn row_index(self) -> u8 {
        self.row
    }

    /// The 1-based row digit shown in the label.
    pub fn row(self) -> u8 {
        self.row + 1
    }

    /// Truncated average of both coordinates.
    pub fn midpoint(self, other: Square) -> Square {
        Square {
            col: (self.col + other.col) / 2,
            row: (self.row + other.row) / 2,
        }
    }

    /// Signed (column, row) offset from `self` to `other`.
    pub fn delta(self, other: Square) -> (i8, i8) {
        (
            other.col as i8 - self.col as i8,
            other.row as i8 - self.row as i8,
        )
    }

    /// All 64 squares, column-major.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..BOARD_SIZE).flat_map(|col| (0..BOARD_SIZE).map(move |row| Square { col, row }))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'A' + self.col) as char, self.row + 1)
    }
}

impl FromStr for Square {
    type Err = PositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (Some(col), Some(row), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(PositionError::BadLength(s.to_string()));
        };

        if !('A'..='H').contains(&col) {
            return Err(PositionError::BadColumn(col));
        }
        if !('1'..='8').contains(&row) {
            return Err(PositionError::BadRow(row));
        }

        Ok(Square {
            col: col as u8 - b'A',
            row: row as u8 - b'1',
        })
    }
}

impl TryFrom<String> for Square {
    type Error = PositionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Square> for String {
    fn from(square: Square) -> Self {
        square.to_string()
    }
}
