// The 8x8 board and its JSON wire form.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::piece::{Color, Piece};
use crate::square::{Square, BOARD_SIZE};

const N: usize = BOARD_SIZE as usize;

/// Red's twelve starting squares (columns A-C).
pub const RED_START: [Square; 12] = [
    Square::at(0, 0),
    Square::at(0, 2),
    Square::at(0, 4),
    Square::at(0, 6),
    Square::at(1, 1),
    Square::at(1, 3),
    Square::at(1, 5),
    Square::at(1, 7),
    Square::at(2, 0),
    Square::at(2, 2),
    Square::at(2, 4),
    Square::at(2, 6),
];

/// Black's twelve starting squares (columns F-H).
pub const BLACK_START: [Square; 12] = [
    Square::at(5, 1),
    Square::at(5, 3),
    Square::at(5, 5),
    Square::at(5, 7),
    Square::at(6, 0),
    Square::at(6, 2),
    Square::at(6, 4),
    Square::at(6, 6),
    Square::at(7, 1),
    Square::at(7, 3),
    Square::at(7, 5),
    Square::at(7, 7),
];

/// Board contents indexed by `[col][row]`. `None` means the square is empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Board {
    squares: [[Option<Piece>; N]; N],
}

impl Board {
    pub fn empty() -> Self {
        Board::default()
    }

    /// The opening position: 12 red men and 12 black men.
    pub fn standard() -> Self {
        let mut board = Board::empty();
        for sq in RED_START {
            board.place(sq, Piece::man(Color::Red));
        }
        for sq in BLACK_START {
            board.place(sq, Piece::man(Color::Black));
        }
        board
    }

    pub fn get(&self, sq: Square) -> Option<Piece> {
        self.squares[sq.col() as usize][sq.row_index() as usize]
    }

    pub fn is_occupied(&self, sq: Square) -> bool {
        self.get(sq).is_some()
    }

    /// Put `piece` on `sq`, replacing whatever was there.
    pub fn place(&mut self, sq: Square, piece: Piece) {
        self.squares[sq.col() as usize][sq.row_index() as usize] = Some(piece);
    }

    /// Clear `sq`, returning the piece that stood there.
    pub fn remove(&mut self, sq: Square) -> Option<Piece> {
        self.squares[sq.col() as usize][sq.row_index() as usize].take()
    }

    /// Occupied squares in column-major order.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| self.get(sq).map(|p| (sq, p)))
    }

    pub fn count(&self, color: Color) -> usize {
        self.pieces().filter(|(_, p)| p.color == color).count()
    }

    pub fn occupied_count(&self) -> usize {
        self.pieces().count()
    }
}

/// Per-square entry of the JSON board object.
#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct PieceState {
    is_occupied: bool,
    is_king: bool,
    color: Color,
}

/// Serializes as `{"A1": {"isOccupied": true, "isKing": false, "color": "red"}, ...}`
/// listing occupied squares only.
impl Serialize for Board {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.occupied_count()))?;
        for (sq, piece) in self.pieces() {
            map.serialize_entry(
                &sq,
                &PieceState {
                    is_occupied: true,
                    is_king: piece.king,
                    color: piece.color,
                },
            )?;
        }
        map.end()
    }
}
