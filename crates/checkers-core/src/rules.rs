// Move rules: geometry checks, capture detection, and promotion.
//
// The engine only checks occupancy and turn order itself. Everything about
// what a move *means* goes through a `MoveRules` implementation so stricter
// variants can be swapped in from configuration.

use std::fmt;

use serde::Deserialize;

use crate::board::Board;
use crate::game::MoveError;
use crate::piece::{Color, Piece};
use crate::square::Square;

pub trait MoveRules: fmt::Debug + Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Check the geometry of a move whose source and destination have
    /// already passed the occupancy and turn checks.
    fn validate(&self, board: &Board, piece: Piece, from: Square, to: Square)
        -> Result<(), MoveError>;

    /// The square whose piece this move removes, if any.
    fn capture(&self, board: &Board, mover: Color, from: Square, to: Square) -> Option<Square>;

    fn promotes(&self, color: Color, to: Square) -> bool {
        to.row() == color.promotion_row()
    }
}

/// Returns the midpoint of `from`/`to` when it holds a piece of the other color.
fn opposing_midpoint(board: &Board, mover: Color, from: Square, to: Square) -> Option<Square> {
    let mid = from.midpoint(to);
    board
        .get(mid)
        .filter(|p| p.color != mover)
        .map(|_| mid)
}

/// Accepts any move to an empty square. A move captures whenever the
/// truncated midpoint of source and destination holds an opposing piece,
/// whatever the distance travelled.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassicRules;

impl MoveRules for ClassicRules {
    fn name(&self) -> &'static str {
        "classic"
    }

    fn validate(&self, _: &Board, _: Piece, _: Square, _: Square) -> Result<(), MoveError> {
        Ok(())
    }

    fn capture(&self, board: &Board, mover: Color, from: Square, to: Square) -> Option<Square> {
        opposing_midpoint(board, mover, from, to)
    }
}

/// Requires a single diagonal step, or a two-square diagonal jump over an
/// opposing piece. Only jumps capture. Direction is not restricted.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiagonalRules;

impl MoveRules for DiagonalRules {
    fn name(&self) -> &'static str {
        "diagonal"
    }

    fn validate(
        &self,
        board: &Board,
        piece: Piece,
        from: Square,
        to: Square,
    ) -> Result<(), MoveError> {
        match from.delta(to) {
            (dc, dr) if dc.abs() == 1 && dr.abs() == 1 => Ok(()),
            (dc, dr) if dc.abs() == 2 && dr.abs() == 2 => {
                if opposing_midpoint(board, piece.color, from, to).is_some() {
                    Ok(())
                } else {
                    Err(MoveError::Illegal)
                }
            }
            _ => Err(MoveError::Illegal),
        }
    }

    fn capture(&self, board: &Board, mover: Color, from: Square, to: Square) -> Option<Square> {
        let (dc, _) = from.delta(to);
        if dc.abs() == 2 {
            opposing_midpoint(board, mover, from, to)
        } else {
            None
        }
    }
}

/// Rule set selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleSet {
    #[default]
    Classic,
    Diagonal,
}

impl RuleSet {
    pub fn build(self) -> Box<dyn MoveRules> {
        match self {
            RuleSet::Classic => Box::new(ClassicRules),
            RuleSet::Diagonal => Box::new(DiagonalRules),
        }
    }
}
