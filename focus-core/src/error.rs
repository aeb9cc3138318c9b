use serde::Serialize;

/// Reasons a move or reserve placement is rejected.
///
/// A rejected request never mutates the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
pub enum RuleError {
    #[error("unknown player {0}")]
    UnknownPlayer(String),

    #[error("not your turn")]
    OutOfTurn,

    /// Off the board, or the start stack is not topped by the mover's piece.
    #[error("invalid location")]
    InvalidPosition,

    /// Diagonal, or the distance differs from the number of pieces moved.
    #[error("invalid location: a move must be straight and span as many squares as pieces moved")]
    InvalidGeometry,

    #[error("invalid number of pieces")]
    InvalidPieceCount,

    #[error("No pieces in reserve")]
    NoReserve,
}
