//! Error types for position parsing, move construction and table setup.

use thiserror::Error;

use crate::chess::board::{Piece, Square};

/// Reasons a position description string is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("expected 6 fields, found {0}")]
    FieldCount(usize),

    #[error("expected 8 ranks in piece placement, found {0}")]
    RankCount(usize),

    #[error("rank {rank} covers {files} files instead of 8")]
    RankWidth { rank: u8, files: u8 },

    #[error("unknown piece character '{0}'")]
    UnknownPiece(char),

    #[error("unknown active color \"{0}\"")]
    UnknownColor(String),

    #[error("unknown castling character '{0}'")]
    UnknownCastling(char),

    #[error("invalid en passant square \"{0}\"")]
    EnPassantSquare(String),

    #[error("{field} is not a valid counter: \"{value}\"")]
    Counter { field: &'static str, value: String },

    #[error("{color:?} has {count} kings")]
    KingCount { color: crate::chess::board::Color, count: u32 },
}

/// Reasons a move cannot be encoded or resolved.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error("invalid square {0} (must be 0-63)")]
    InvalidSquare(Square),

    #[error("invalid promotion type {0:?}")]
    InvalidPromotion(Piece),

    #[error("malformed move notation \"{0}\"")]
    Notation(String),

    #[error("move {0} is not legal in this position")]
    Illegal(String),

    #[error("no piece on square {0} to move")]
    EmptyOrigin(Square),

    #[error("piece on square {0} does not belong to the side to move")]
    NotToMove(Square),

    #[error("move {0} does not match the board")]
    BoardMismatch(String),
}

/// Slider kind reported by a failed magic self-check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slider {
    Rook,
    Bishop,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MagicError {
    #[error("{slider:?} magic for square {square} maps occupancy {occupancy:#018x} to a wrong attack set")]
    Mismatch {
        slider: Slider,
        square: Square,
        occupancy: u64,
    },
}

/// Reasons a perft suite line (`<FEN> ;D1 <nodes> ;D2 <nodes> ...`) is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EpdError {
    #[error(transparent)]
    Fen(#[from] FenError),

    #[error("expected depth marker \";D{depth}\", found \"{found}\"")]
    DepthMarker { depth: usize, found: String },

    #[error("node count \"{0}\" is not a number")]
    NodeCount(String),
}
