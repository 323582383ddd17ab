use crate::chess::{board::*, error::MoveError, moves::Move};

/// Read-only copy of a position's state without its history, cheap enough
/// to hand to exporters or other threads. Successor snapshots are built
/// copy-on-write; the mutable `Position` stays the tool for search loops.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Snapshot {
    bitboards: [u64; PIECE_KINDS],
    side_to_move: Color,
    castling_rights: u8,
    en_passant_square: Option<Square>,
    halfmove_clock: u16,
    fullmove_number: u16,
    hash: u64,
}

impl Snapshot {
    pub fn piece_at(&self, square: Square) -> Option<(Piece, Color)> {
        piece_on(&self.bitboards, square)
    }

    pub fn bitboard(&self, piece: Piece, color: Color) -> u64 {
        self.bitboards[piece_index(piece, color)]
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn castling_rights(&self) -> u8 {
        self.castling_rights
    }

    pub fn en_passant_square(&self) -> Option<Square> {
        self.en_passant_square
    }

    pub fn hash(&self) -> u64 {
        self.hash
    }

    pub fn to_fen(&self) -> String {
        Position::from(*self).to_fen()
    }

    /// The position after `mov`, leaving `self` untouched.
    pub fn apply(&self, mov: Move) -> Result<Snapshot, MoveError> {
        let mut position = Position::from(*self);
        position.try_make_move(mov)?;
        Ok(position.snapshot())
    }
}

impl Position {
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            bitboards: self.bitboards,
            side_to_move: self.side_to_move,
            castling_rights: self.castling_rights,
            en_passant_square: self.en_passant_square,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
            hash: self.zobrist,
        }
    }
}

impl From<Snapshot> for Position {
    /// Rebuilds a mutable position with an empty history.
    fn from(snapshot: Snapshot) -> Self {
        let mut position = Position::empty();
        position.bitboards = snapshot.bitboards;
        position.side_to_move = snapshot.side_to_move;
        position.castling_rights = snapshot.castling_rights;
        position.en_passant_square = snapshot.en_passant_square;
        position.halfmove_clock = snapshot.halfmove_clock;
        position.fullmove_number = snapshot.fullmove_number;
        position.refresh_occupancy();
        position.zobrist = snapshot.hash;
        position
    }
}
