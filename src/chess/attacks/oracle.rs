use crate::chess::{attacks::magics::attack_tables, board::*};

/// Every piece of `attacker_color` that attacks `square` when the board
/// holds `occupancy`.
#[inline(always)]
pub fn get_attackers(
    square: Square,
    attacker_color: Color,
    occupancy: u64,
    position: &Position,
) -> u64 {
    let tables = attack_tables();
    let queens = position.bitboard(Piece::Queen, attacker_color);

    // A pawn of the attacking color attacks `square` exactly when a pawn of
    // the other color on `square` would attack it back.
    (tables.pawn(attacker_color.toggle(), square) & position.bitboard(Piece::Pawn, attacker_color))
        | (tables.knight(square) & position.bitboard(Piece::Knight, attacker_color))
        | (tables.bishop(square, occupancy)
            & (position.bitboard(Piece::Bishop, attacker_color) | queens))
        | (tables.rook(square, occupancy) & (position.bitboard(Piece::Rook, attacker_color) | queens))
        | (tables.king(square) & position.bitboard(Piece::King, attacker_color))
}

#[inline(always)]
pub fn is_square_attacked(square: Square, attacker_color: Color, position: &Position) -> bool {
    let tables = attack_tables();
    let occupancy = position.occupied();
    let queens = position.bitboard(Piece::Queen, attacker_color);

    tables.pawn(attacker_color.toggle(), square) & position.bitboard(Piece::Pawn, attacker_color)
        != 0
        || tables.knight(square) & position.bitboard(Piece::Knight, attacker_color) != 0
        || tables.king(square) & position.bitboard(Piece::King, attacker_color) != 0
        || tables.bishop(square, occupancy)
            & (position.bitboard(Piece::Bishop, attacker_color) | queens)
            != 0
        || tables.rook(square, occupancy) & (position.bitboard(Piece::Rook, attacker_color) | queens)
            != 0
}

#[inline(always)]
pub fn is_in_check(color: Color, position: &Position) -> bool {
    is_square_attacked(position.king_square(color), color.toggle(), position)
}

impl Position {
    pub fn is_square_attacked(&self, square: Square, by: Color) -> bool {
        is_square_attacked(square, by, self)
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        is_in_check(color, self)
    }

    /// Pieces giving check to the side to move.
    pub fn checkers(&self) -> u64 {
        let color = self.side_to_move;
        get_attackers(self.king_square(color), color.toggle(), self.occupied, self)
    }
}
