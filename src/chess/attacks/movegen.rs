use tinyvec::ArrayVec;

use crate::chess::{
    attacks::{magics::attack_tables, oracle::*},
    board::*,
    moves::{Move, MoveFields},
};

pub const MAX_MOVES: usize = 256;

pub type MoveList = ArrayVec<[Move; MAX_MOVES]>;

const E1: Square = 4;
const E8: Square = 60;

#[inline(always)]
pub fn gen_pawn_pushes(square: Square, occupancy: u64, color: Color) -> u64 {
    debug_assert!(square < BOARD_SIZE as u8);

    match color {
        Color::White => {
            let single: u64 = (bit(square) << BOARD_WIDTH) & !occupancy;
            let double: u64 = ((single & RANKS[2]) << BOARD_WIDTH) & !occupancy;

            single | double
        }
        Color::Black => {
            let single: u64 = (bit(square) >> BOARD_WIDTH) & !occupancy;
            let double: u64 = ((single & RANKS[5]) >> BOARD_WIDTH) & !occupancy;

            single | double
        }
    }
}

#[inline(always)]
fn gen_pawn_captures(square: Square, capturable: u64, color: Color) -> u64 {
    attack_tables().pawn(color, square) & capturable
}

/// Pseudo-legal destinations of the piece on `square`, castling excluded.
/// The enemy king is never a target.
#[inline(always)]
pub fn gen_piece_moves(square: Square, piece: Piece, color: Color, position: &Position) -> u64 {
    let blocked = position.color_occupancy(color) | position.bitboard(Piece::King, color.toggle());
    let occupancy_all = position.occupied();

    debug_assert!(position.bitboard(piece, color) & bit(square) != 0);

    (match piece {
        Piece::Pawn => {
            // Include the en passant square as a potential target, since its capture is diagonal
            let enemy_pawns = position.bitboard(Piece::Pawn, color.toggle());
            let en_passant_bit = position
                .en_passant_square()
                .filter(|&target| {
                    position.is_empty(target)
                        && enemy_pawns & bit(en_passant_victim(target, color)) != 0
                })
                .map_or(0u64, bit);
            let enemy_with_en_passant = en_passant_bit | position.color_occupancy(color.toggle());

            gen_pawn_pushes(square, occupancy_all, color)
                | gen_pawn_captures(square, enemy_with_en_passant, color)
        }
        piece => attack_tables().piece(piece, square, occupancy_all),
    }) & !blocked
}

/// Piece type of `color` standing on `square`, or `Piece::None`.
#[inline(always)]
fn piece_type_at(square: Square, color: Color, position: &Position) -> Piece {
    PIECE_TYPES
        .into_iter()
        .find(|&piece| position.bitboard(piece, color) & bit(square) != 0)
        .unwrap_or(Piece::None)
}

#[inline(always)]
fn push_with_promotions(fields: MoveFields, move_list: &mut MoveList) {
    let promotion_rank = match fields.color {
        Color::White => RANKS[7],
        Color::Black => RANKS[0],
    };
    let is_promotion = fields.piece == Piece::Pawn && bit(fields.to) & promotion_rank != 0;

    if is_promotion {
        for promotion in PROMOTION_TYPES {
            move_list.push(Move::pack(MoveFields { promotion, ..fields }));
        }
    } else {
        move_list.push(Move::pack(fields));
    }
}

/// Moves obeying each piece's movement rules; the mover's king may still be
/// left in check.
pub fn gen_pseudo_legal_moves(position: &Position) -> MoveList {
    let mut move_list = MoveList::new();
    let color = position.side_to_move();
    let enemy = color.toggle();
    let rights_before = position.castling_rights();

    for piece in PIECE_TYPES {
        for from in position.bitboard(piece, color).ones_iter() {
            for to in gen_piece_moves(from, piece, color, position).ones_iter() {
                let en_passant = piece == Piece::Pawn
                    && file_of(from) != file_of(to)
                    && Some(to) == position.en_passant_square();
                let captured = if en_passant {
                    Piece::Pawn
                } else {
                    piece_type_at(to, enemy, position)
                };

                push_with_promotions(
                    MoveFields {
                        from,
                        to,
                        piece,
                        color,
                        captured,
                        promotion: Piece::None,
                        castle: false,
                        en_passant,
                        rights_before,
                    },
                    &mut move_list,
                );
            }
        }
    }

    gen_castling_moves(position, &mut move_list);

    move_list
}

struct CastleRoute {
    right: u8,
    king_to: Square,
    rook_from: Square,
    between: u64,
    king_path: [Square; 3],
}

const WHITE_ROUTES: [CastleRoute; 2] = [
    CastleRoute {
        right: Castling::WK,
        king_to: 6,
        rook_from: 7,
        between: 0x60,
        king_path: [4, 5, 6],
    },
    CastleRoute {
        right: Castling::WQ,
        king_to: 2,
        rook_from: 0,
        between: 0x0E,
        king_path: [4, 3, 2],
    },
];

const BLACK_ROUTES: [CastleRoute; 2] = [
    CastleRoute {
        right: Castling::BK,
        king_to: 62,
        rook_from: 63,
        between: 0x6000_0000_0000_0000,
        king_path: [60, 61, 62],
    },
    CastleRoute {
        right: Castling::BQ,
        king_to: 58,
        rook_from: 56,
        between: 0x0E00_0000_0000_0000,
        king_path: [60, 59, 58],
    },
];

/// Castling needs the right, king and rook at home, an empty gap, and a
/// king path (origin, transit, destination) nobody attacks.
fn gen_castling_moves(position: &Position, move_list: &mut MoveList) {
    let color = position.side_to_move();
    let (king_from, routes) = match color {
        Color::White => (E1, &WHITE_ROUTES),
        Color::Black => (E8, &BLACK_ROUTES),
    };
    let rights = position.castling_rights();

    if rights & Castling::both(color) == 0
        || position.bitboard(Piece::King, color) & bit(king_from) == 0
    {
        return;
    }

    for route in routes {
        if rights & route.right == 0
            || position.bitboard(Piece::Rook, color) & bit(route.rook_from) == 0
            || position.occupied() & route.between != 0
            || route
                .king_path
                .iter()
                .any(|&square| is_square_attacked(square, color.toggle(), position))
        {
            continue;
        }

        move_list.push(Move::pack(MoveFields {
            from: king_from,
            to: route.king_to,
            piece: Piece::King,
            color,
            captured: Piece::None,
            promotion: Piece::None,
            castle: true,
            en_passant: false,
            rights_before: rights,
        }));
    }
}

/// Legal moves for the side to move. Each candidate is applied, the mover's
/// king is tested against the resulting occupancy, and the move is undone
/// again, so pins and discovered checks need no special casing.
pub fn gen_legal_moves(position: &mut Position) -> MoveList {
    let color = position.side_to_move();
    let mut legal = MoveList::new();

    for mov in gen_pseudo_legal_moves(position) {
        position.make_move(mov);
        if !is_in_check(color, position) {
            legal.push(mov);
        }
        position.unmake_move();
    }

    legal
}

impl Position {
    pub fn legal_moves(&mut self) -> MoveList {
        gen_legal_moves(self)
    }
}
