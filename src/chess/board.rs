use super::make_move::Undo;
use super::zobrist::ZOBRIST;

pub const BOARD_WIDTH: usize = 8;
pub const BOARD_SIZE: usize = 64;
/// One bitboard per (color, piece type) pair: white pawn = 0 … black king = 11.
pub const PIECE_KINDS: usize = 12;

pub type Square = u8;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
#[repr(u8)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Color {
    #[inline(always)]
    pub fn toggle(self) -> Color {
        [Color::White, Color::Black][self as usize ^ 1]
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
#[repr(u8)]
pub enum Piece {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
    #[default]
    None,
}

impl Piece {
    pub fn from_char(letter: char) -> Option<Piece> {
        match letter.to_ascii_lowercase() {
            'p' => Some(Piece::Pawn),
            'n' => Some(Piece::Knight),
            'b' => Some(Piece::Bishop),
            'r' => Some(Piece::Rook),
            'q' => Some(Piece::Queen),
            'k' => Some(Piece::King),
            _ => None,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Piece::Pawn => 'P',
            Piece::Knight => 'N',
            Piece::Bishop => 'B',
            Piece::Rook => 'R',
            Piece::Queen => 'Q',
            Piece::King => 'K',
            Piece::None => ' ',
        }
    }

    /// Inverse of `as u8`; anything out of range decodes as `Piece::None`.
    #[inline(always)]
    pub fn from_index(index: u8) -> Piece {
        match index {
            0 => Piece::Pawn,
            1 => Piece::Knight,
            2 => Piece::Bishop,
            3 => Piece::Rook,
            4 => Piece::Queen,
            5 => Piece::King,
            _ => Piece::None,
        }
    }
}

pub const PIECE_TYPES: [Piece; 6] = [
    Piece::Pawn,
    Piece::Knight,
    Piece::Bishop,
    Piece::Rook,
    Piece::Queen,
    Piece::King,
];

pub const PROMOTION_TYPES: [Piece; 4] = [Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen];

pub struct Castling;
impl Castling {
    pub const WK: u8 = 1;
    pub const WQ: u8 = 2;
    pub const BK: u8 = 4;
    pub const BQ: u8 = 8;
    pub const ALL: u8 = 15;

    #[inline(always)]
    pub fn both(color: Color) -> u8 {
        match color {
            Color::White => Castling::WK | Castling::WQ,
            Color::Black => Castling::BK | Castling::BQ,
        }
    }
}

#[inline(always)]
pub fn piece_index(piece: Piece, color: Color) -> usize {
    debug_assert!(piece != Piece::None);
    color as usize * PIECE_TYPES.len() + piece as usize
}

/// Which of the 12 piece sets holds `square`, if any.
#[inline(always)]
pub(crate) fn piece_on(bitboards: &[u64; PIECE_KINDS], square: Square) -> Option<(Piece, Color)> {
    let square_bit = bit(square);
    bitboards
        .iter()
        .position(|bitboard| bitboard & square_bit != 0)
        .map(|index| {
            let color = if index < PIECE_TYPES.len() {
                Color::White
            } else {
                Color::Black
            };
            (PIECE_TYPES[index % PIECE_TYPES.len()], color)
        })
}

/// Mutable board state. Pieces exist only as set bits; `occupied` and
/// `zobrist` are derived from the bitboards and kept in sync by every mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    pub(crate) bitboards: [u64; PIECE_KINDS],
    pub(crate) occupied: u64,

    pub(crate) zobrist: u64,
    pub(crate) en_passant_square: Option<Square>,
    pub(crate) halfmove_clock: u16,
    pub(crate) fullmove_number: u16,
    pub(crate) castling_rights: u8, // 4 bits for KQkq
    pub(crate) side_to_move: Color,

    pub(crate) history: Vec<Undo>,
}

impl Default for Position {
    fn default() -> Self {
        Position::new()
    }
}

impl Position {
    /// The standard starting position.
    pub fn new() -> Self {
        let mut position = Position::empty();
        position.bitboards = [
            0x0000_0000_0000_FF00, // white pawns a2-h2
            0x0000_0000_0000_0042, // white knights b1, g1
            0x0000_0000_0000_0024, // white bishops c1, f1
            0x0000_0000_0000_0081, // white rooks a1, h1
            0x0000_0000_0000_0008, // white queen d1
            0x0000_0000_0000_0010, // white king e1
            0x00FF_0000_0000_0000, // black pawns a7-h7
            0x4200_0000_0000_0000,
            0x2400_0000_0000_0000,
            0x8100_0000_0000_0000,
            0x0800_0000_0000_0000,
            0x1000_0000_0000_0000,
        ];
        position.castling_rights = Castling::ALL;
        position.refresh_derived();
        position
    }

    pub(crate) fn empty() -> Self {
        Position {
            bitboards: [0u64; PIECE_KINDS],
            occupied: 0u64,

            zobrist: 0u64,
            en_passant_square: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            castling_rights: 0,
            side_to_move: Color::White,

            history: Vec::new(),
        }
    }

    /// Recomputes every derived field from the bitboards and state fields.
    pub(crate) fn refresh_derived(&mut self) {
        self.refresh_occupancy();
        self.zobrist = self.calculate_zobrist();
    }

    #[inline(always)]
    pub(crate) fn refresh_occupancy(&mut self) {
        self.occupied = self.bitboards.iter().fold(0u64, |all, bitboard| all | bitboard);
    }

    /// Toggles the presence of a piece on a given square:
    /// - If the square is empty, the piece is added.
    /// - If the same piece/color is present, it is removed.
    ///
    /// Updates the piece bitboard and Zobrist hash; `occupied` is refreshed
    /// by the caller once the whole move is applied.
    #[inline(always)]
    pub(crate) fn toggle_piece(&mut self, square: Square, piece: Piece, color: Color) {
        let square_bit = bit(square);
        let index = piece_index(piece, color);

        debug_assert!(
            self.bitboards[index] & square_bit != 0 || self.occupancy_without(index) & square_bit == 0,
            "toggle_piece would overlap another piece at square {}",
            square
        );

        self.bitboards[index] ^= square_bit;
        self.zobrist ^= ZOBRIST.piece_square[index][square as usize];
    }

    #[inline(always)]
    fn occupancy_without(&self, skipped: usize) -> u64 {
        self.bitboards
            .iter()
            .enumerate()
            .filter(|&(index, _)| index != skipped)
            .fold(0u64, |all, (_, bitboard)| all | bitboard)
    }

    pub fn piece_at(&self, square: Square) -> Option<(Piece, Color)> {
        piece_on(&self.bitboards, square)
    }

    #[inline(always)]
    pub fn is_empty(&self, square: Square) -> bool {
        self.occupied & bit(square) == 0
    }

    #[inline(always)]
    pub fn bitboard(&self, piece: Piece, color: Color) -> u64 {
        self.bitboards[piece_index(piece, color)]
    }

    pub fn bitboards(&self) -> &[u64; PIECE_KINDS] {
        &self.bitboards
    }

    #[inline(always)]
    pub fn occupied(&self) -> u64 {
        self.occupied
    }

    #[inline(always)]
    pub fn color_occupancy(&self, color: Color) -> u64 {
        let base = color as usize * PIECE_TYPES.len();
        self.bitboards[base..base + PIECE_TYPES.len()]
            .iter()
            .fold(0u64, |all, bitboard| all | bitboard)
    }

    #[inline(always)]
    pub fn friendly_occupancy(&self) -> u64 {
        self.color_occupancy(self.side_to_move)
    }

    #[inline(always)]
    pub fn enemy_occupancy(&self) -> u64 {
        self.color_occupancy(self.side_to_move.toggle())
    }

    #[inline(always)]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline(always)]
    pub fn castling_rights(&self) -> u8 {
        self.castling_rights
    }

    #[inline(always)]
    pub fn en_passant_square(&self) -> Option<Square> {
        self.en_passant_square
    }

    pub fn halfmove_clock(&self) -> u16 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u16 {
        self.fullmove_number
    }

    #[inline(always)]
    pub fn zobrist(&self) -> u64 {
        self.zobrist
    }

    #[inline(always)]
    pub fn king_square(&self, color: Color) -> Square {
        let king = self.bitboard(Piece::King, color);
        debug_assert!(king.count_ones() == 1, "{:?} has {} kings", color, king.count_ones());
        king.trailing_zeros() as Square
    }

    /// Returns a description of the first broken structural invariant, if any.
    pub fn consistency_error(&self) -> Option<String> {
        let mut seen = 0u64;
        for (index, &bitboard) in self.bitboards.iter().enumerate() {
            if seen & bitboard != 0 {
                return Some(format!(
                    "bitboard {} overlaps another piece set on {:#018x}",
                    index,
                    seen & bitboard
                ));
            }
            seen |= bitboard;
        }

        if seen != self.occupied {
            return Some(format!(
                "occupied cache {:#018x} differs from the piece sets {:#018x}",
                self.occupied, seen
            ));
        }

        for color in [Color::White, Color::Black] {
            let kings = self.bitboard(Piece::King, color).count_ones();
            if kings != 1 {
                return Some(format!("{:?} has {} kings", color, kings));
            }
        }

        None
    }

    /// Halts on corrupted state. A failure here is a bug in generation or
    /// apply logic, never a user error.
    pub fn assert_consistent(&self) {
        if let Some(problem) = self.consistency_error() {
            tracing::error!(fen = %self.to_fen(), "{problem}");
            panic!("inconsistent position: {problem}");
        }
    }
}

pub const RANKS: [u64; BOARD_WIDTH] = [
    0xFF,
    0xFF00,
    0xFF0000,
    0xFF000000,
    0xFF00000000,
    0xFF0000000000,
    0xFF000000000000,
    0xFF00000000000000,
];

pub const FILE_A: u64 = 0x0101010101010101;
pub const FILE_H: u64 = 0x8080808080808080;

#[inline(always)]
pub fn to_square(rank: i8, file: i8) -> Square {
    ((rank * BOARD_WIDTH as i8) + file) as Square
}

#[inline(always)]
pub fn rank_of(square: Square) -> u8 {
    square / BOARD_WIDTH as u8
}

#[inline(always)]
pub fn file_of(square: Square) -> u8 {
    square % BOARD_WIDTH as u8
}

#[inline(always)]
pub fn valid_axis(axis: i8) -> bool {
    (0..BOARD_WIDTH as i8).contains(&axis)
}

#[inline(always)]
pub fn bit(square: Square) -> u64 {
    1u64 << square
}

/// Square of the pawn removed by an en passant capture landing on `to`.
/// `color` is the capturing side.
#[inline(always)]
pub fn en_passant_victim(to: Square, color: Color) -> Square {
    match color {
        Color::White => to - BOARD_WIDTH as Square,
        Color::Black => to + BOARD_WIDTH as Square,
    }
}

pub trait BitboardOnes: Sized + Copy {
    fn ones_iter(self) -> BitboardOnesIter;
}

pub struct BitboardOnesIter {
    bitboard: u64,
}

impl Iterator for BitboardOnesIter {
    type Item = Square;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.bitboard == 0 {
            None
        } else {
            let sq = self.bitboard.trailing_zeros() as Square;
            self.bitboard &= self.bitboard - 1; // clear lowest set bit
            Some(sq)
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let pop = self.bitboard.count_ones() as usize;
        (pop, Some(pop))
    }
}

impl ExactSizeIterator for BitboardOnesIter {}

impl BitboardOnes for u64 {
    fn ones_iter(self) -> BitboardOnesIter {
        BitboardOnesIter { bitboard: self }
    }
}
