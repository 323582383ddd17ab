use crate::chess::board::*;
use rand::{Rng, SeedableRng};
use std::array::from_fn;
use std::sync::LazyLock;

const ZOBRIST_SEED: u64 = 0x5EED_0F_5A4D;

pub struct ZobristKeys {
    pub piece_square: [[u64; BOARD_SIZE]; PIECE_KINDS],
    pub white_to_move: u64,
    pub castling: [u64; 16],
    pub en_passant_file: [u64; BOARD_WIDTH],
}

/// Drawn once from a single seeded generator, in a fixed order, so hashes
/// are reproducible across runs.
pub static ZOBRIST: LazyLock<ZobristKeys> = LazyLock::new(|| {
    let mut rng = rand::rngs::SmallRng::seed_from_u64(ZOBRIST_SEED);

    let piece_square = from_fn(|_| from_fn(|_| rng.random()));
    let white_to_move = rng.random();
    let castling = from_fn(|_| rng.random());
    let en_passant_file = from_fn(|_| rng.random());

    tracing::debug!("zobrist keys drawn");

    ZobristKeys {
        piece_square,
        white_to_move,
        castling,
        en_passant_file,
    }
});

impl ZobristKeys {
    #[inline(always)]
    pub fn en_passant(&self, square: Option<Square>) -> u64 {
        square.map_or(0u64, |square| {
            self.en_passant_file[file_of(square) as usize]
        })
    }

    #[inline(always)]
    pub fn side(&self, color: Color) -> u64 {
        match color {
            Color::White => self.white_to_move,
            Color::Black => 0,
        }
    }
}

impl Position {
    /// Hash of the position computed from scratch.
    pub fn calculate_zobrist(&self) -> u64 {
        let keys = &*ZOBRIST;

        let pieces = self
            .bitboards
            .iter()
            .enumerate()
            .fold(0u64, |hash, (index, bitboard)| {
                bitboard
                    .ones_iter()
                    .fold(hash, |hash, square| hash ^ keys.piece_square[index][square as usize])
            });

        pieces
            ^ keys.side(self.side_to_move)
            ^ keys.castling[self.castling_rights as usize]
            ^ keys.en_passant(self.en_passant_square)
    }

    /// Folds the non-piece state changes of a move into the running hash.
    /// Piece placement is already covered by `toggle_piece`.
    #[inline(always)]
    pub(crate) fn update_zobrist(&mut self, old_en_passant: Option<Square>, old_rights: u8) {
        let keys = &*ZOBRIST;

        self.zobrist ^= keys.white_to_move;

        if old_en_passant != self.en_passant_square {
            self.zobrist ^= keys.en_passant(old_en_passant);
            self.zobrist ^= keys.en_passant(self.en_passant_square);
        }

        if old_rights != self.castling_rights {
            self.zobrist ^= keys.castling[old_rights as usize];
            self.zobrist ^= keys.castling[self.castling_rights as usize];
        }
    }
}
