//! Geometry shared by the table builder and the offline magic search:
//! leaper offsets, slider directions, relevance masks and ray casting.

use crate::chess::board::*;

#[derive(Copy, Clone)]
pub struct Offset {
    pub rank: i8,
    pub file: i8,
}

pub const PAWN_CAPTURE_OFFSETS_WHITE: [Offset; 2] = [
    Offset { rank: 1, file: -1 }, // capture left
    Offset { rank: 1, file: 1 },  // capture right
];

pub const PAWN_CAPTURE_OFFSETS_BLACK: [Offset; 2] = [
    Offset { rank: -1, file: -1 }, // capture left
    Offset { rank: -1, file: 1 },  // capture right
];

pub const KNIGHT_OFFSETS: [Offset; 8] = [
    Offset { rank: 2, file: 1 },
    Offset { rank: 1, file: 2 },
    Offset { rank: -1, file: 2 },
    Offset { rank: -2, file: 1 },
    Offset { rank: -2, file: -1 },
    Offset { rank: -1, file: -2 },
    Offset { rank: 1, file: -2 },
    Offset { rank: 2, file: -1 },
];

pub const KING_OFFSETS: [Offset; 8] = [
    Offset { rank: 1, file: 0 },
    Offset { rank: 1, file: 1 },
    Offset { rank: 0, file: 1 },
    Offset { rank: -1, file: 1 },
    Offset { rank: -1, file: 0 },
    Offset { rank: -1, file: -1 },
    Offset { rank: 0, file: -1 },
    Offset { rank: 1, file: -1 },
];

pub const ROOK_DIRECTIONS: [Offset; 4] = [
    Offset { rank: 1, file: 0 },  // north
    Offset { rank: -1, file: 0 }, // south
    Offset { rank: 0, file: 1 },  // east
    Offset { rank: 0, file: -1 }, // west
];

pub const BISHOP_DIRECTIONS: [Offset; 4] = [
    Offset { rank: 1, file: 1 },   // northeast
    Offset { rank: 1, file: -1 },  // northwest
    Offset { rank: -1, file: 1 },  // southeast
    Offset { rank: -1, file: -1 }, // southwest
];

pub fn gen_jumping_attacks(square: Square, offsets: &[Offset]) -> u64 {
    debug_assert!(square < BOARD_SIZE as u8);

    let rank = square as i8 / BOARD_WIDTH as i8;
    let file = square as i8 % BOARD_WIDTH as i8;

    offsets.iter().fold(0u64, |attacks, offset| {
        let (r, f) = (rank + offset.rank, file + offset.file);
        if valid_axis(r) && valid_axis(f) {
            attacks | bit(to_square(r, f))
        } else {
            attacks
        }
    })
}

/// Board edges the square itself does not sit on. A blocker there can
/// never shorten a ray.
pub fn gen_edge_mask(square: Square) -> u64 {
    debug_assert!(square < BOARD_SIZE as Square);

    let bit: u64 = bit(square);

    [RANKS[0], RANKS[7], FILE_A, FILE_H]
        .iter()
        .fold(
            0u64,
            |mask, edge| if bit & edge == 0 { mask | edge } else { mask },
        )
}

/// Ground-truth ray cast: each ray stops at, and includes, the first
/// occupied square.
pub fn gen_sliding_attacks(square: Square, occupancy: u64, directions: &[Offset]) -> u64 {
    debug_assert!(square < BOARD_SIZE as u8);

    let rank = square as i8 / BOARD_WIDTH as i8;
    let file = square as i8 % BOARD_WIDTH as i8;

    let mut attacks: u64 = 0;

    for offset in directions {
        let (mut attacked_rank, mut attacked_file) = (rank + offset.rank, file + offset.file);

        while valid_axis(attacked_rank) && valid_axis(attacked_file) {
            let attacked = bit(to_square(attacked_rank, attacked_file));
            attacks |= attacked;

            if attacked & occupancy != 0 {
                break;
            }

            attacked_rank += offset.rank;
            attacked_file += offset.file;
        }
    }

    attacks
}

/// Squares whose occupancy can change a slider's attack set from `square`.
pub fn gen_relevance_mask(square: Square, directions: &[Offset]) -> u64 {
    gen_sliding_attacks(square, 0, directions) & !gen_edge_mask(square)
}

/// Spreads the low bits of `variant` over the set bits of `relevant_mask`,
/// enumerating every subset of the mask as `variant` runs over 0..2^n.
pub fn get_occupancy(mut variant: usize, mut relevant_mask: u64) -> u64 {
    debug_assert!(variant < (1 << relevant_mask.count_ones()));

    let mut occupancy: u64 = 0;

    while variant != 0 {
        if variant & 1 != 0 {
            occupancy |= relevant_mask & relevant_mask.wrapping_neg();
        }

        variant >>= 1;
        relevant_mask &= relevant_mask - 1;
    }

    occupancy
}
