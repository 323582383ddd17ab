//! Process-wide attack tables. Leapers are plain per-square arrays; sliders
//! use magic bitboards: `(occupied & mask) * magic >> shift` indexes a dense
//! slice of precomputed attack sets.
//!
//! The multipliers below were found offline (see the `find_magics` binary)
//! for the minimal index width of every square. Every table entry is checked
//! against a fresh ray cast when the tables are built; a bad constant aborts
//! start-up instead of silently returning wrong attacks.

use std::sync::LazyLock;

use crate::chess::{
    attacks::tables::*,
    board::*,
    error::{MagicError, Slider},
};

#[rustfmt::skip]
pub const ROOK_MAGIC_NUMBERS: [u64; BOARD_SIZE] = [
    0x8a80104000800020, 0x140002000100040, 0x2801880a0017001, 0x100081001000420,
    0x200020010080420, 0x3001c0002010008, 0x8480008002000100, 0x2080088004402900,
    0x800098204000, 0x2024401000200040, 0x100802000801000, 0x120800800801000,
    0x208808088000400, 0x2802200800400, 0x2200800100020080, 0x801000060821100,
    0x80044006422000, 0x100808020004000, 0x12108a0010204200, 0x140848010000802,
    0x481828014002800, 0x8094004002004100, 0x4010040010010802, 0x20008806104,
    0x100400080208000, 0x2040002120081000, 0x21200680100081, 0x20100080080080,
    0x2000a00200410, 0x20080800400, 0x80088400100102, 0x80004600042881,
    0x4040008040800020, 0x440003000200801, 0x4200011004500, 0x188020010100100,
    0x14800401802800, 0x2080040080800200, 0x124080204001001, 0x200046502000484,
    0x480400080088020, 0x1000422010034000, 0x30200100110040, 0x100021010009,
    0x2002080100110004, 0x202008004008002, 0x20020004010100, 0x2048440040820001,
    0x101002200408200, 0x40802000401080, 0x4008142004410100, 0x2060820c0120200,
    0x1001004080100, 0x20c020080040080, 0x2935610830022400, 0x44440041009200,
    0x280001040802101, 0x2100190040002085, 0x80c0084100102001, 0x4024081001000421,
    0x20030a0244872, 0x12001008414402, 0x2006104900a0804, 0x1004081002402,
];

#[rustfmt::skip]
pub const BISHOP_MAGIC_NUMBERS: [u64; BOARD_SIZE] = [
    0x40040844404084, 0x2004208a004208, 0x10190041080202, 0x108060845042010,
    0x581104180800210, 0x2112080446200010, 0x1080820820060210, 0x3c0808410220200,
    0x4050404440404, 0x21001420088, 0x24d0080801082102, 0x1020a0a020400,
    0x40308200402, 0x4011002100800, 0x401484104104005, 0x801010402020200,
    0x400210c3880100, 0x404022024108200, 0x810018200204102, 0x4002801a02003,
    0x85040820080400, 0x810102c808880400, 0xe900410884800, 0x8002020480840102,
    0x220200865090201, 0x2010100a02021202, 0x152048408022401, 0x20080002081110,
    0x4001001021004000, 0x800040400a011002, 0xe4004081011002, 0x1c004001012080,
    0x8004200962a00220, 0x8422100208500202, 0x2000402200300c08, 0x8646020080080080,
    0x80020a0200100808, 0x2010004880111000, 0x623000a080011400, 0x42008c0340209202,
    0x209188240001000, 0x400408a884001800, 0x110400a6080400, 0x1840060a44020800,
    0x90080104000041, 0x201011000808101, 0x1a2208080504f080, 0x8012020600211212,
    0x500861011240000, 0x180806108200800, 0x4000020e01040044, 0x300000261044000a,
    0x802241102020002, 0x20906061210001, 0x5a84841004010310, 0x4010801011c04,
    0xa010109502200, 0x4a02012000, 0x500201010098b028, 0x8040002811040900,
    0x28000010020204, 0x6000020202d0240, 0x8918844842082200, 0x4010011029020020,
];

#[derive(Clone, Copy, Debug, Default)]
pub struct Magic {
    pub mask: u64,
    pub magic: u64,
    pub shift: u32,
    pub offset: usize,
}

impl Magic {
    // This code is textbook magic bitboards
    #[inline(always)]
    pub fn index(&self, occupancy: u64) -> usize {
        let magic_index = (occupancy & self.mask).wrapping_mul(self.magic) >> self.shift;
        debug_assert!(magic_index < (1 << self.mask.count_ones()));
        self.offset + magic_index as usize
    }
}

pub struct AttackTables {
    pub knight: [u64; BOARD_SIZE],
    pub king: [u64; BOARD_SIZE],
    pub pawn: [[u64; BOARD_SIZE]; 2], // indexed by the capturing pawn's color
    pub rook_magics: [Magic; BOARD_SIZE],
    pub bishop_magics: [Magic; BOARD_SIZE],
    pub sliding: Vec<u64>,
}

/// Built once, on first use, and only ever read afterwards.
pub static ATTACK_TABLES: LazyLock<AttackTables> = LazyLock::new(|| {
    match AttackTables::build(&ROOK_MAGIC_NUMBERS, &BISHOP_MAGIC_NUMBERS) {
        Ok(tables) => {
            tracing::debug!(sliding_entries = tables.sliding.len(), "attack tables built");
            tables
        }
        Err(err) => {
            tracing::error!("{err}");
            panic!("refusing to run with unverified slider tables: {err}");
        }
    }
});

#[inline(always)]
pub fn attack_tables() -> &'static AttackTables {
    &ATTACK_TABLES
}

impl AttackTables {
    /// Builds every table for the given multipliers and self-checks the
    /// slider entries.
    pub fn build(
        rook_numbers: &[u64; BOARD_SIZE],
        bishop_numbers: &[u64; BOARD_SIZE],
    ) -> Result<Self, MagicError> {
        let mut sliding: Vec<u64> = Vec::new();

        let rook_magics = fill_slider(rook_numbers, &ROOK_DIRECTIONS, Slider::Rook, &mut sliding)?;
        let bishop_magics =
            fill_slider(bishop_numbers, &BISHOP_DIRECTIONS, Slider::Bishop, &mut sliding)?;

        let tables = AttackTables {
            knight: std::array::from_fn(|square| {
                gen_jumping_attacks(square as Square, &KNIGHT_OFFSETS)
            }),
            king: std::array::from_fn(|square| gen_jumping_attacks(square as Square, &KING_OFFSETS)),
            pawn: [
                std::array::from_fn(|square| {
                    gen_jumping_attacks(square as Square, &PAWN_CAPTURE_OFFSETS_WHITE)
                }),
                std::array::from_fn(|square| {
                    gen_jumping_attacks(square as Square, &PAWN_CAPTURE_OFFSETS_BLACK)
                }),
            ],
            rook_magics,
            bishop_magics,
            sliding,
        };

        tables.verify()?;
        Ok(tables)
    }

    /// Recomputes every relevant occupancy by ray casting and compares it with
    /// what the magic lookup returns.
    pub fn verify(&self) -> Result<(), MagicError> {
        for (magics, directions, slider) in [
            (&self.rook_magics, &ROOK_DIRECTIONS, Slider::Rook),
            (&self.bishop_magics, &BISHOP_DIRECTIONS, Slider::Bishop),
        ] {
            for (square, magic) in magics.iter().enumerate() {
                let square = square as Square;
                for variant in 0..1usize << magic.mask.count_ones() {
                    let occupancy = get_occupancy(variant, magic.mask);
                    let expected = gen_sliding_attacks(square, occupancy, directions);

                    if self.sliding[magic.index(occupancy)] != expected {
                        return Err(MagicError::Mismatch {
                            slider,
                            square,
                            occupancy,
                        });
                    }
                }
            }
        }

        Ok(())
    }

    #[inline(always)]
    pub fn knight(&self, square: Square) -> u64 {
        self.knight[square as usize]
    }

    #[inline(always)]
    pub fn king(&self, square: Square) -> u64 {
        self.king[square as usize]
    }

    /// Squares a pawn of `color` standing on `square` attacks.
    #[inline(always)]
    pub fn pawn(&self, color: Color, square: Square) -> u64 {
        self.pawn[color as usize][square as usize]
    }

    #[inline(always)]
    pub fn rook(&self, square: Square, occupancy: u64) -> u64 {
        self.sliding[self.rook_magics[square as usize].index(occupancy)]
    }

    #[inline(always)]
    pub fn bishop(&self, square: Square, occupancy: u64) -> u64 {
        self.sliding[self.bishop_magics[square as usize].index(occupancy)]
    }

    #[inline(always)]
    pub fn queen(&self, square: Square, occupancy: u64) -> u64 {
        self.rook(square, occupancy) | self.bishop(square, occupancy)
    }

    /// Attack set of a non-pawn piece; pawns attack by color and go through
    /// [`AttackTables::pawn`].
    #[inline(always)]
    pub fn piece(&self, piece: Piece, square: Square, occupancy: u64) -> u64 {
        match piece {
            Piece::Knight => self.knight(square),
            Piece::Bishop => self.bishop(square, occupancy),
            Piece::Rook => self.rook(square, occupancy),
            Piece::Queen => self.queen(square, occupancy),
            Piece::King => self.king(square),
            Piece::Pawn | Piece::None => 0,
        }
    }
}

/// Lays out one slider's per-square slices at the end of `sliding`. A slot
/// already holding a different attack set means the multiplier collides.
fn fill_slider(
    numbers: &[u64; BOARD_SIZE],
    directions: &[Offset],
    slider: Slider,
    sliding: &mut Vec<u64>,
) -> Result<[Magic; BOARD_SIZE], MagicError> {
    let mut magics = [Magic::default(); BOARD_SIZE];

    for square in 0..BOARD_SIZE {
        let mask = gen_relevance_mask(square as Square, directions);
        let bits = mask.count_ones();
        let magic = Magic {
            mask,
            magic: numbers[square],
            shift: BOARD_SIZE as u32 - bits,
            offset: sliding.len(),
        };

        sliding.resize(sliding.len() + (1usize << bits), 0);

        for variant in 0..1usize << bits {
            let occupancy = get_occupancy(variant, mask);
            let attacks = gen_sliding_attacks(square as Square, occupancy, directions);
            let slot = &mut sliding[magic.index(occupancy)];

            // A slider always reaches at least one square, so 0 marks a free slot.
            if *slot != 0 && *slot != attacks {
                return Err(MagicError::Mismatch {
                    slider,
                    square: square as Square,
                    occupancy,
                });
            }
            *slot = attacks;
        }

        magics[square] = magic;
    }

    Ok(magics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};

    #[test]
    fn shipped_magics_pass_self_check() {
        let tables = attack_tables();
        assert!(tables.verify().is_ok());
        // 102400 rook entries + 5248 bishop entries.
        assert_eq!(tables.sliding.len(), 102_400 + 5_248);
    }

    #[test]
    fn corrupted_magic_is_rejected() {
        let mut rooks = ROOK_MAGIC_NUMBERS;
        rooks[27] = 1;

        let err = AttackTables::build(&rooks, &BISHOP_MAGIC_NUMBERS).err();
        assert!(matches!(
            err,
            Some(MagicError::Mismatch {
                slider: Slider::Rook,
                square: 27,
                ..
            })
        ));
    }

    #[test]
    fn lookups_match_ray_casting_for_full_boards() {
        let tables = attack_tables();
        let mut rng = rand::rngs::SmallRng::seed_from_u64(7);

        for _ in 0..2_000 {
            let occupancy: u64 = rng.random::<u64>() & rng.random::<u64>();
            let square: Square = rng.random_range(0..BOARD_SIZE as Square);

            assert_eq!(
                tables.rook(square, occupancy),
                gen_sliding_attacks(square, occupancy, &ROOK_DIRECTIONS)
            );
            assert_eq!(
                tables.bishop(square, occupancy),
                gen_sliding_attacks(square, occupancy, &BISHOP_DIRECTIONS)
            );
            assert_eq!(
                tables.queen(square, occupancy),
                tables.rook(square, occupancy) | tables.bishop(square, occupancy)
            );
        }
    }

    #[test]
    fn leaper_tables_are_indexed_by_square_and_color() {
        let tables = attack_tables();

        assert_eq!(tables.king(0), bit(1) | bit(8) | bit(9));
        assert_eq!(tables.knight(6), bit(12) | bit(21) | bit(23));
        assert_eq!(tables.pawn(Color::White, 12), bit(19) | bit(21));
        assert_eq!(tables.pawn(Color::Black, 52), bit(43) | bit(45));
    }
}
