use crate::chess::{board::*, error::MoveError};

// --- bit-field layout of the u32 ---
// 27..24 : castling rights before the move
// 23     : en passant flag
// 22     : castling flag
// 21..19 : promotion piece (6 = none)
// 18..16 : captured piece (6 = none)
// 15     : moving color
// 14..12 : moving piece (6 = not yet known)
// 11..6  : destination square
// 5..0   : origin square
const FROM_SHIFT: u32 = 0;
const TO_SHIFT: u32 = 6;
const PIECE_SHIFT: u32 = 12;
const COLOR_SHIFT: u32 = 15;
const CAPTURED_SHIFT: u32 = 16;
const PROMOTION_SHIFT: u32 = 19;
const CASTLE_SHIFT: u32 = 22;
const EN_PASSANT_SHIFT: u32 = 23;
const RIGHTS_SHIFT: u32 = 24;

const SQUARE_MASK: u32 = 0x3f;
const PIECE_MASK: u32 = 0x7;
const RIGHTS_MASK: u32 = 0xf;

/// Every field a move can carry. Used by the rich constructor and by the
/// generator, which knows all of them up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveFields {
    pub from: Square,
    pub to: Square,
    pub piece: Piece,
    pub color: Color,
    pub captured: Piece,
    pub promotion: Piece,
    pub castle: bool,
    pub en_passant: bool,
    pub rights_before: u8,
}

impl MoveFields {
    pub fn new(from: Square, to: Square) -> Self {
        MoveFields {
            from,
            to,
            piece: Piece::None,
            color: Color::White,
            captured: Piece::None,
            promotion: Piece::None,
            castle: false,
            en_passant: false,
            rights_before: 0,
        }
    }
}

/// A single transition, self-contained enough to be undone without looking
/// at the board: it records what moved, what was captured and the castling
/// rights that held before it.
///
/// Only the validating factories build one; the packed word is private.
///
/// ```compile_fail
/// let raw = grit::chess::Move(52 | 60 << 6 | 5 << 19);
/// ```
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Hash)]
#[repr(transparent)]
pub struct Move(u32);

impl Move {
    /// Validating constructor taking every field.
    pub fn new(fields: MoveFields) -> Result<Self, MoveError> {
        validate_square(fields.from)?;
        validate_square(fields.to)?;
        if fields.promotion != Piece::None && !PROMOTION_TYPES.contains(&fields.promotion) {
            return Err(MoveError::InvalidPromotion(fields.promotion));
        }
        Ok(Move::pack(fields))
    }

    pub fn normal(from: Square, to: Square) -> Result<Self, MoveError> {
        Move::new(MoveFields::new(from, to))
    }

    pub fn promotion(from: Square, to: Square, promotion: Piece) -> Result<Self, MoveError> {
        if !PROMOTION_TYPES.contains(&promotion) {
            return Err(MoveError::InvalidPromotion(promotion));
        }
        Move::new(MoveFields {
            promotion,
            ..MoveFields::new(from, to)
        })
    }

    pub fn en_passant(from: Square, to: Square) -> Result<Self, MoveError> {
        Move::new(MoveFields {
            en_passant: true,
            ..MoveFields::new(from, to)
        })
    }

    pub fn castle(from: Square, to: Square) -> Result<Self, MoveError> {
        Move::new(MoveFields {
            castle: true,
            ..MoveFields::new(from, to)
        })
    }

    /// Packs already-validated fields.
    #[inline(always)]
    pub(crate) fn pack(fields: MoveFields) -> Self {
        debug_assert!(fields.from < BOARD_SIZE as u8 && fields.to < BOARD_SIZE as u8);

        Move(
            (fields.from as u32) << FROM_SHIFT
                | (fields.to as u32) << TO_SHIFT
                | (fields.piece as u32) << PIECE_SHIFT
                | (fields.color as u32) << COLOR_SHIFT
                | (fields.captured as u32) << CAPTURED_SHIFT
                | (fields.promotion as u32) << PROMOTION_SHIFT
                | (fields.castle as u32) << CASTLE_SHIFT
                | (fields.en_passant as u32) << EN_PASSANT_SHIFT
                | ((fields.rights_before as u32) & RIGHTS_MASK) << RIGHTS_SHIFT,
        )
    }

    pub fn fields(self) -> MoveFields {
        MoveFields {
            from: self.get_from(),
            to: self.get_to(),
            piece: self.get_piece(),
            color: self.get_color(),
            captured: self.get_captured(),
            promotion: self.get_promotion(),
            castle: self.is_castle(),
            en_passant: self.is_en_passant(),
            rights_before: self.get_rights_before(),
        }
    }

    #[inline(always)]
    pub fn get_from(self) -> Square {
        (self.0 >> FROM_SHIFT & SQUARE_MASK) as Square
    }

    #[inline(always)]
    pub fn get_to(self) -> Square {
        (self.0 >> TO_SHIFT & SQUARE_MASK) as Square
    }

    #[inline(always)]
    pub fn get_piece(self) -> Piece {
        Piece::from_index((self.0 >> PIECE_SHIFT & PIECE_MASK) as u8)
    }

    #[inline(always)]
    pub fn get_color(self) -> Color {
        if self.0 >> COLOR_SHIFT & 1 == 0 {
            Color::White
        } else {
            Color::Black
        }
    }

    #[inline(always)]
    pub fn get_captured(self) -> Piece {
        Piece::from_index((self.0 >> CAPTURED_SHIFT & PIECE_MASK) as u8)
    }

    /// Captured piece with its color, which is always the mover's opponent.
    pub fn captured(self) -> Option<(Piece, Color)> {
        match self.get_captured() {
            Piece::None => None,
            piece => Some((piece, self.get_color().toggle())),
        }
    }

    #[inline(always)]
    pub fn get_promotion(self) -> Piece {
        Piece::from_index((self.0 >> PROMOTION_SHIFT & PIECE_MASK) as u8)
    }

    #[inline(always)]
    pub fn is_promotion(self) -> bool {
        self.get_promotion() != Piece::None
    }

    #[inline(always)]
    pub fn is_capture(self) -> bool {
        self.get_captured() != Piece::None
    }

    #[inline(always)]
    pub fn is_castle(self) -> bool {
        self.0 >> CASTLE_SHIFT & 1 != 0
    }

    #[inline(always)]
    pub fn is_en_passant(self) -> bool {
        self.0 >> EN_PASSANT_SHIFT & 1 != 0
    }

    #[inline(always)]
    pub fn get_rights_before(self) -> u8 {
        (self.0 >> RIGHTS_SHIFT & RIGHTS_MASK) as u8
    }

    #[inline(always)]
    pub(crate) fn with_rights_before(self, rights: u8) -> Self {
        Move(self.0 & !(RIGHTS_MASK << RIGHTS_SHIFT) | ((rights as u32) & RIGHTS_MASK) << RIGHTS_SHIFT)
    }

    /// `true` once the moving piece is recorded, i.e. the move came from the
    /// generator or was already applied once.
    #[inline(always)]
    pub fn is_complete(self) -> bool {
        self.get_piece() != Piece::None
    }

    /// Same origin, destination and promotion.
    #[inline(always)]
    pub fn same_route(self, other: Move) -> bool {
        self.get_from() == other.get_from()
            && self.get_to() == other.get_to()
            && self.get_promotion() == other.get_promotion()
    }

    pub fn to_uci(self) -> String {
        self.to_string()
    }
}

#[inline(always)]
fn validate_square(square: Square) -> Result<(), MoveError> {
    if square < BOARD_SIZE as Square {
        Ok(())
    } else {
        Err(MoveError::InvalidSquare(square))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factories_reject_out_of_range_squares() {
        assert_eq!(Move::normal(64, 0), Err(MoveError::InvalidSquare(64)));
        assert_eq!(Move::castle(4, 200), Err(MoveError::InvalidSquare(200)));
        assert_eq!(Move::en_passant(255, 40), Err(MoveError::InvalidSquare(255)));
    }

    #[test]
    fn promotion_requires_a_promotable_piece() {
        assert_eq!(
            Move::promotion(52, 60, Piece::King),
            Err(MoveError::InvalidPromotion(Piece::King))
        );
        assert_eq!(
            Move::promotion(52, 60, Piece::Pawn),
            Err(MoveError::InvalidPromotion(Piece::Pawn))
        );
        assert!(Move::promotion(52, 60, Piece::Knight).is_ok());
    }

    #[test]
    fn rich_constructor_exposes_every_field() -> Result<(), MoveError> {
        let fields = MoveFields {
            from: 54,
            to: 63,
            piece: Piece::Pawn,
            color: Color::White,
            captured: Piece::Rook,
            promotion: Piece::Queen,
            castle: false,
            en_passant: false,
            rights_before: Castling::WK | Castling::BK,
        };
        let mov = Move::new(fields)?;

        assert_eq!(mov.fields(), fields);
        assert_eq!(mov.captured(), Some((Piece::Rook, Color::Black)));
        assert!(mov.is_promotion());
        assert!(mov.is_capture());
        assert!(mov.is_complete());
        Ok(())
    }

    #[test]
    fn simple_factories_set_their_flag_only() -> Result<(), MoveError> {
        let castle = Move::castle(4, 6)?;
        assert!(castle.is_castle() && !castle.is_en_passant() && !castle.is_promotion());
        assert!(!castle.is_complete());

        let ep = Move::en_passant(36, 43)?;
        assert!(ep.is_en_passant() && !ep.is_castle());
        assert_eq!((ep.get_from(), ep.get_to()), (36, 43));

        let quiet = Move::normal(12, 28)?;
        assert_eq!(quiet.get_promotion(), Piece::None);
        assert_eq!(quiet.captured(), None);
        Ok(())
    }

    #[test]
    fn rights_snapshot_can_be_rewritten() -> Result<(), MoveError> {
        let mov = Move::normal(0, 8)?.with_rights_before(Castling::ALL);
        assert_eq!(mov.get_rights_before(), Castling::ALL);
        assert_eq!(mov.with_rights_before(Castling::BQ).get_rights_before(), Castling::BQ);
        assert_eq!((mov.get_from(), mov.get_to()), (0, 8));
        Ok(())
    }
}
