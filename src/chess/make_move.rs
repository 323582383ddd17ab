use crate::chess::{attacks::attack_tables, board::*, error::MoveError, moves::Move};

/// One history entry: the applied move (carrying its own rights snapshot)
/// plus the state a move cannot reconstruct from its encoding alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Undo {
    pub(crate) mov: Move,
    pub(crate) en_passant_square: Option<Square>,
    pub(crate) halfmove_clock: u16,
    pub(crate) fullmove_number: u16,
    pub(crate) zobrist: u64,
}

/// Castling rights lost when anything leaves or lands on `square`.
#[inline(always)]
fn rights_lost_at(square: Square) -> u8 {
    match square {
        0 => Castling::WQ,                 // a1
        4 => Castling::WK | Castling::WQ,  // e1
        7 => Castling::WK,                 // h1
        56 => Castling::BQ,                // a8
        60 => Castling::BK | Castling::BQ, // e8
        63 => Castling::BK,                // h8
        _ => 0,
    }
}

/// Rook origin and destination for a castling king landing on `king_to`.
#[inline(always)]
fn castle_rook_route(king_to: Square) -> (Square, Square) {
    match king_to {
        6 => (7, 5),    // h1 -> f1
        2 => (0, 3),    // a1 -> d1
        62 => (63, 61), // h8 -> f8
        _ => (56, 59),  // a8 -> d8
    }
}

impl Position {
    /// Fills in whatever a bare move leaves unknown (moving piece, capture,
    /// castle and en passant flags) from the current board, and stamps the
    /// current castling rights as the move's "before" snapshot.
    pub(crate) fn complete_move(&self, mov: Move) -> Result<Move, MoveError> {
        let mut fields = mov.fields();

        if self.is_empty(fields.from) {
            return Err(MoveError::EmptyOrigin(fields.from));
        }

        if !mov.is_complete() {
            if let Some((piece, color)) = self.piece_at(fields.from) {
                fields.piece = piece;
                fields.color = color;
            }

            let diagonal = file_of(fields.from) != file_of(fields.to);
            if fields.piece == Piece::Pawn
                && diagonal
                && Some(fields.to) == self.en_passant_square
            {
                fields.en_passant = true;
            }
            if fields.piece == Piece::King
                && file_of(fields.from).abs_diff(file_of(fields.to)) == 2
            {
                fields.castle = true;
            }

            fields.captured = if fields.en_passant {
                Piece::Pawn
            } else {
                match self.piece_at(fields.to) {
                    Some((piece, color)) if color != fields.color => piece,
                    _ => Piece::None,
                }
            };
        }

        if fields.color != self.side_to_move {
            return Err(MoveError::NotToMove(fields.from));
        }

        fields.rights_before = self.castling_rights;
        let mov = Move::pack(fields);

        if self.fits_board(mov) {
            Ok(mov)
        } else {
            Err(MoveError::BoardMismatch(mov.to_string()))
        }
    }

    /// Every recorded field agrees with the squares the move touches, so
    /// applying it keeps the bitboards disjoint and both kings on the board.
    fn fits_board(&self, mov: Move) -> bool {
        let from = mov.get_from();
        let to = mov.get_to();
        let piece = mov.get_piece();
        let color = mov.get_color();

        if self.bitboard(piece, color) & bit(from) == 0 {
            return false;
        }

        let capture_fits = if mov.is_en_passant() {
            piece == Piece::Pawn
                && self.is_empty(to)
                && self.bitboard(Piece::Pawn, color.toggle()) & bit(en_passant_victim(to, color))
                    != 0
        } else {
            match mov.captured() {
                Some((Piece::King, _)) => false,
                Some((captured, enemy)) => self.bitboard(captured, enemy) & bit(to) != 0,
                None => self.is_empty(to),
            }
        };

        let promotion_rank = match color {
            Color::White => RANKS[7],
            Color::Black => RANKS[0],
        };
        let promotion_fits =
            !mov.is_promotion() || (piece == Piece::Pawn && bit(to) & promotion_rank != 0);

        let castle_fits = !mov.is_castle()
            || (piece == Piece::King
                && matches!(
                    (color, from, to),
                    (Color::White, 4, 6 | 2) | (Color::Black, 60, 62 | 58)
                )
                && self.bitboard(Piece::Rook, color) & bit(castle_rook_route(to).0) != 0);

        capture_fits && promotion_fits && castle_fits
    }

    /// Applies `mov` in place and pushes it on the history stack. Returns the
    /// move as recorded, with every field filled in, or leaves the position
    /// untouched when the move does not fit the board.
    ///
    /// Only the fields are checked against the board; whether the mover's
    /// king is left in check is up to the caller.
    pub fn try_make_move(&mut self, mov: Move) -> Result<Move, MoveError> {
        let mov = self.complete_move(mov)?;
        self.apply_move(mov);
        Ok(mov)
    }

    /// Like [`Position::try_make_move`], but a move that does not fit the
    /// board halts the program.
    ///
    /// # Preconditions
    /// - `mov` must be legal, or at least pseudo-legal, in the current position
    pub fn make_move(&mut self, mov: Move) -> Move {
        match self.try_make_move(mov) {
            Ok(mov) => mov,
            Err(err) => {
                tracing::error!(fen = %self.to_fen(), "{err}");
                panic!("cannot make move {mov}: {err}");
            }
        }
    }

    fn apply_move(&mut self, mov: Move) {
        let from = mov.get_from();
        let to = mov.get_to();
        let piece = mov.get_piece();
        let color = mov.get_color();

        let undo = Undo {
            mov,
            en_passant_square: self.en_passant_square,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
            zobrist: self.zobrist,
        };
        let old_en_passant = self.en_passant_square;
        let old_rights = self.castling_rights;

        // Clear piece from original square
        self.toggle_piece(from, piece, color);

        if let Some((captured, enemy)) = mov.captured() {
            let square = if mov.is_en_passant() {
                en_passant_victim(to, color)
            } else {
                to
            };
            self.toggle_piece(square, captured, enemy);
        }

        // Land the moved piece
        let landed = if mov.is_promotion() {
            mov.get_promotion()
        } else {
            piece
        };
        self.toggle_piece(to, landed, color);

        if mov.is_castle() {
            let (rook_from, rook_to) = castle_rook_route(to);
            self.toggle_piece(rook_from, Piece::Rook, color);
            self.toggle_piece(rook_to, Piece::Rook, color);
        }

        self.castling_rights &= !(rights_lost_at(from) | rights_lost_at(to));

        // The target only exists when an enemy pawn can actually take it
        self.en_passant_square = None;
        if piece == Piece::Pawn && from.abs_diff(to) == 2 * BOARD_WIDTH as Square {
            let target = (from + to) / 2;
            let enemy_pawns = self.bitboard(Piece::Pawn, color.toggle());
            if attack_tables().pawn(color, target) & enemy_pawns != 0 {
                self.en_passant_square = Some(target);
            }
        }

        if piece == Piece::Pawn || mov.is_capture() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        }
        if color == Color::Black {
            self.fullmove_number = self.fullmove_number.saturating_add(1);
        }

        self.history.push(undo);
        self.side_to_move = color.toggle();
        self.refresh_occupancy();
        self.update_zobrist(old_en_passant, old_rights);

        #[cfg(debug_assertions)]
        self.assert_consistent();
    }

    /// Reverts the last applied move using only the history entry. Returns
    /// the reverted move, or `None` (leaving the position untouched) when
    /// there is nothing to undo.
    pub fn unmake_move(&mut self) -> Option<Move> {
        let undo = self.history.pop()?;
        let mov = undo.mov;
        let from = mov.get_from();
        let to = mov.get_to();
        let color = mov.get_color();

        if mov.is_castle() {
            let (rook_from, rook_to) = castle_rook_route(to);
            self.toggle_piece(rook_to, Piece::Rook, color);
            self.toggle_piece(rook_from, Piece::Rook, color);
        }

        let landed = if mov.is_promotion() {
            mov.get_promotion()
        } else {
            mov.get_piece()
        };
        self.toggle_piece(to, landed, color);

        if let Some((captured, enemy)) = mov.captured() {
            let square = if mov.is_en_passant() {
                en_passant_victim(to, color)
            } else {
                to
            };
            self.toggle_piece(square, captured, enemy);
        }

        self.toggle_piece(from, mov.get_piece(), color);

        self.castling_rights = mov.get_rights_before();
        self.en_passant_square = undo.en_passant_square;
        self.halfmove_clock = undo.halfmove_clock;
        self.fullmove_number = undo.fullmove_number;
        self.side_to_move = color;
        self.refresh_occupancy();
        self.zobrist = undo.zobrist;

        #[cfg(debug_assertions)]
        self.assert_consistent();

        Some(mov)
    }

    /// Applied moves, oldest first.
    pub fn history(&self) -> impl DoubleEndedIterator<Item = Move> + ExactSizeIterator + '_ {
        self.history.iter().map(|undo| undo.mov)
    }

    pub fn last_move(&self) -> Option<Move> {
        self.history.last().map(|undo| undo.mov)
    }
}
