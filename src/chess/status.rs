use crate::chess::{attacks::movegen::gen_legal_moves, board::*};

const FIFTY_MOVE_PLIES: u16 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Ongoing,
    Checkmate(Color), // winner
    Stalemate,
    FiftyMoveRule,
    Repetition,
    InsufficientMaterial,
}

impl GameStatus {
    pub fn is_over(self) -> bool {
        self != GameStatus::Ongoing
    }
}

impl Position {
    /// Outcome of the game at this point, judged from the side to move.
    /// Mate and stalemate take precedence over the draw rules.
    pub fn status(&mut self) -> GameStatus {
        let color = self.side_to_move;

        if gen_legal_moves(self).is_empty() {
            return if self.is_in_check(color) {
                GameStatus::Checkmate(color.toggle())
            } else {
                GameStatus::Stalemate
            };
        }

        if self.halfmove_clock >= FIFTY_MOVE_PLIES {
            GameStatus::FiftyMoveRule
        } else if self.repetitions() >= 2 {
            GameStatus::Repetition
        } else if self.is_insufficient_material() {
            GameStatus::InsufficientMaterial
        } else {
            GameStatus::Ongoing
        }
    }

    /// Earlier occurrences of the current position. Only entries since the
    /// last irreversible move can match.
    pub fn repetitions(&self) -> usize {
        self.history
            .iter()
            .rev()
            .take(self.halfmove_clock as usize)
            .filter(|undo| undo.zobrist == self.zobrist)
            .count()
    }

    /// Bare kings, or kings plus a single knight or bishop.
    pub fn is_insufficient_material(&self) -> bool {
        let heavy = [Piece::Pawn, Piece::Rook, Piece::Queen]
            .into_iter()
            .any(|piece| {
                self.bitboard(piece, Color::White) | self.bitboard(piece, Color::Black) != 0
            });
        if heavy {
            return false;
        }

        let minors: u32 = [Piece::Knight, Piece::Bishop]
            .into_iter()
            .map(|piece| {
                (self.bitboard(piece, Color::White) | self.bitboard(piece, Color::Black))
                    .count_ones()
            })
            .sum();

        minors <= 1
    }
}
