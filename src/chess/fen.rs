use std::str::FromStr;

use crate::chess::{board::*, error::FenError, notation::*};

const FEN_FIELDS: usize = 6;

/// Places the pieces of the first field, rank 8 first.
fn parse_placement(position: &mut Position, part: &str) -> Result<(), FenError> {
    let ranks: Vec<&str> = part.split('/').collect();
    if ranks.len() != BOARD_WIDTH {
        return Err(FenError::RankCount(ranks.len()));
    }

    for (row, rank_part) in ranks.iter().enumerate() {
        let rank = (BOARD_WIDTH - 1 - row) as u8;
        let mut file: u8 = 0;

        for chr in rank_part.chars() {
            if let Some(skip) = chr.to_digit(10) {
                if !(1..=BOARD_WIDTH as u32).contains(&skip) {
                    return Err(FenError::UnknownPiece(chr));
                }
                file = file.saturating_add(skip as u8);
                continue;
            }

            let piece = Piece::from_char(chr).ok_or(FenError::UnknownPiece(chr))?;
            let color = if chr.is_ascii_uppercase() {
                Color::White
            } else {
                Color::Black
            };
            if file >= BOARD_WIDTH as u8 {
                return Err(FenError::RankWidth {
                    rank: rank + 1,
                    files: file.saturating_add(1),
                });
            }
            let index = piece_index(piece, color);
            position.bitboards[index] |= bit(to_square(rank as i8, file as i8));
            file += 1;
        }

        if file != BOARD_WIDTH as u8 {
            return Err(FenError::RankWidth {
                rank: rank + 1,
                files: file,
            });
        }
    }

    Ok(())
}

fn parse_castling(part: &str) -> Result<u8, FenError> {
    if part == "-" {
        return Ok(0);
    }

    part.chars().try_fold(0u8, |rights, chr| {
        let right = match chr {
            'K' => Castling::WK,
            'Q' => Castling::WQ,
            'k' => Castling::BK,
            'q' => Castling::BQ,
            _ => return Err(FenError::UnknownCastling(chr)),
        };
        Ok(rights | right)
    })
}

fn parse_en_passant(part: &str) -> Result<Option<Square>, FenError> {
    if part == "-" {
        return Ok(None);
    }

    match parse_square(part) {
        Some(square) if rank_of(square) == 2 || rank_of(square) == 5 => Ok(Some(square)),
        _ => Err(FenError::EnPassantSquare(part.to_string())),
    }
}

fn parse_counter(field: &'static str, part: &str) -> Result<u16, FenError> {
    part.parse::<u16>().map_err(|_| FenError::Counter {
        field,
        value: part.to_string(),
    })
}

impl Position {
    /// Parses the 6-field text form. Any malformed field rejects the whole
    /// string; no defaults are substituted.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let tokens: Vec<&str> = fen.split_whitespace().collect();
        if tokens.len() != FEN_FIELDS {
            return Err(FenError::FieldCount(tokens.len()));
        }

        let mut position = Position::empty();
        parse_placement(&mut position, tokens[0])?;

        position.side_to_move = match tokens[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::UnknownColor(other.to_string())),
        };
        position.castling_rights = parse_castling(tokens[2])?;
        position.en_passant_square = parse_en_passant(tokens[3])?;
        position.halfmove_clock = parse_counter("halfmove clock", tokens[4])?;
        position.fullmove_number = parse_counter("fullmove number", tokens[5])?;

        for color in [Color::White, Color::Black] {
            let count = position.bitboard(Piece::King, color).count_ones();
            if count != 1 {
                return Err(FenError::KingCount { color, count });
            }
        }

        position.refresh_derived();

        Ok(position)
    }

    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(90);

        for rank in (0..BOARD_WIDTH as i8).rev() {
            let mut empty = 0;
            for file in 0..BOARD_WIDTH as i8 {
                match self.piece_at(to_square(rank, file)) {
                    Some((piece, color)) => {
                        if empty > 0 {
                            fen.push_str(&empty.to_string());
                            empty = 0;
                        }
                        fen.push(match color {
                            Color::White => piece.to_char(),
                            Color::Black => piece.to_char().to_ascii_lowercase(),
                        });
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                fen.push_str(&empty.to_string());
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        });

        fen.push(' ');
        if self.castling_rights == 0 {
            fen.push('-');
        }
        for (right, letter) in [
            (Castling::WK, 'K'),
            (Castling::WQ, 'Q'),
            (Castling::BK, 'k'),
            (Castling::BQ, 'q'),
        ] {
            if self.castling_rights & right != 0 {
                fen.push(letter);
            }
        }

        fen.push(' ');
        match self.en_passant_square {
            Some(square) => fen.push_str(&square_name(square)),
            None => fen.push('-'),
        }

        fen.push_str(&format!(
            " {} {}",
            self.halfmove_clock, self.fullmove_number
        ));

        fen
    }
}

impl FromStr for Position {
    type Err = FenError;

    fn from_str(fen: &str) -> Result<Self, Self::Err> {
        Position::from_fen(fen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_fen_matches_constructor() -> Result<(), FenError> {
        let parsed = Position::from_fen(START_FEN)?;
        assert_eq!(parsed, Position::new());
        assert_eq!(Position::new().to_fen(), START_FEN);
        Ok(())
    }

    #[test]
    fn export_reproduces_the_input() -> Result<(), FenError> {
        for fen in [
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2",
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        ] {
            let position: Position = fen.parse()?;
            assert_eq!(position.to_fen(), fen);
            assert_eq!(position.zobrist(), position.calculate_zobrist());
        }
        Ok(())
    }

    #[test]
    fn fields_are_read() -> Result<(), FenError> {
        let position = Position::from_fen("4k3/8/8/3pP3/8/8/8/4K3 b Kq d6 7 42")?;

        assert_eq!(position.side_to_move(), Color::Black);
        assert_eq!(position.castling_rights(), Castling::WK | Castling::BQ);
        assert_eq!(position.en_passant_square(), Some(43));
        assert_eq!(position.halfmove_clock(), 7);
        assert_eq!(position.fullmove_number(), 42);
        assert_eq!(position.piece_at(35), Some((Piece::Pawn, Color::Black)));
        Ok(())
    }

    #[test]
    fn malformed_input_is_rejected_precisely() {
        let cases = [
            ("8/8/8/8/8/8/8/8 w - -", FenError::FieldCount(4)),
            ("4k3/8/8/8/8/8/4K3 w - - 0 1", FenError::RankCount(7)),
            (
                "4k3/8/8/8/8/8/8/4K4 w - - 0 1",
                FenError::RankWidth { rank: 1, files: 9 },
            ),
            (
                "4k3/8/8/8/8/8/8/4K2 w - - 0 1",
                FenError::RankWidth { rank: 1, files: 7 },
            ),
            ("4k3/8/8/8/8/8/8/4X3 w - - 0 1", FenError::UnknownPiece('X')),
            (
                "4k3/8/8/8/8/8/8/4K3 x - - 0 1",
                FenError::UnknownColor("x".to_string()),
            ),
            ("4k3/8/8/8/8/8/8/4K3 w KZ - 0 1", FenError::UnknownCastling('Z')),
            (
                "4k3/8/8/8/8/8/8/4K3 w - e4 0 1",
                FenError::EnPassantSquare("e4".to_string()),
            ),
            (
                "4k3/8/8/8/8/8/8/4K3 w - j3 0 1",
                FenError::EnPassantSquare("j3".to_string()),
            ),
            (
                "4k3/8/8/8/8/8/8/4K3 w - - x 1",
                FenError::Counter {
                    field: "halfmove clock",
                    value: "x".to_string(),
                },
            ),
            (
                "4k3/8/8/8/8/8/8/4K3 w - - 0 -3",
                FenError::Counter {
                    field: "fullmove number",
                    value: "-3".to_string(),
                },
            ),
            (
                "8/8/8/8/8/8/8/4K3 w - - 0 1",
                FenError::KingCount {
                    color: Color::Black,
                    count: 0,
                },
            ),
        ];

        for (fen, expected) in cases {
            assert_eq!(Position::from_fen(fen), Err(expected), "{fen}");
        }
    }
}
