//! Coordinate notation: squares as file letter plus rank digit, moves as
//! origin + destination with an optional lowercase promotion letter.

use std::fmt;

use crate::chess::{
    attacks::movegen::gen_legal_moves, board::*, error::MoveError, moves::Move,
    status::GameStatus,
};

pub fn square_name(square: Square) -> String {
    debug_assert!(square < BOARD_SIZE as Square);

    let file = (b'a' + file_of(square)) as char;
    let rank = (b'1' + rank_of(square)) as char;
    format!("{file}{rank}")
}

pub fn parse_square(text: &str) -> Option<Square> {
    let mut chars = text.chars();

    match (chars.next(), chars.next(), chars.next()) {
        (Some(file @ 'a'..='h'), Some(rank @ '1'..='8'), None) => Some(to_square(
            (rank as u8 - b'1') as i8,
            (file as u8 - b'a') as i8,
        )),
        _ => None,
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            square_name(self.get_from()),
            square_name(self.get_to())
        )?;

        if self.is_promotion() {
            write!(f, "{}", self.get_promotion().to_char().to_ascii_lowercase())?;
        }

        Ok(())
    }
}

impl Position {
    /// Resolves coordinate notation (`e2e4`, `e7e8q`) to the matching legal
    /// move, fully populated and ready for `make_move`.
    pub fn parse_move(&mut self, text: &str) -> Result<Move, MoveError> {
        let text = text.trim();
        let malformed = || MoveError::Notation(text.to_string());

        let from = text.get(0..2).and_then(parse_square).ok_or_else(malformed)?;
        let to = text.get(2..4).and_then(parse_square).ok_or_else(malformed)?;
        let requested = match text.get(4..) {
            Some("") | None => Move::normal(from, to)?,
            Some(letter) => {
                let mut chars = letter.chars();
                let promotion = match (chars.next(), chars.next()) {
                    (Some(chr), None) => Piece::from_char(chr).ok_or_else(malformed)?,
                    _ => return Err(malformed()),
                };
                Move::promotion(from, to, promotion)?
            }
        };

        gen_legal_moves(self)
            .into_iter()
            .find(|legal| legal.same_route(requested))
            .ok_or_else(|| MoveError::Illegal(text.to_string()))
    }

    /// Renders the history stack as numbered movetext, e.g.
    /// `1. e2e4 e7e5 2. g1f3`.
    pub fn movetext(&self) -> String {
        let mut text = String::new();
        let mut number = self.fullmove_number;
        // Walk back to the move number the history started from
        for mov in self.history().rev() {
            if mov.get_color() == Color::Black {
                number = number.saturating_sub(1);
            }
        }

        for (ply, mov) in self.history().enumerate() {
            if !text.is_empty() {
                text.push(' ');
            }
            match mov.get_color() {
                Color::White => text.push_str(&format!("{number}. ")),
                Color::Black if ply == 0 => text.push_str(&format!("{number}... ")),
                Color::Black => {}
            }
            text.push_str(&mov.to_string());
            if mov.get_color() == Color::Black {
                number += 1;
            }
        }

        text
    }

    /// Game record with the seven standard tags, the movetext and the result
    /// token. The date is written as unknown.
    pub fn pgn(&mut self, site: &str) -> String {
        let result = match self.status() {
            GameStatus::Ongoing => "*",
            GameStatus::Checkmate(Color::White) => "1-0",
            GameStatus::Checkmate(Color::Black) => "0-1",
            _ => "1/2-1/2",
        };
        let site = site.replace('\\', "\\\\").replace('"', "\\\"");

        let mut pgn = String::new();
        for (tag, value) in [
            ("Event", "Live Chess"),
            ("Site", site.as_str()),
            ("Date", "????.??.??"),
            ("Round", "-"),
            ("White", "White"),
            ("Black", "Black"),
            ("Result", result),
        ] {
            pgn.push_str(&format!("[{tag} \"{value}\"]\n"));
        }
        pgn.push('\n');

        let movetext = self.movetext();
        if !movetext.is_empty() {
            pgn.push_str(&movetext);
            pgn.push(' ');
        }
        pgn.push_str(result);
        pgn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_names_round_trip() {
        assert_eq!(square_name(0), "a1");
        assert_eq!(square_name(63), "h8");
        assert_eq!(square_name(28), "e4");
        assert_eq!(parse_square("e4"), Some(28));
        assert_eq!(parse_square("i1"), None);
        assert_eq!(parse_square("a9"), None);
        assert_eq!(parse_square("a10"), None);
        assert!((0..64).all(|square| parse_square(&square_name(square)) == Some(square)));
    }

    #[test]
    fn moves_render_with_promotion_letter() -> Result<(), MoveError> {
        assert_eq!(Move::normal(12, 28)?.to_string(), "e2e4");
        assert_eq!(Move::promotion(52, 60, Piece::Queen)?.to_string(), "e7e8q");
        assert_eq!(Move::promotion(9, 0, Piece::Knight)?.to_uci(), "b2a1n");
        Ok(())
    }

    #[test]
    fn parse_resolves_against_legal_moves() -> Result<(), MoveError> {
        let mut position = Position::new();

        let mov = position.parse_move("e2e4")?;
        assert_eq!(mov.get_piece(), Piece::Pawn);
        assert!(mov.is_complete());

        assert_eq!(
            position.parse_move("e2e5"),
            Err(MoveError::Illegal("e2e5".to_string()))
        );
        assert_eq!(
            position.parse_move("e2"),
            Err(MoveError::Notation("e2".to_string()))
        );
        assert_eq!(
            position.parse_move("e2e4k"),
            Err(MoveError::InvalidPromotion(Piece::King))
        );
        Ok(())
    }

    #[test]
    fn parse_picks_the_requested_promotion() -> Result<(), Box<dyn std::error::Error>> {
        let mut position = Position::from_fen("7k/P7/8/8/8/8/8/K7 w - - 0 1")?;

        let mov = position.parse_move("a7a8n")?;
        assert_eq!(mov.get_promotion(), Piece::Knight);
        assert!(matches!(
            position.parse_move("a7a8"),
            Err(MoveError::Illegal(_))
        ));
        Ok(())
    }

    #[test]
    fn movetext_numbers_full_moves() -> Result<(), Box<dyn std::error::Error>> {
        let mut position = Position::new();
        for text in ["e2e4", "e7e5", "g1f3"] {
            let mov = position.parse_move(text)?;
            position.make_move(mov);
        }
        assert_eq!(position.movetext(), "1. e2e4 e7e5 2. g1f3");

        let mut position = Position::from_fen("4k3/8/8/8/8/8/8/R3K3 b - - 0 30")?;
        for text in ["e8d7", "a1a7"] {
            let mov = position.parse_move(text)?;
            position.make_move(mov);
        }
        assert_eq!(position.movetext(), "30... e8d7 31. a1a7");
        Ok(())
    }

    #[test]
    fn pgn_carries_tags_and_result() -> Result<(), Box<dyn std::error::Error>> {
        let mut position = Position::new();
        assert!(position.pgn("local").ends_with("[Result \"*\"]\n\n*"));

        for text in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            let mov = position.parse_move(text)?;
            position.make_move(mov);
        }
        let pgn = position.pgn("club \"A\"");

        assert!(pgn.starts_with("[Event \"Live Chess\"]\n[Site \"club \\\"A\\\"\"]\n"));
        assert!(pgn.contains("[Result \"0-1\"]\n\n"));
        assert!(pgn.ends_with("\n\n1. f2f3 e7e5 2. g2g4 d8h4 0-1"));
        assert_eq!(pgn.lines().count(), 9);
        Ok(())
    }
}
