mod utils;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use grit::chess::*;

const WALKS_PER_START: u64 = 8;
const WALK_PLIES: usize = 60;

fn assert_structure(position: &Position) {
    let mut seen = 0u64;
    for &bitboard in position.bitboards() {
        assert_eq!(seen & bitboard, 0, "overlap in {}", position.to_fen());
        seen |= bitboard;
    }
    assert_eq!(seen, position.occupied());
    assert_eq!(position.bitboard(Piece::King, Color::White).count_ones(), 1);
    assert_eq!(position.bitboard(Piece::King, Color::Black).count_ones(), 1);
}

/// Plays random legal moves, checking every alternative's make/unmake on
/// the way, then unwinds the whole line back to the start.
fn walk(start: &Position, rng: &mut SmallRng) {
    let mut position = start.clone();
    let mut line = Vec::new();

    for _ in 0..WALK_PLIES {
        let moves = position.legal_moves();
        if moves.is_empty() {
            break;
        }

        for &mov in moves.iter() {
            let before = position.clone();
            let rights = position.castling_rights();

            position.make_move(mov);
            assert_structure(&position);
            assert_eq!(position.zobrist(), position.calculate_zobrist(), "{mov}");
            // Rights only ever shrink going forward
            assert_eq!(position.castling_rights() & !rights, 0);

            position.unmake_move();
            assert_eq!(position, before, "{mov} did not unmake cleanly");
        }

        let mov = moves[rng.random_range(0..moves.len())];
        line.push((position.clone(), position.make_move(mov)));
    }

    while let Some((before, mov)) = line.pop() {
        assert_eq!(position.unmake_move(), Some(mov));
        assert_eq!(position, before);
    }
    assert_eq!(&position, start);
    assert_eq!(position.unmake_move(), None);
}

#[test]
fn random_walks_round_trip() -> Result<(), FenError> {
    for (index, fen) in utils::WALK_STARTS.iter().enumerate() {
        let start = Position::from_fen(fen)?;
        for seed in 0..WALKS_PER_START {
            let mut rng = SmallRng::seed_from_u64(seed * 31 + index as u64);
            walk(&start, &mut rng);
        }
    }
    Ok(())
}

#[test]
fn snapshots_follow_the_walk() -> Result<(), MoveError> {
    let mut rng = SmallRng::seed_from_u64(99);
    let mut position = Position::new();
    let mut snapshot = position.snapshot();

    for _ in 0..WALK_PLIES {
        let moves = position.legal_moves();
        if moves.is_empty() {
            break;
        }
        let mov = moves[rng.random_range(0..moves.len())];

        snapshot = snapshot.apply(mov)?;
        position.make_move(mov);
        assert_eq!(snapshot, position.snapshot());
        assert_eq!(snapshot.to_fen(), position.to_fen());
    }
    Ok(())
}

#[test]
fn fen_export_survives_a_walk() -> Result<(), FenError> {
    let mut rng = SmallRng::seed_from_u64(5);
    let mut position = Position::new();

    for _ in 0..WALK_PLIES {
        let moves = position.legal_moves();
        if moves.is_empty() {
            break;
        }
        position.make_move(moves[rng.random_range(0..moves.len())]);

        let reparsed = Position::from_fen(&position.to_fen())?;
        assert_eq!(reparsed.snapshot(), position.snapshot());
    }
    Ok(())
}
