use clap::Parser;
use rand::{Rng, SeedableRng};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use grit::chess::{
    Slider, Square,
    attacks::{AttackTables, tables::*},
    board::BOARD_SIZE,
};

/// Searches collision-free magic multipliers for every square and prints
/// them as the constant tables the attack lookup ships with.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Seed for the candidate generator
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Candidates tried per square before giving up
    #[arg(long, default_value_t = 100_000_000)]
    attempts: u64,
}

fn find_magic(
    square: Square,
    directions: &[Offset],
    rng: &mut rand::rngs::SmallRng,
    attempts: u64,
) -> Option<u64> {
    let relevant_mask = gen_relevance_mask(square, directions);
    let bits = relevant_mask.count_ones();
    let len = 1usize << bits;

    let occupancies: Vec<u64> = (0..len)
        .map(|variant| get_occupancy(variant, relevant_mask))
        .collect();
    let attacks: Vec<u64> = occupancies
        .iter()
        .map(|&occupancy| gen_sliding_attacks(square, occupancy, directions))
        .collect();

    let mut used: Vec<u64> = vec![0; len];

    for _ in 0..attempts {
        // Sparse candidate whose top byte spreads the mask
        let magic = rng.random::<u64>() & rng.random::<u64>() & rng.random::<u64>();
        if (relevant_mask.wrapping_mul(magic) >> 56).count_ones() < 6 {
            continue;
        }

        used.fill(0);
        let collided = occupancies.iter().zip(&attacks).any(|(&occupancy, &attack)| {
            let index = occupancy.wrapping_mul(magic) >> (BOARD_SIZE as u32 - bits);
            let slot = &mut used[index as usize];
            let clash = *slot != 0 && *slot != attack;
            *slot = attack;
            clash
        });

        if !collided {
            return Some(magic);
        }
    }

    None
}

fn print_table(name: &str, numbers: &[u64; BOARD_SIZE]) {
    println!("#[rustfmt::skip]");
    println!("pub const {name}: [u64; BOARD_SIZE] = [");
    for row in numbers.chunks(4) {
        let row: Vec<String> = row.iter().map(|number| format!("{number:#x}")).collect();
        println!("    {},", row.join(", "));
    }
    println!("];\n");
}

fn main() -> std::process::ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut rng = rand::rngs::SmallRng::seed_from_u64(args.seed);
    let mut rook_numbers = [0u64; BOARD_SIZE];
    let mut bishop_numbers = [0u64; BOARD_SIZE];

    for (numbers, directions, slider) in [
        (&mut rook_numbers, &ROOK_DIRECTIONS, Slider::Rook),
        (&mut bishop_numbers, &BISHOP_DIRECTIONS, Slider::Bishop),
    ] {
        for square in 0..BOARD_SIZE as Square {
            match find_magic(square, directions, &mut rng, args.attempts) {
                Some(magic) => numbers[square as usize] = magic,
                None => {
                    error!(?slider, square, "no magic found");
                    return std::process::ExitCode::FAILURE;
                }
            }
        }
        info!(?slider, "magics found");
    }

    // Same self-check the library runs on start-up
    if let Err(err) = AttackTables::build(&rook_numbers, &bishop_numbers) {
        error!("{err}");
        return std::process::ExitCode::FAILURE;
    }

    print_table("ROOK_MAGIC_NUMBERS", &rook_numbers);
    print_table("BISHOP_MAGIC_NUMBERS", &bishop_numbers);

    std::process::ExitCode::SUCCESS
}
