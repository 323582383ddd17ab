use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use grit::chess::*;
use grit::perft::*;

/// Runs perft suites and checks node counts against their references.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// EPD file, one `<FEN> ;D1 <nodes> ;D2 <nodes> ...` per line
    #[arg(short, long, conflicts_with = "fen")]
    file: Option<PathBuf>,

    /// Single position to count instead of a suite; no reference check
    #[arg(long)]
    fen: Option<String>,

    /// Deepest depth to run
    #[arg(short, long, default_value_t = 4)]
    depth: u8,

    /// Size of the subtree cache in MiB; 0 counts without a cache
    #[arg(long = "hash-mb", default_value_t = 64)]
    hash_mb: usize,

    /// Print per-root-move counts at the final depth
    #[arg(long)]
    divide: bool,
}

struct Runner {
    table: Option<PerftTable>,
    total_nodes: u64,
    total_elapsed: Duration,
}

impl Runner {
    fn count(&mut self, position: &mut Position, depth: u8) -> u64 {
        let start = Instant::now();
        let nodes = match self.table.as_mut() {
            Some(table) => perft_cached(position, depth, table),
            None => perft(position, depth),
        };
        let elapsed = start.elapsed();

        self.total_nodes += nodes;
        self.total_elapsed += elapsed;
        info!(depth, nodes, ?elapsed, "perft");

        nodes
    }
}

fn print_divide(position: &mut Position, depth: u8) {
    let split = divide(position, depth);
    for (mov, nodes) in &split {
        println!("{mov}: {nodes}");
    }
    println!(
        "\nMoves: {}\nNodes: {}",
        split.len(),
        split.iter().map(|&(_, nodes)| nodes).sum::<u64>()
    );
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut runner = Runner {
        table: (args.hash_mb > 0).then(|| PerftTable::new(args.hash_mb)),
        total_nodes: 0,
        total_elapsed: Duration::ZERO,
    };

    let failures = match (&args.file, &args.fen) {
        (Some(path), _) => match run_suite(path, &args, &mut runner) {
            Ok(failures) => failures,
            Err(err) => {
                error!("{err}");
                return ExitCode::FAILURE;
            }
        },
        (None, fen) => {
            let fen = fen.as_deref().unwrap_or(START_FEN);
            let mut position = match Position::from_fen(fen) {
                Ok(position) => position,
                Err(err) => {
                    error!(fen, "{err}");
                    return ExitCode::FAILURE;
                }
            };

            if args.divide {
                print_divide(&mut position, args.depth);
            } else {
                for depth in 1..=args.depth {
                    runner.count(&mut position, depth);
                }
            }
            0
        }
    };

    if runner.total_elapsed > Duration::ZERO {
        info!(
            "Estimated: {:.0} N/s",
            runner.total_nodes as f64 / runner.total_elapsed.as_secs_f64()
        );
    }

    if failures == 0 {
        ExitCode::SUCCESS
    } else {
        error!(failures, "perft mismatches");
        ExitCode::FAILURE
    }
}

/// Runs every line of the suite up to `args.depth` and returns how many
/// counts differed from their reference.
fn run_suite(
    path: &Path,
    args: &Args,
    runner: &mut Runner,
) -> Result<usize, Box<dyn std::error::Error>> {
    let reader = BufReader::new(File::open(path)?);
    let mut failures = 0;

    for line in reader.lines() {
        let line = line?;
        let Some(EpdLine {
            mut position,
            expected,
        }) = parse_epd(&line)?
        else {
            continue;
        };

        info!(fen = %position.to_fen(), "suite position");

        for (index, &expected_nodes) in expected.iter().take(args.depth as usize).enumerate() {
            let depth = (index + 1) as u8;
            let nodes = runner.count(&mut position, depth);

            if nodes != expected_nodes {
                failures += 1;
                error!(depth, nodes, expected_nodes, "node count mismatch");
                if args.divide {
                    print_divide(&mut position, depth);
                }
            }
        }
    }

    Ok(failures)
}
