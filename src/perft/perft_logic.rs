use crate::chess::*;

#[derive(Clone, Copy, Default)]
struct PerftEntry {
    zobrist: u64,
    nodes: u64,
    depth: u8,
}

/// Fixed-size, always-replace-if-deeper cache of subtree counts keyed by
/// position hash.
pub struct PerftTable {
    table: Box<[PerftEntry]>,
    mask: usize,
}

impl PerftTable {
    pub fn new(megabytes: usize) -> Self {
        const MIB: usize = 1 << 20;
        let entry_size = std::mem::size_of::<PerftEntry>();
        let requested_bytes = megabytes.saturating_mul(MIB);

        // Rounded down to a power of two so the index is a mask
        let entries = (requested_bytes / entry_size).max(1);
        let entries = if entries.is_power_of_two() {
            entries
        } else {
            entries.next_power_of_two() >> 1
        };

        Self {
            table: vec![PerftEntry::default(); entries].into_boxed_slice(),
            mask: entries - 1,
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    #[inline]
    fn index(&self, zobrist: u64) -> usize {
        (zobrist as usize) & self.mask
    }

    #[inline]
    pub fn probe(&self, zobrist: u64, depth: u8) -> Option<u64> {
        let entry = &self.table[self.index(zobrist)];
        if entry.depth == depth && entry.zobrist == zobrist {
            Some(entry.nodes)
        } else {
            None
        }
    }

    #[inline]
    pub fn store(&mut self, zobrist: u64, depth: u8, nodes: u64) {
        let index = self.index(zobrist);
        let entry = &mut self.table[index];

        // Minimal replacement policy
        if depth >= entry.depth {
            *entry = PerftEntry {
                zobrist,
                nodes,
                depth,
            };
        }
    }
}

/// Leaf count of the legal move tree `depth` plies deep. The last ply is
/// counted in bulk from the move list length.
pub fn perft(position: &mut Position, depth: u8) -> u64 {
    debug_assert_eq!(position.zobrist(), position.calculate_zobrist());

    if depth == 0 {
        return 1;
    }

    let moves = gen_legal_moves(position);
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0;
    for mov in moves {
        position.make_move(mov);
        nodes += perft(position, depth - 1);
        position.unmake_move();
    }

    nodes
}

/// Same count as [`perft`], reusing subtree results from `table` for
/// transpositions.
pub fn perft_cached(position: &mut Position, depth: u8, table: &mut PerftTable) -> u64 {
    if depth == 0 {
        return 1;
    }

    let zobrist = position.zobrist();
    if let Some(nodes) = table.probe(zobrist, depth) {
        return nodes;
    }

    let moves = gen_legal_moves(position);
    let nodes = if depth == 1 {
        moves.len() as u64
    } else {
        let mut nodes = 0;
        for mov in moves {
            position.make_move(mov);
            nodes += perft_cached(position, depth - 1, table);
            position.unmake_move();
        }
        nodes
    };

    table.store(zobrist, depth, nodes);
    nodes
}

/// Per-root-move subtree counts; their sum is `perft(position, depth)`.
pub fn divide(position: &mut Position, depth: u8) -> Vec<(Move, u64)> {
    if depth == 0 {
        return Vec::new();
    }

    gen_legal_moves(position)
        .into_iter()
        .map(|mov| {
            position.make_move(mov);
            let nodes = perft(position, depth - 1);
            position.unmake_move();

            tracing::trace!(%mov, nodes, "divide");
            (mov, nodes)
        })
        .collect()
}

/// One perft suite line: a position and the expected counts for depth 1, 2, ...
#[derive(Debug, Clone)]
pub struct EpdLine {
    pub position: Position,
    pub expected: Vec<u64>,
}

/// Parses `<FEN> ;D1 <nodes> ;D2 <nodes> ...`. Blank lines and `#`
/// comments yield `None`.
pub fn parse_epd(line: &str) -> Result<Option<EpdLine>, EpdError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut parts = line.split(';');
    let position = Position::from_fen(parts.next().unwrap_or_default())?;

    let expected = parts
        .enumerate()
        .map(|(index, part)| {
            let depth = index + 1;
            let mut tokens = part.split_whitespace();
            let marker = format!("D{depth}");

            match (tokens.next(), tokens.next(), tokens.next()) {
                (Some(found), Some(nodes), None) if found == marker => nodes
                    .parse::<u64>()
                    .map_err(|_| EpdError::NodeCount(nodes.to_string())),
                _ => Err(EpdError::DepthMarker {
                    depth,
                    found: part.trim().to_string(),
                }),
            }
        })
        .collect::<Result<Vec<u64>, EpdError>>()?;

    Ok(Some(EpdLine { position, expected }))
}
