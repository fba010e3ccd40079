//! Perft (performance test) for move generator validation.
//!
//! Perft counts the leaf nodes of the legal-move tree to a given depth.
//! Every node is reached by applying a move and left by rolling it back, so
//! matching the published counts checks generation, legality probing,
//! application and rollback together.

use super::legal_moves;
use crate::Position;

/// Counts the number of leaf nodes at the given depth.
pub fn perft(position: &mut Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = legal_moves(position);

    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0u64;
    for m in moves {
        position.apply(m, false);
        nodes += perft(position, depth - 1);
        position.undo();
    }
    nodes
}

/// Perft with divide: node count below each root move, keyed by LAN.
/// Useful for debugging to identify which moves have incorrect counts.
pub fn perft_divide(position: &mut Position, depth: u32) -> Vec<(String, u64)> {
    let moves = legal_moves(position);
    let mut results = Vec::with_capacity(moves.len());

    for m in moves {
        position.apply(m, false);
        let nodes = if depth > 1 {
            perft(position, depth - 1)
        } else {
            1
        };
        position.undo();
        results.push((m.to_lan(), nodes));
    }

    results.sort_by(|a, b| a.0.cmp(&b.0));
    results
}
