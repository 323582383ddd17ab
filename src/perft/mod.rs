//! Node counting over the legal move tree, used to validate generation and
//! make/unmake against published reference counts.

mod perft_logic;

pub use perft_logic::*;
