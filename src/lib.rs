pub mod chess;
pub mod perft;
