pub mod attacks;
pub mod board;
pub mod error;
pub mod fen;
pub mod make_move;
pub mod moves;
pub mod notation;
pub mod snapshot;
pub mod status;
pub mod zobrist;

pub use attacks::movegen::*;
pub use attacks::oracle::*;
pub use board::*;
pub use error::*;
pub use make_move::*;
pub use moves::*;
pub use notation::*;
pub use snapshot::*;
pub use status::*;
