pub mod magics;
pub mod movegen;
pub mod oracle;
pub mod tables;

pub use magics::{AttackTables, attack_tables};
