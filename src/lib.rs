pub mod instruction;
pub mod settings;
pub mod error;
pub mod memory;
pub mod address;
pub mod process;
pub mod engine;
pub mod program;
pub mod scheduler;
pub mod trace;
pub mod battle;
pub mod metrics;
pub mod tournament;
pub mod warriors;
