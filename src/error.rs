use thiserror::Error;

use crate::process::Player;

/// Settings that would leave a match with undefined behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("core size must be positive")]
    EmptyCore,
    #[error("read distance {distance} must be between 1 and the core size {core_size}")]
    ReadDistance { distance: usize, core_size: usize },
    #[error("write distance {distance} must be between 1 and the core size {core_size}")]
    WriteDistance { distance: usize, core_size: usize },
    #[error("maximum ticks must be positive")]
    NoTicks,
    #[error("maximum processes per player must be positive")]
    NoProcesses,
    #[error(
        "separation {separation} with minimum {minimum} does not fit a core of {core_size} cells"
    )]
    Separation {
        minimum: usize,
        separation: usize,
        core_size: usize,
    },
    #[error("invalid settings: {0}")]
    Malformed(String),
}

/// Reasons a match refuses to start.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("player {0} submitted an empty program")]
    EmptyProgram(Player),
    #[error(
        "programs of {len_a} and {len_b} instructions {gap} cells apart leave less than {minimum} free cells in a core of {core_size}"
    )]
    ProgramsOverlap {
        len_a: usize,
        len_b: usize,
        gap: usize,
        minimum: usize,
        core_size: usize,
    },
    #[error("player {player} entry offset {entry} is outside its {len} instructions")]
    EntryOutOfRange {
        player: Player,
        entry: usize,
        len: usize,
    },
}
