use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::instruction::{Instruction, Opcode};

/// Configuration for a single match.
///
/// JSON keys are camelCase (`coreSize`, `maximumTicks`, ...) and every key
/// is optional; missing keys fall back to [`Settings::default`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Number of cells in the core.
    pub core_size: usize,
    /// Maximum instructions per program. Enforced by the assembler, carried
    /// here so the whole lobby configuration travels together.
    pub instruction_limit: usize,
    /// Opcode every cell holds before the programs are loaded.
    pub initial_instruction: Opcode,
    /// Ticks after which the match is a draw.
    pub maximum_ticks: usize,
    /// Cap on live processes per player; further SPL spawns are dropped.
    pub maximum_processes_per_player: usize,
    /// Folding window for read offsets.
    pub read_distance: usize,
    /// Folding window for write offsets.
    pub write_distance: usize,
    /// Fewest free cells allowed between the two programs, either way round.
    pub minimum_separation: usize,
    /// Free cells from the end of player A's program to player B's first
    /// instruction, or the upper bound when `random_separation` is set.
    pub separation: usize,
    /// Draw the separation uniformly from `minimum_separation..=separation`.
    pub random_separation: bool,
    /// Seed for the placement RNG.
    pub seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            core_size: 2048,
            instruction_limit: 100,
            initial_instruction: Opcode::Dat,
            maximum_ticks: 10_000,
            maximum_processes_per_player: 64,
            read_distance: 2048,
            write_distance: 2048,
            minimum_separation: 100,
            separation: 1024,
            random_separation: false,
            seed: 0,
        }
    }
}

impl Settings {
    /// Parse settings from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings =
            serde_json::from_str(json).map_err(|e| ConfigError::Malformed(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check that a match built from these settings is well defined.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let core_size = self.core_size;
        if core_size == 0 {
            return Err(ConfigError::EmptyCore);
        }
        if self.read_distance == 0 || self.read_distance > core_size {
            return Err(ConfigError::ReadDistance {
                distance: self.read_distance,
                core_size,
            });
        }
        if self.write_distance == 0 || self.write_distance > core_size {
            return Err(ConfigError::WriteDistance {
                distance: self.write_distance,
                core_size,
            });
        }
        if self.maximum_ticks == 0 {
            return Err(ConfigError::NoTicks);
        }
        if self.maximum_processes_per_player == 0 {
            return Err(ConfigError::NoProcesses);
        }
        // Both gaps around the ring must be at least the minimum.
        if self.minimum_separation == 0
            || self.minimum_separation > self.separation
            || self.separation + self.minimum_separation > core_size
        {
            return Err(ConfigError::Separation {
                minimum: self.minimum_separation,
                separation: self.separation,
                core_size,
            });
        }
        Ok(())
    }

    /// The instruction empty cells are initialised to.
    pub fn fill_instruction(&self) -> Instruction {
        Instruction::fill(self.initial_instruction)
    }

    /// A copy with a different placement seed.
    pub fn with_seed(&self, seed: u64) -> Self {
        Self {
            seed,
            ..self.clone()
        }
    }
}
