use serde::{Deserialize, Serialize};

use crate::engine::{Outcome, Retirement};
use crate::instruction::Instruction;
use crate::process::Player;

/// What happened to the executing process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepKind {
    /// Requeued at `next`.
    Continued { next: usize },
    /// Requeued at `next`; a new process was queued at `spawn` unless the
    /// player was at its process limit.
    Split {
        next: usize,
        spawn: usize,
        spawned: bool,
    },
    /// Removed from its queue.
    Retired { reason: Retirement },
}

impl StepKind {
    pub fn from_outcome(outcome: Outcome, spawned: bool) -> Self {
        match outcome {
            Outcome::Continue(next) => StepKind::Continued { next },
            Outcome::Split { next, spawn } => StepKind::Split {
                next,
                spawn,
                spawned,
            },
            Outcome::Retire(reason) => StepKind::Retired { reason },
        }
    }
}

/// A cell's contents right after a step wrote to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellWrite {
    pub address: usize,
    pub instruction: Instruction,
}

/// One executed instruction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEntry {
    /// Zero-based tick the step belongs to.
    pub tick: usize,
    pub player: Player,
    pub address: usize,
    /// The instruction as fetched, before its own side effects.
    pub instruction: Instruction,
    pub kind: StepKind,
    /// Cells written during the step, in first-write order.
    pub writes: Vec<CellWrite>,
    /// The player's live processes after the step.
    pub processes: usize,
}

/// Append-only record of a match, in execution order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    entries: Vec<TraceEntry>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: TraceEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Steps taken by one player.
    pub fn for_player(&self, player: Player) -> impl Iterator<Item = &TraceEntry> {
        self.entries.iter().filter(move |e| e.player == player)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
