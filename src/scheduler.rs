use log::{debug, trace};

use crate::engine::{Outcome, execute};
use crate::instruction::Instruction;
use crate::memory::Core;
use crate::process::{Player, Process, ProcessQueue};

/// The result of running one process for one instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Step {
    pub process: Process,
    /// The instruction as fetched.
    pub instruction: Instruction,
    pub outcome: Outcome,
    /// Whether a `SPL` actually queued its new process.
    pub spawned: bool,
}

/// Round-robin scheduling over both players' process queues.
#[derive(Clone, Debug)]
pub struct Scheduler {
    queues: [ProcessQueue; 2],
}

impl Scheduler {
    /// One process per player, at the given start addresses.
    pub fn new(starts: [usize; 2], process_limit: usize) -> Self {
        Self {
            queues: [
                ProcessQueue::new(Player::A, starts[0], process_limit),
                ProcessQueue::new(Player::B, starts[1], process_limit),
            ],
        }
    }

    pub fn queue(&self, player: Player) -> &ProcessQueue {
        &self.queues[player.index()]
    }

    pub fn is_alive(&self, player: Player) -> bool {
        !self.queue(player).is_empty()
    }

    /// Run the head process of `player`'s queue for one instruction.
    ///
    /// Returns `None` when the player has no processes left.
    pub fn step(&mut self, player: Player, core: &mut Core) -> Option<Step> {
        let queue = &mut self.queues[player.index()];
        let process = queue.pop()?;
        let instruction = *core.cell(process.pc);
        let outcome = execute(core, process.pc);
        trace!("player {player} at {:05}: {instruction} -> {outcome:?}", process.pc);

        let mut spawned = false;
        match outcome {
            Outcome::Continue(next) => queue.requeue(next),
            Outcome::Split { next, spawn } => {
                queue.requeue(next);
                spawned = queue.spawn(spawn);
                if !spawned {
                    debug!("player {player} at process limit, dropped spawn at {spawn:05}");
                }
            }
            Outcome::Retire(reason) => {
                debug!(
                    "player {player} process at {:05} retired ({reason:?}), {} left",
                    process.pc,
                    queue.len()
                );
            }
        }

        Some(Step {
            process,
            instruction,
            outcome,
            spawned,
        })
    }
}
