use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the two competing warriors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    A,
    B,
}

impl Player {
    pub const BOTH: [Player; 2] = [Player::A, Player::B];

    pub fn index(self) -> usize {
        match self {
            Player::A => 0,
            Player::B => 1,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::A => f.write_str("A"),
            Player::B => f.write_str("B"),
        }
    }
}

/// A thread of control: an absolute address plus the player it belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Process {
    pub pc: usize,
    pub owner: Player,
}

/// A player's live processes in execution order.
///
/// The head runs next. A process that survives its instruction goes to
/// the tail; one that retires is simply never pushed back.
#[derive(Clone, Debug)]
pub struct ProcessQueue {
    owner: Player,
    limit: usize,
    queue: VecDeque<Process>,
}

impl ProcessQueue {
    /// A queue holding a single process at `pc`.
    pub fn new(owner: Player, pc: usize, limit: usize) -> Self {
        let mut queue = VecDeque::with_capacity(limit.min(1024));
        queue.push_back(Process { pc, owner });
        Self {
            owner,
            limit,
            queue,
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Take the head process to execute it.
    pub fn pop(&mut self) -> Option<Process> {
        self.queue.pop_front()
    }

    /// Put a process that finished its instruction back at the tail.
    pub fn requeue(&mut self, pc: usize) {
        self.queue.push_back(Process {
            pc,
            owner: self.owner,
        });
    }

    /// Add a spawned process behind everything queued so far, unless the
    /// player is already at its process limit. Returns whether it was added.
    pub fn spawn(&mut self, pc: usize) -> bool {
        if self.queue.len() >= self.limit {
            return false;
        }
        self.queue.push_back(Process {
            pc,
            owner: self.owner,
        });
        true
    }

    /// Program counters of the queued processes, head first.
    pub fn pcs(&self) -> impl Iterator<Item = usize> + '_ {
        self.queue.iter().map(|p| p.pc)
    }
}
