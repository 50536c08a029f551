//! Compute-node state: local clock, ready queue, blocked list, and
//! pending releases.

use std::collections::VecDeque;

use crate::process::{BlockCause, Process};
use crate::types::{NodeId, ProcId, Tick};

/// A release scheduled by the rendezvous matcher for a future point on a
/// node's own clock.
#[derive(Debug, Clone, Copy)]
pub struct Pending {
    pub proc: ProcId,
    /// Absolute node clock at which the release fires.
    pub due: Tick,
    /// Transition straight to FINISHED instead of READY: the process's
    /// next instruction is HALT.
    pub finish: bool,
}

/// One simulated compute node.
///
/// Clocks advance independently; the driver interleaves nodes in id order
/// but never synchronizes their clocks.
#[derive(Debug)]
pub struct Node {
    pub id: NodeId,
    /// Maximum ticks a process may run before preemption back to ready.
    pub quantum: Tick,
    pub clock: Tick,
    /// Resident processes in input order.
    pub residents: Vec<ProcId>,
    /// FIFO dispatch order for the round-robin slice.
    pub ready: VecDeque<ProcId>,
    /// Unordered; holds timed and rendezvous blockers alike.
    pub blocked: Vec<ProcId>,
    pub pending: Vec<Pending>,
}

impl Node {
    pub fn new(id: NodeId, quantum: Tick) -> Self {
        Node {
            id,
            quantum,
            clock: 0,
            residents: Vec::new(),
            ready: VecDeque::new(),
            blocked: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Earliest future event on this node: the minimum over pending due
    /// times and timed-BLOCK deadlines strictly after the current clock.
    pub fn next_event_time(&self, procs: &[Process]) -> Option<Tick> {
        let pending = self
            .pending
            .iter()
            .map(|entry| entry.due)
            .filter(|&due| due > self.clock);
        let timers = self.blocked.iter().filter_map(|&p| match procs[p.0].wish {
            Some(BlockCause::Timer { until }) if until > self.clock => Some(until),
            _ => None,
        });
        pending.chain(timers).min()
    }

    /// Whether anything at all is left to do here.
    pub fn has_work(&self) -> bool {
        !self.ready.is_empty() || !self.blocked.is_empty() || !self.pending.is_empty()
    }
}
