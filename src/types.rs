//! Newtype wrappers and type aliases for domain concepts.
//!
//! Newtypes for identifiers (node ids, node-local pids, message addresses)
//! prevent silent type confusion. A type alias for plain tick counts
//! provides self-documenting code without the boilerplate of implementing
//! arithmetic traits.

use std::fmt;

/// Simulated time in ticks. Every node advances its own tick counter;
/// there is no global clock.
pub type Tick = u64;

/// Compute-node identifier. Node ids are 1-based and dense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// 1-based sequence number of a process within its home node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalPid(pub u32);

/// Index of a process in the simulator's process table.
///
/// All cross-structure links (ready queues, blocked lists, the rendezvous
/// registry, pending releases) are these indices rather than references,
/// so no structure ever owns a process twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcId(pub usize);

/// Message address used by SEND and RECV: `node_id * 100 + node_local_pid`.
///
/// Both components are expected in `[1, 99]`; an address that names no
/// process simply never matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Addr(pub u32);

impl Addr {
    pub fn new(node: NodeId, pid: LocalPid) -> Self {
        Addr(node.0 * 100 + pid.0)
    }

    /// The node component of the address.
    pub fn node(self) -> NodeId {
        NodeId(self.0 / 100)
    }

    /// The node-local pid component of the address.
    pub fn local_pid(self) -> LocalPid {
        LocalPid(self.0 % 100)
    }
}

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
