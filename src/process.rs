//! Process model: instructions, the control block, and block causes.

use crate::types::{Addr, LocalPid, NodeId, Tick};

/// One instruction in a process's flat, pre-expanded program.
///
/// `LOOP`/`END` never reach the engine; the parser expands loop bodies
/// into repeated instructions (see [`crate::parse`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// Consume CPU for the given number of ticks.
    Doop(Tick),
    /// Leave the CPU for the given number of ticks.
    Block(Tick),
    /// Hand a message to the process at the address; blocks until a
    /// matching RECV is posted.
    Send(Addr),
    /// Wait for a message from the process at the address.
    Recv(Addr),
    /// End the program. Costs zero ticks.
    Halt,
}

/// Process life-cycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcState {
    New,
    Ready,
    Running,
    Blocked,
    Finished,
}

/// Why a process sits on its node's blocked list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockCause {
    /// Timed BLOCK: wake when the node clock reaches `until`.
    /// A deadline of zero never fires.
    Timer { until: Tick },
    /// Blocked on SEND: waiting for a receiver at `to` that expects us.
    SendTo(Addr),
    /// Blocked on RECV: waiting for a sender at `from` that targets us.
    RecvFrom(Addr),
}

impl BlockCause {
    /// Whether this is a rendezvous wait (SEND or RECV, not a timer).
    pub fn is_rendezvous(self) -> bool {
        matches!(self, BlockCause::SendTo(_) | BlockCause::RecvFrom(_))
    }
}

/// Definition of a process for scenario creation.
#[derive(Debug, Clone)]
pub struct ProcDef {
    pub name: String,
    pub size: u32,
    /// Parsed and carried, but the round-robin engine does not consult it.
    pub priority: u32,
    /// Home node. A process naming a node outside the scenario's node set
    /// is dropped at simulator construction.
    pub node: NodeId,
    pub program: Vec<Op>,
}

/// A process control block at runtime.
#[derive(Debug, Clone)]
pub struct Process {
    pub name: String,
    /// 1-based id across all processes in input order.
    pub global_pid: u32,
    pub node: NodeId,
    pub local_pid: LocalPid,
    pub size: u32,
    pub priority: u32,
    /// Flat program. A `Doop` remainder is decremented in place when the
    /// quantum expires mid-instruction.
    pub ops: Vec<Op>,
    pub pc: usize,
    pub state: ProcState,
    pub run_time: Tick,
    pub block_time: Tick,
    pub wait_time: Tick,
    /// Home-node clock at the `finished` transition.
    pub finish_time: Tick,
    pub sends: u64,
    pub recvs: u64,
    /// Set while the process sits on a blocked list; cleared when a match
    /// is made or a timer expires.
    pub wish: Option<BlockCause>,
}

impl Process {
    pub(crate) fn new(def: ProcDef, global_pid: u32, local_pid: LocalPid) -> Self {
        Process {
            name: def.name,
            global_pid,
            node: def.node,
            local_pid,
            size: def.size,
            priority: def.priority,
            ops: def.program,
            pc: 0,
            state: ProcState::New,
            run_time: 0,
            block_time: 0,
            wait_time: 0,
            finish_time: 0,
            sends: 0,
            recvs: 0,
            wish: None,
        }
    }

    /// The address other processes use to name this one.
    pub fn addr(&self) -> Addr {
        Addr::new(self.node, self.local_pid)
    }

    /// Whether the next instruction is HALT. Drives the collapse of a
    /// release-then-finish into a single `finished` transition.
    pub(crate) fn next_is_halt(&self) -> bool {
        self.ops.get(self.pc) == Some(&Op::Halt)
    }
}
