//! Scenario definition and builder API.

use crate::process::{Op, ProcDef};
use crate::types::{NodeId, Tick};

/// A complete simulation scenario: the node count, the shared quantum,
/// and the process set with programs.
#[derive(Debug, Clone)]
pub struct Scenario {
    /// Nodes are created with ids `1..=num_nodes`.
    pub num_nodes: u32,
    /// Maximum ticks a process may run before preemption back to ready.
    /// Shared by every node.
    pub quantum: Tick,
    /// Processes in input order; global pids are assigned from this order,
    /// node-local pids from the placement order within each node.
    pub procs: Vec<ProcDef>,
}

impl Scenario {
    pub fn builder() -> ScenarioBuilder {
        ScenarioBuilder {
            num_nodes: 1,
            quantum: 1,
            procs: Vec::new(),
        }
    }
}

/// Builder for constructing scenarios in tests and embedding callers.
pub struct ScenarioBuilder {
    num_nodes: u32,
    quantum: Tick,
    procs: Vec<ProcDef>,
}

impl ScenarioBuilder {
    pub fn nodes(mut self, num_nodes: u32) -> Self {
        self.num_nodes = num_nodes;
        self
    }

    pub fn quantum(mut self, quantum: Tick) -> Self {
        self.quantum = quantum;
        self
    }

    /// Add a process with defaulted size and priority.
    pub fn proc(mut self, name: &str, node: u32, program: Vec<Op>) -> Self {
        self.procs.push(ProcDef {
            name: name.to_string(),
            size: 1,
            priority: 1,
            node: NodeId(node),
            program,
        });
        self
    }

    pub fn proc_def(mut self, def: ProcDef) -> Self {
        self.procs.push(def);
        self
    }

    pub fn build(self) -> Scenario {
        Scenario {
            num_nodes: self.num_nodes,
            quantum: self.quantum,
            procs: self.procs,
        }
    }
}
