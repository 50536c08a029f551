//! The simulation engine.
//!
//! This is the core of the simulator: per-node round-robin time slices,
//! the cross-node rendezvous matcher, and the global driver that
//! interleaves nodes deterministically and fast-forwards a node's clock
//! when only timed events remain.

use tracing::{debug, info, warn};

use crate::node::{Node, Pending};
use crate::process::{BlockCause, Op, ProcState, Process};
use crate::scenario::Scenario;
use crate::stats::Summary;
use crate::trace::{EventSink, TraceEvent, TraceKind};
use crate::types::{LocalPid, NodeId, ProcId, Tick};

/// The main simulator.
///
/// Owns the process table, the per-node queues, and the global rendezvous
/// registry. The registry lives here rather than in any node because a
/// SEND on one node must be able to see a RECV waiting on another.
pub struct Simulator {
    procs: Vec<Process>,
    nodes: Vec<Node>,
    /// Processes blocked on SEND/RECV across all nodes, in the order they
    /// blocked. Sweep order follows this; ties go to the earliest entry.
    registry: Vec<ProcId>,
}

impl Simulator {
    /// Build a simulator from a scenario.
    ///
    /// Processes naming a node outside `1..=num_nodes` are dropped with a
    /// warning; they would be unreachable by the driver anyway.
    pub fn new(scenario: Scenario) -> Self {
        let mut nodes: Vec<Node> = (1..=scenario.num_nodes)
            .map(|id| Node::new(NodeId(id), scenario.quantum))
            .collect();

        let mut procs = Vec::with_capacity(scenario.procs.len());
        for (i, def) in scenario.procs.into_iter().enumerate() {
            let global_pid = i as u32 + 1;
            let Some(node) = nodes.iter_mut().find(|n| n.id == def.node) else {
                warn!(
                    name = def.name.as_str(),
                    node = def.node.0,
                    "process names an unknown node; dropping it"
                );
                continue;
            };
            let pid = ProcId(procs.len());
            let local_pid = LocalPid(node.residents.len() as u32 + 1);
            node.residents.push(pid);
            procs.push(Process::new(def, global_pid, local_pid));
        }

        Simulator {
            procs,
            nodes,
            registry: Vec::new(),
        }
    }

    /// Run the simulation to quiescence and return the final summary.
    ///
    /// State transitions are reported through `sink` in the order the
    /// engine produces them, starting with the time-zero `new` and
    /// `ready` announcements.
    pub fn run(&mut self, sink: &mut dyn EventSink) -> Summary {
        for n in 0..self.nodes.len() {
            for i in 0..self.nodes[n].residents.len() {
                let p = self.nodes[n].residents[i];
                self.emit(sink, n, p, TraceKind::New);
            }
        }
        for n in 0..self.nodes.len() {
            for i in 0..self.nodes[n].residents.len() {
                let p = self.nodes[n].residents[i];
                self.make_ready(sink, n, p);
            }
        }

        while self.any_work_left() {
            let mut progress = false;
            for n in 0..self.nodes.len() {
                progress |= self.flush_pending(sink, n);
            }
            for n in 0..self.nodes.len() {
                progress |= self.expire_blocked(sink, n);
            }
            for n in 0..self.nodes.len() {
                progress |= self.run_timeslice(sink, n);
            }
            if !progress {
                progress = self.sweep_matches();
            }
            if !progress && !self.advance_to_next_event() {
                // Only unmatchable rendezvous waits remain.
                break;
            }
        }

        Summary::from_procs(self.procs.iter())
    }

    /// The process table, for inspection after (or between) runs.
    pub fn procs(&self) -> &[Process] {
        &self.procs
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Current rendezvous registry contents, in registration order.
    pub fn registry(&self) -> &[ProcId] {
        &self.registry
    }

    fn emit(&self, sink: &mut dyn EventSink, n: usize, p: ProcId, kind: TraceKind) {
        sink.record(TraceEvent {
            node: self.nodes[n].id,
            time: self.nodes[n].clock,
            pid: self.procs[p.0].local_pid,
            kind,
        });
    }

    /// Put a process at the tail of its node's ready queue.
    fn make_ready(&mut self, sink: &mut dyn EventSink, n: usize, p: ProcId) {
        self.procs[p.0].state = ProcState::Ready;
        self.emit(sink, n, p, TraceKind::Ready);
        self.nodes[n].ready.push_back(p);
    }

    /// Mark a process finished at the node's current clock.
    fn finish(&mut self, sink: &mut dyn EventSink, n: usize, p: ProcId) {
        let clock = self.nodes[n].clock;
        let proc = &mut self.procs[p.0];
        proc.state = ProcState::Finished;
        proc.finish_time = clock;
        self.emit(sink, n, p, TraceKind::Finished);
        debug!(
            node = self.nodes[n].id.0,
            t = clock,
            proc = self.procs[p.0].local_pid.0,
            name = self.procs[p.0].name.as_str(),
            "finished"
        );
    }

    /// Credit `dt` ticks of wait time to every process currently in the
    /// node's ready queue.
    fn credit_ready_wait(&mut self, n: usize, dt: Tick) {
        if dt == 0 {
            return;
        }
        for i in 0..self.nodes[n].ready.len() {
            let q = self.nodes[n].ready[i];
            self.procs[q.0].wait_time += dt;
        }
    }

    /// Apply every pending release due exactly at the node's current clock.
    fn flush_pending(&mut self, sink: &mut dyn EventSink, n: usize) -> bool {
        let clock = self.nodes[n].clock;
        let entries = std::mem::take(&mut self.nodes[n].pending);
        let mut progress = false;
        for entry in entries {
            if entry.due == clock {
                progress = true;
                if entry.finish {
                    // The matcher saw HALT coming up; consume it here so
                    // the release and the finish are one transition.
                    self.procs[entry.proc.0].pc += 1;
                    self.finish(sink, n, entry.proc);
                } else {
                    self.make_ready(sink, n, entry.proc);
                }
            } else {
                self.nodes[n].pending.push(entry);
            }
        }
        progress
    }

    /// Wake every timed blocker whose deadline has passed.
    fn expire_blocked(&mut self, sink: &mut dyn EventSink, n: usize) -> bool {
        let clock = self.nodes[n].clock;
        let blocked = std::mem::take(&mut self.nodes[n].blocked);
        let mut woken = Vec::new();
        for p in blocked {
            let due = matches!(
                self.procs[p.0].wish,
                Some(BlockCause::Timer { until }) if until > 0 && clock >= until
            );
            if due {
                woken.push(p);
            } else {
                self.nodes[n].blocked.push(p);
            }
        }
        let progress = !woken.is_empty();
        for p in woken {
            self.procs[p.0].wish = None;
            if self.procs[p.0].next_is_halt() {
                self.procs[p.0].pc += 1;
                self.finish(sink, n, p);
            } else {
                self.make_ready(sink, n, p);
            }
        }
        progress
    }

    /// Dispatch the head of the node's ready queue for up to one quantum.
    ///
    /// Returns whether anything happened (an empty queue is the only
    /// no-progress case).
    fn run_timeslice(&mut self, sink: &mut dyn EventSink, n: usize) -> bool {
        let Some(p) = self.nodes[n].ready.pop_front() else {
            return false;
        };
        let op_count = self.procs[p.0].ops.len();
        if self.procs[p.0].state == ProcState::Finished || self.procs[p.0].pc >= op_count {
            return true;
        }

        self.procs[p.0].state = ProcState::Running;
        self.emit(sink, n, p, TraceKind::Running);
        debug!(
            node = self.nodes[n].id.0,
            t = self.nodes[n].clock,
            proc = self.procs[p.0].local_pid.0,
            name = self.procs[p.0].name.as_str(),
            "dispatch"
        );

        let quantum = self.nodes[n].quantum;
        let mut used: Tick = 0;
        let mut yielded = false;

        while used < quantum && self.procs[p.0].pc < op_count {
            let pc = self.procs[p.0].pc;
            match self.procs[p.0].ops[pc] {
                Op::Doop(remaining) => {
                    let burst = remaining.min(quantum - used);
                    self.credit_ready_wait(n, burst);
                    self.procs[p.0].run_time += burst;
                    self.nodes[n].clock += burst;
                    used += burst;
                    let left = remaining - burst;
                    self.procs[p.0].ops[pc] = Op::Doop(left);
                    if left == 0 {
                        self.procs[p.0].pc += 1;
                    }
                }
                Op::Block(ticks) => {
                    let until = self.nodes[n].clock + ticks;
                    let proc = &mut self.procs[p.0];
                    proc.block_time += ticks;
                    proc.wish = Some(BlockCause::Timer { until });
                    proc.state = ProcState::Blocked;
                    proc.pc += 1;
                    self.emit(sink, n, p, TraceKind::Blocked);
                    self.nodes[n].blocked.push(p);
                    yielded = true;
                    break;
                }
                Op::Send(to) => {
                    // The attempt itself costs one tick on the local CPU.
                    self.credit_ready_wait(n, 1);
                    self.procs[p.0].run_time += 1;
                    self.nodes[n].clock += 1;
                    used += 1;

                    let proc = &mut self.procs[p.0];
                    proc.wish = Some(BlockCause::SendTo(to));
                    proc.state = ProcState::Blocked;
                    self.emit(sink, n, p, TraceKind::BlockedSend);
                    self.nodes[n].blocked.push(p);
                    self.registry.push(p);
                    self.try_match(n, p);
                    yielded = true;
                    break;
                }
                Op::Recv(from) => {
                    self.credit_ready_wait(n, 1);
                    self.procs[p.0].run_time += 1;
                    self.nodes[n].clock += 1;
                    used += 1;

                    let proc = &mut self.procs[p.0];
                    proc.wish = Some(BlockCause::RecvFrom(from));
                    proc.state = ProcState::Blocked;
                    self.emit(sink, n, p, TraceKind::BlockedRecv);
                    self.nodes[n].blocked.push(p);
                    self.registry.push(p);
                    self.try_match(n, p);
                    yielded = true;
                    break;
                }
                Op::Halt => {
                    self.procs[p.0].pc += 1;
                    self.finish(sink, n, p);
                    yielded = true;
                    break;
                }
            }
        }

        if !yielded && self.procs[p.0].state != ProcState::Finished {
            if self.procs[p.0].pc < op_count {
                // Preempted: charge the round-trip latency until the next
                // dispatch opportunity.
                self.procs[p.0].wait_time += quantum;
                self.make_ready(sink, n, p);
            } else {
                // The program ran off its end without a HALT.
                self.finish(sink, n, p);
            }
        }
        true
    }

    /// Try to pair the just-blocked process with a waiting counterpart.
    ///
    /// On success both sides consume their SEND/RECV and are scheduled to
    /// release at `trigger_node.clock + 1` on their own home clocks.
    fn try_match(&mut self, trigger: usize, p: ProcId) -> bool {
        if self.procs[p.0].state != ProcState::Blocked {
            return false;
        }
        let my_addr = self.procs[p.0].addr();

        match self.procs[p.0].wish {
            Some(BlockCause::SendTo(to)) => {
                for i in 0..self.registry.len() {
                    let q = self.registry[i];
                    if q == p || self.procs[q.0].state != ProcState::Blocked {
                        continue;
                    }
                    let Some(BlockCause::RecvFrom(from)) = self.procs[q.0].wish else {
                        continue;
                    };
                    if to != self.procs[q.0].addr() || from != my_addr {
                        continue;
                    }
                    self.pair(trigger, p, q);
                    return true;
                }
                false
            }
            Some(BlockCause::RecvFrom(from)) => {
                for i in 0..self.registry.len() {
                    let s = self.registry[i];
                    if s == p || self.procs[s.0].state != ProcState::Blocked {
                        continue;
                    }
                    let Some(BlockCause::SendTo(to)) = self.procs[s.0].wish else {
                        continue;
                    };
                    if to != my_addr || from != self.procs[s.0].addr() {
                        continue;
                    }
                    self.pair(trigger, s, p);
                    return true;
                }
                false
            }
            _ => false,
        }
    }

    /// Commit a sender/receiver pair: bump counters and program counters,
    /// drop both from their blocked lists and the registry, and schedule
    /// a release on each home node.
    fn pair(&mut self, trigger: usize, sender: ProcId, receiver: ProcId) {
        let due = self.nodes[trigger].clock + 1;
        info!(
            sender = self.procs[sender.0].addr().0,
            sender_name = self.procs[sender.0].name.as_str(),
            receiver = self.procs[receiver.0].addr().0,
            receiver_name = self.procs[receiver.0].name.as_str(),
            due,
            "rendezvous"
        );
        for (p, is_sender) in [(sender, true), (receiver, false)] {
            let proc = &mut self.procs[p.0];
            proc.pc += 1;
            if is_sender {
                proc.sends += 1;
            } else {
                proc.recvs += 1;
            }
            proc.wish = None;
            let home = (proc.node.0 - 1) as usize;
            let finish = self.procs[p.0].next_is_halt();
            self.nodes[home].blocked.retain(|&q| q != p);
            self.registry.retain(|&q| q != p);
            self.nodes[home].pending.push(Pending {
                proc: p,
                due,
                finish,
            });
        }
    }

    /// Scan the registry in registration order and commit the first
    /// possible match. Runs only when no node made progress this round.
    fn sweep_matches(&mut self) -> bool {
        for i in 0..self.registry.len() {
            let p = self.registry[i];
            if self.procs[p.0].state != ProcState::Blocked {
                continue;
            }
            let home = (self.procs[p.0].node.0 - 1) as usize;
            if self.try_match(home, p) {
                return true;
            }
        }
        false
    }

    /// Fast-forward the single node with the earliest future event to
    /// that event's time. The event itself fires on the next driver pass,
    /// keeping "earliest first" without a global clock.
    fn advance_to_next_event(&mut self) -> bool {
        let mut best: Option<(Tick, usize)> = None;
        for (n, node) in self.nodes.iter().enumerate() {
            if let Some(t) = node.next_event_time(&self.procs) {
                if best.map_or(true, |(bt, _)| t < bt) {
                    best = Some((t, n));
                }
            }
        }
        let Some((t, n)) = best else {
            return false;
        };
        debug!(node = self.nodes[n].id.0, from = self.nodes[n].clock, to = t, "time skip");
        self.nodes[n].clock = t;
        true
    }

    fn any_work_left(&self) -> bool {
        self.nodes.iter().any(Node::has_work)
    }
}
