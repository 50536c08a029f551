//! Trace event recording for the simulator.
//!
//! Every state transition (new, ready, running, blocked, finished) is
//! reported through [`EventSink`] as it happens. [`Trace`] is the
//! in-memory capture used by tests and by the CLI, with query helpers
//! and renderers for the fixed-width text format and for Perfetto.

use std::fmt;
use std::io::{self, Write};

use crate::process::Process;
use crate::types::{LocalPid, NodeId, Tick};

/// The kind of state transition recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceKind {
    New,
    Ready,
    Running,
    /// Timed BLOCK entered.
    Blocked,
    /// Blocked waiting for a rendezvous partner as a sender.
    BlockedSend,
    /// Blocked waiting for a rendezvous partner as a receiver.
    BlockedRecv,
    Finished,
}

impl TraceKind {
    /// The label printed in a trace line.
    pub fn label(self) -> &'static str {
        match self {
            TraceKind::New => "new",
            TraceKind::Ready => "ready",
            TraceKind::Running => "running",
            TraceKind::Blocked => "blocked",
            TraceKind::BlockedSend => "blocked (send)",
            TraceKind::BlockedRecv => "blocked (recv)",
            TraceKind::Finished => "finished",
        }
    }
}

/// A single state transition produced by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceEvent {
    pub node: NodeId,
    /// The node's local clock at the transition.
    pub time: Tick,
    pub pid: LocalPid,
    pub kind: TraceKind,
}

impl fmt::Display for TraceEvent {
    /// Renders the fixed-width trace line: `[NN] TTTTT: process P LABEL`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:02}] {:05}: process {} {}",
            self.node.0,
            self.time,
            self.pid.0,
            self.kind.label()
        )
    }
}

/// Receiver for state transitions as the engine produces them.
///
/// This is the engine's only output boundary besides the final summary,
/// so tests can capture events in memory while the CLI renders them.
pub trait EventSink {
    fn record(&mut self, event: TraceEvent);
}

/// In-memory trace capture, with query helpers for tests.
#[derive(Debug, Clone, Default)]
pub struct Trace {
    events: Vec<TraceEvent>,
    proc_names: Vec<(NodeId, LocalPid, String)>,
}

impl EventSink for Trace {
    fn record(&mut self, event: TraceEvent) {
        self.events.push(event);
    }
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture with display names taken from the process table, so
    /// renderers can label processes with more than their numeric ids.
    pub fn with_procs(procs: &[Process]) -> Self {
        Trace {
            events: Vec::new(),
            proc_names: procs
                .iter()
                .map(|p| (p.node, p.local_pid, p.name.clone()))
                .collect(),
        }
    }

    /// Resolve a process to its display name, or `"???"` if unknown.
    pub(crate) fn proc_name(&self, node: NodeId, pid: LocalPid) -> &str {
        self.proc_names
            .iter()
            .find(|(n, p, _)| *n == node && *p == pid)
            .map(|(_, _, name)| name.as_str())
            .unwrap_or("???")
    }

    /// All events in emission order.
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    /// Number of times a process was dispatched onto its node's CPU.
    pub fn schedule_count(&self, node: NodeId, pid: LocalPid) -> usize {
        self.events
            .iter()
            .filter(|e| e.node == node && e.pid == pid && e.kind == TraceKind::Running)
            .count()
    }

    /// Number of events of the given kind across all nodes.
    pub fn kind_count(&self, kind: TraceKind) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }

    /// Node clock at the process's `finished` transition, if it finished.
    pub fn finish_time(&self, node: NodeId, pid: LocalPid) -> Option<Tick> {
        self.events
            .iter()
            .find(|e| e.node == node && e.pid == pid && e.kind == TraceKind::Finished)
            .map(|e| e.time)
    }

    /// Events of one node in emission order.
    pub fn node_events(&self, node: NodeId) -> impl Iterator<Item = &TraceEvent> {
        self.events.iter().filter(move |e| e.node == node)
    }

    /// Write one fixed-width line per event in emission order.
    pub fn write_events(&self, writer: &mut impl Write) -> io::Result<()> {
        for event in &self.events {
            writeln!(writer, "{event}")?;
        }
        Ok(())
    }

    /// Write the trace as Chrome Trace Event Format JSON, loadable in
    /// [ui.perfetto.dev](https://ui.perfetto.dev).
    pub fn write_perfetto_json(&self, writer: &mut impl Write) -> io::Result<()> {
        crate::perfetto::write_json(self, writer)
    }

    /// Pretty-print the trace to stderr for debugging.
    pub fn dump(&self) {
        for event in &self.events {
            eprintln!("{event}");
        }
    }
}
