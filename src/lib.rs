//! dosim - Deterministic discrete-event simulator of a small distributed
//! operating system.
//!
//! A fixed set of processes is partitioned across a fixed set of compute
//! nodes. Each node runs its own round-robin scheduler with a shared
//! quantum and its own clock; processes coordinate through synchronous
//! cross-node message rendezvous (SEND/RECV). The output is a time-ordered
//! trace of state transitions and a final per-process statistics table.
//!
//! # Architecture
//!
//! - **Engine**: per-node time slices, the rendezvous matcher, and the
//!   global driver with quiescence detection and time-skip
//! - **Processes**: flat instruction programs over a small control block
//! - **Nodes**: local clock, FIFO ready queue, blocked list, pending releases
//! - **Parse**: whitespace-token decks with `LOOP … END` expansion
//! - **Trace / Stats**: capture sinks, the fixed-width text formats, and
//!   a Perfetto export
//!
//! # Usage
//!
//! ```rust,no_run
//! use dosim::{Op, Scenario, Simulator, Trace};
//!
//! let scenario = Scenario::builder()
//!     .nodes(1)
//!     .quantum(2)
//!     .proc("worker", 1, vec![Op::Doop(3), Op::Halt])
//!     .build();
//!
//! let mut trace = Trace::new();
//! let summary = Simulator::new(scenario).run(&mut trace);
//! trace.dump();
//! for row in summary.rows() {
//!     println!("{row}");
//! }
//! ```

pub mod engine;
pub mod node;
pub mod parse;
mod perfetto;
pub mod process;
pub mod scenario;
pub mod stats;
pub mod trace;
pub mod types;

// Re-export the main public types for convenience.
pub use engine::Simulator;
pub use node::{Node, Pending};
pub use parse::{parse_deck, ParseError};
pub use process::{BlockCause, Op, ProcDef, ProcState, Process};
pub use scenario::{Scenario, ScenarioBuilder};
pub use stats::{Summary, SummaryRow, SummarySink, TableWriter};
pub use trace::{EventSink, Trace, TraceEvent, TraceKind};
pub use types::{Addr, LocalPid, NodeId, ProcId, Tick};
