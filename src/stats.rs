//! Per-process summary statistics and the final table.

use std::fmt;
use std::io::{self, Write};

use crate::process::{ProcState, Process};
use crate::types::{LocalPid, NodeId, Tick};

/// One summary row for a finished process.
///
/// Processes that never finish (deadlocked rendezvous) get no row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub finish_time: Tick,
    pub node: NodeId,
    pub local_pid: LocalPid,
    pub run_time: Tick,
    pub block_time: Tick,
    pub wait_time: Tick,
    pub sends: u64,
    pub recvs: u64,
}

impl SummaryRow {
    fn from_proc(p: &Process) -> Self {
        SummaryRow {
            finish_time: p.finish_time,
            node: p.node,
            local_pid: p.local_pid,
            run_time: p.run_time,
            block_time: p.block_time,
            wait_time: p.wait_time,
            sends: p.sends,
            recvs: p.recvs,
        }
    }

    /// The composite sort key: finish time first, ties by placement.
    pub fn key(&self) -> (Tick, NodeId, LocalPid) {
        (self.finish_time, self.node, self.local_pid)
    }
}

impl fmt::Display for SummaryRow {
    /// Renders the fixed-width table row:
    /// `| TTTTT | Proc NN.PP | Run r, Block b, Wait w, Sends s, Recvs v`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "| {:05} | Proc {:02}.{:02} | Run {}, Block {}, Wait {}, Sends {}, Recvs {}",
            self.finish_time,
            self.node.0,
            self.local_pid.0,
            self.run_time,
            self.block_time,
            self.wait_time,
            self.sends,
            self.recvs
        )
    }
}

/// Receiver for summary rows. Write failures propagate to the caller.
pub trait SummarySink {
    fn row(&mut self, row: &SummaryRow) -> io::Result<()>;
}

/// Final statistics: one row per finished process, ordered by
/// `(finish_time, node_id, node_local_pid)` ascending.
#[derive(Debug, Clone, Default)]
pub struct Summary {
    rows: Vec<SummaryRow>,
}

impl Summary {
    pub(crate) fn from_procs<'a>(procs: impl Iterator<Item = &'a Process>) -> Self {
        let mut rows: Vec<SummaryRow> = procs
            .filter(|p| p.state == ProcState::Finished)
            .map(SummaryRow::from_proc)
            .collect();
        rows.sort_by_key(SummaryRow::key);
        Summary { rows }
    }

    pub fn rows(&self) -> &[SummaryRow] {
        &self.rows
    }

    /// Feed every row, in order, to the sink.
    pub fn emit(&self, sink: &mut dyn SummarySink) -> io::Result<()> {
        for row in &self.rows {
            sink.row(row)?;
        }
        Ok(())
    }
}

/// Renders summary rows as the fixed-width table.
pub struct TableWriter<W> {
    writer: W,
}

impl<W: Write> TableWriter<W> {
    pub fn new(writer: W) -> Self {
        TableWriter { writer }
    }
}

impl<W: Write> SummarySink for TableWriter<W> {
    fn row(&mut self, row: &SummaryRow) -> io::Result<()> {
        writeln!(self.writer, "{row}")
    }
}
