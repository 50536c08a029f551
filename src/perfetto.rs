//! Chrome Trace Event Format (JSON) export.
//!
//! Writes the simulation trace as a JSON file loadable in
//! [ui.perfetto.dev](https://ui.perfetto.dev). Each node is a Perfetto
//! process (pid = node id) and each simulated process a thread within it,
//! with its running periods shown as duration blocks.

use std::collections::HashSet;
use std::io::Write;

use serde_json::json;

use crate::trace::{Trace, TraceKind};
use crate::types::{LocalPid, NodeId};

/// Write the trace as Chrome Trace Event Format JSON.
///
/// Stream-writes events one at a time; no intermediate `Vec<Value>`.
pub(crate) fn write_json(trace: &Trace, writer: &mut impl Write) -> std::io::Result<()> {
    writer.write_all(b"{\"traceEvents\":[")?;

    let mut need_comma = false;

    // Metadata: one Perfetto process per node, one thread per simulated
    // process, both discovered from the events themselves.
    let mut nodes: Vec<u32> = trace.events().iter().map(|e| e.node.0).collect();
    nodes.sort_unstable();
    nodes.dedup();
    let mut threads: Vec<(u32, u32)> = trace
        .events()
        .iter()
        .map(|e| (e.node.0, e.pid.0))
        .collect();
    threads.sort_unstable();
    threads.dedup();

    for node in &nodes {
        write_comma(writer, &mut need_comma)?;
        serde_json::to_writer(
            &mut *writer,
            &json!({
                "ph": "M",
                "pid": node,
                "tid": 0,
                "name": "process_name",
                "args": { "name": format!("node {node:02}") }
            }),
        )?;
    }
    for (node, pid) in &threads {
        let name = trace.proc_name(NodeId(*node), LocalPid(*pid));
        write_comma(writer, &mut need_comma)?;
        serde_json::to_writer(
            &mut *writer,
            &json!({
                "ph": "M",
                "pid": node,
                "tid": pid,
                "name": "thread_name",
                "args": { "name": format!("{name} (proc {node:02}.{pid:02})") }
            }),
        )?;
    }

    // Duration blocks: a running period opens at `running` and closes at
    // whatever transition takes the process off the CPU.
    let mut on_cpu: HashSet<(u32, u32)> = HashSet::new();

    for event in trace.events() {
        let key = (event.node.0, event.pid.0);
        let value = match event.kind {
            TraceKind::Running => {
                on_cpu.insert(key);
                json!({
                    "ph": "B",
                    "pid": key.0,
                    "tid": key.1,
                    "ts": event.time,
                    "name": trace.proc_name(event.node, event.pid),
                    "cat": "sched"
                })
            }
            TraceKind::Blocked
            | TraceKind::BlockedSend
            | TraceKind::BlockedRecv
            | TraceKind::Ready
            | TraceKind::Finished
                if on_cpu.remove(&key) =>
            {
                json!({
                    "ph": "E",
                    "pid": key.0,
                    "tid": key.1,
                    "ts": event.time,
                    "cat": "sched",
                    "args": { "reason": event.kind.label() }
                })
            }
            // Off-CPU transitions (releases, expiries, births) show as
            // instants on the thread's track.
            TraceKind::Ready | TraceKind::Finished | TraceKind::New => {
                json!({
                    "ph": "i",
                    "s": "t",
                    "pid": key.0,
                    "tid": key.1,
                    "ts": event.time,
                    "name": event.kind.label(),
                    "cat": "sched"
                })
            }
            _ => continue,
        };
        write_comma(writer, &mut need_comma)?;
        serde_json::to_writer(&mut *writer, &value)?;
    }

    writer.write_all(b"]}\n")
}

fn write_comma(writer: &mut impl Write, need_comma: &mut bool) -> std::io::Result<()> {
    if *need_comma {
        writer.write_all(b",")?;
    }
    *need_comma = true;
    Ok(())
}
