//! Round-robin preemption and wait-time accounting on a single node.

use dosim::*;

mod common;

/// Two processes share one node: A (DOOP 5) is preempted after each
/// quantum, B (DOOP 1) finishes in the gap, A runs the remainder.
#[test]
fn quantum_preemption_interleaves_processes() {
    common::setup();
    let scenario = Scenario::builder()
        .nodes(1)
        .quantum(2)
        .proc("A", 1, vec![Op::Doop(5), Op::Halt])
        .proc("B", 1, vec![Op::Doop(1), Op::Halt])
        .build();
    let mut trace = Trace::new();
    let summary = Simulator::new(scenario).run(&mut trace);

    let timeline: Vec<(Tick, u32, TraceKind)> = trace
        .events()
        .iter()
        .map(|e| (e.time, e.pid.0, e.kind))
        .collect();
    assert_eq!(
        timeline,
        vec![
            (0, 1, TraceKind::New),
            (0, 2, TraceKind::New),
            (0, 1, TraceKind::Ready),
            (0, 2, TraceKind::Ready),
            (0, 1, TraceKind::Running),
            (2, 1, TraceKind::Ready),
            (2, 2, TraceKind::Running),
            (3, 2, TraceKind::Finished),
            (3, 1, TraceKind::Running),
            (5, 1, TraceKind::Ready),
            (5, 1, TraceKind::Running),
            (6, 1, TraceKind::Finished),
        ]
    );

    // B finishes first; rows are ordered by finish time.
    let rows = summary.rows();
    assert_eq!(rows.len(), 2);

    let b = &rows[0];
    assert_eq!(b.local_pid, LocalPid(2));
    assert_eq!(b.finish_time, 3);
    assert_eq!(b.run_time, 1);
    // B sat in the ready queue through A's first quantum.
    assert_eq!(b.wait_time, 2);

    let a = &rows[1];
    assert_eq!(a.local_pid, LocalPid(1));
    assert_eq!(a.finish_time, 6);
    assert_eq!(a.run_time, 5);
    // One tick while B ran, plus one quantum charged at each of A's two
    // preemptions.
    assert_eq!(a.wait_time, 5);
}

/// DOOP wait credit goes to every process sitting in the ready queue at
/// the moment the burst runs, not to blocked ones.
#[test]
fn blocked_processes_earn_no_wait_credit() {
    common::setup();
    let scenario = Scenario::builder()
        .nodes(1)
        .quantum(4)
        .proc("sleeper", 1, vec![Op::Block(10), Op::Halt])
        .proc("worker", 1, vec![Op::Doop(3), Op::Halt])
        .build();
    let mut trace = Trace::new();
    let summary = Simulator::new(scenario).run(&mut trace);

    // The sleeper blocks immediately and earns no wait while the worker
    // runs its three ticks.
    let rows = summary.rows();
    let worker = rows.iter().find(|r| r.local_pid == LocalPid(2)).unwrap();
    let sleeper = rows.iter().find(|r| r.local_pid == LocalPid(1)).unwrap();
    assert_eq!(worker.finish_time, 3);
    assert_eq!(worker.wait_time, 0);
    assert_eq!(sleeper.wait_time, 0);
    assert_eq!(sleeper.block_time, 10);
    assert_eq!(sleeper.finish_time, 10);
    assert_eq!(trace.kind_count(TraceKind::Finished), 2);
}
