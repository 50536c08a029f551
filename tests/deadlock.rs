//! Unmatchable rendezvous waits: the driver must still terminate, and
//! deadlocked processes get no summary row.

use dosim::*;

mod common;

/// A SEND naming a process that does not exist waits forever; the driver
/// finds no future event and stops.
#[test]
fn unmatched_send_deadlocks_quietly() {
    common::setup();
    let scenario = Scenario::builder()
        .nodes(1)
        .quantum(2)
        .proc("P", 1, vec![Op::Send(Addr(199)), Op::Halt])
        .build();
    let mut trace = Trace::new();
    let mut sim = Simulator::new(scenario);
    let summary = sim.run(&mut trace);

    let kinds: Vec<TraceKind> = trace.events().iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TraceKind::New,
            TraceKind::Ready,
            TraceKind::Running,
            TraceKind::BlockedSend,
        ]
    );
    assert!(summary.rows().is_empty());

    // The stuck sender stays blocked and registered.
    assert_eq!(sim.procs()[0].state, ProcState::Blocked);
    assert_eq!(sim.registry(), &[ProcId(0)]);
}

/// Mismatched wishes never pair: a sender targeting B while B expects a
/// message from someone else is not a rendezvous.
#[test]
fn one_sided_address_agreement_is_not_a_match() {
    common::setup();
    let scenario = Scenario::builder()
        .nodes(1)
        .quantum(2)
        .proc("A", 1, vec![Op::Send(Addr(102)), Op::Halt])
        .proc("B", 1, vec![Op::Recv(Addr(103)), Op::Halt])
        .build();
    let mut trace = Trace::new();
    let mut sim = Simulator::new(scenario);
    let summary = sim.run(&mut trace);

    assert!(summary.rows().is_empty());
    assert_eq!(trace.kind_count(TraceKind::Finished), 0);
    assert_eq!(sim.registry().len(), 2);
}

/// A deadlocked process does not stop the rest of the system: the
/// matched pair finishes and only the stuck one is omitted.
#[test]
fn partial_deadlock_omits_only_the_stuck_process() {
    common::setup();
    let scenario = Scenario::builder()
        .nodes(1)
        .quantum(2)
        .proc("A", 1, vec![Op::Send(Addr(102)), Op::Halt])
        .proc("B", 1, vec![Op::Recv(Addr(101)), Op::Halt])
        .proc("C", 1, vec![Op::Send(Addr(999)), Op::Halt])
        .build();
    let mut trace = Trace::new();
    let mut sim = Simulator::new(scenario);
    let summary = sim.run(&mut trace);

    let rows = summary.rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].local_pid, LocalPid(1));
    assert_eq!(rows[1].local_pid, LocalPid(2));

    let c = &sim.procs()[2];
    assert_eq!(c.state, ProcState::Blocked);
    assert_eq!(c.wish, Some(BlockCause::SendTo(Addr(999))));
}
