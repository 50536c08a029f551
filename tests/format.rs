//! End-to-end text output: exact trace lines and summary table, from a
//! raw deck through the parser and engine.

use dosim::*;

mod common;

fn simulate(deck: &str) -> (Trace, Summary) {
    common::setup();
    let scenario = parse_deck(deck).expect("deck parses");
    let mut trace = Trace::new();
    let summary = Simulator::new(scenario).run(&mut trace);
    (trace, summary)
}

fn render(trace: &Trace, summary: &Summary) -> String {
    let mut out = Vec::new();
    trace.write_events(&mut out).unwrap();
    {
        let mut table = TableWriter::new(&mut out);
        summary.emit(&mut table).unwrap();
    }
    String::from_utf8(out).unwrap()
}

#[test]
fn single_process_full_output() {
    let (trace, summary) = simulate("1 1 2\nP 1 1 1\nDOOP 3\nHALT\n");
    let expected = "\
[01] 00000: process 1 new
[01] 00000: process 1 ready
[01] 00000: process 1 running
[01] 00002: process 1 ready
[01] 00002: process 1 running
[01] 00003: process 1 finished
| 00003 | Proc 01.01 | Run 3, Block 0, Wait 2, Sends 0, Recvs 0
";
    assert_eq!(render(&trace, &summary), expected);
}

/// At time zero every node announces its residents' births first, then
/// their ready transitions, nodes in id order.
#[test]
fn birth_announcements_precede_ready_across_nodes() {
    let (trace, summary) = simulate("2 2 1\nA 1 1 1\nHALT\nB 1 1 2\nHALT\n");
    let expected = "\
[01] 00000: process 1 new
[02] 00000: process 1 new
[01] 00000: process 1 ready
[02] 00000: process 1 ready
[01] 00000: process 1 running
[01] 00000: process 1 finished
[02] 00000: process 1 running
[02] 00000: process 1 finished
| 00000 | Proc 01.01 | Run 0, Block 0, Wait 0, Sends 0, Recvs 0
| 00000 | Proc 02.01 | Run 0, Block 0, Wait 0, Sends 0, Recvs 0
";
    assert_eq!(render(&trace, &summary), expected);
}

#[test]
fn rendezvous_labels_carry_direction() {
    let (trace, _summary) = simulate(
        "2 2 2\nA 1 1 1\nSEND 201\nHALT\nB 1 1 2\nRECV 101\nHALT\n",
    );
    let lines: Vec<String> = trace.events().iter().map(|e| e.to_string()).collect();
    assert!(lines.contains(&"[01] 00001: process 1 blocked (send)".to_string()));
    assert!(lines.contains(&"[02] 00001: process 1 blocked (recv)".to_string()));
}

/// The perfetto export is valid JSON with one metadata record per node
/// and per process, balanced begin/end span markers, and threads labeled
/// with the process display names.
#[test]
fn perfetto_export_is_valid_json() {
    common::setup();
    let scenario =
        parse_deck("2 1 2\nalpha 1 1 1\nDOOP 5\nHALT\nbeta 1 1 1\nDOOP 1\nHALT\n").unwrap();
    let mut sim = Simulator::new(scenario);
    let mut trace = Trace::with_procs(sim.procs());
    let _summary = sim.run(&mut trace);

    let mut out = Vec::new();
    trace.write_perfetto_json(&mut out).unwrap();

    let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
    let events = value["traceEvents"].as_array().unwrap();

    let begins = events.iter().filter(|e| e["ph"] == "B").count();
    let ends = events.iter().filter(|e| e["ph"] == "E").count();
    assert_eq!(begins, ends);
    assert!(events.iter().any(|e| e["name"] == "process_name"));

    // Thread metadata carries the deck names, not just numeric ids.
    let thread_names: Vec<&str> = events
        .iter()
        .filter(|e| e["name"] == "thread_name")
        .map(|e| e["args"]["name"].as_str().unwrap())
        .collect();
    assert_eq!(thread_names.len(), 2);
    assert!(thread_names.iter().any(|n| n.contains("alpha")));
    assert!(thread_names.iter().any(|n| n.contains("beta")));

    // Running spans are named after the process as well.
    assert!(events.iter().any(|e| e["ph"] == "B" && e["name"] == "alpha"));
}
