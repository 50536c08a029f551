//! dosim - Run distributed-OS scheduling simulations from program decks.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;

use dosim::{parse_deck, Simulator, TableWriter, Trace};

/// Run distributed-OS scheduling simulations from program decks.
#[derive(Parser)]
#[command(name = "dosim")]
struct Cli {
    /// Program deck to simulate. Reads stdin when omitted.
    input: Option<PathBuf>,

    /// Write the trace as Chrome Trace Event JSON for ui.perfetto.dev.
    #[arg(long, value_name = "PATH")]
    perfetto: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    if let Err(e) = run(&cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let deck = match &cli.input {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?,
        None => io::read_to_string(io::stdin())
            .map_err(|e| format!("failed to read stdin: {e}"))?,
    };

    let scenario = parse_deck(&deck).map_err(|e| e.to_string())?;

    let mut sim = Simulator::new(scenario);
    let mut trace = Trace::with_procs(sim.procs());
    let summary = sim.run(&mut trace);

    let stdout = io::stdout().lock();
    let mut out = io::BufWriter::new(stdout);
    trace
        .write_events(&mut out)
        .map_err(|e| format!("failed to write trace: {e}"))?;
    {
        let mut table = TableWriter::new(&mut out);
        summary
            .emit(&mut table)
            .map_err(|e| format!("failed to write summary: {e}"))?;
    }
    out.flush().map_err(|e| format!("failed to write summary: {e}"))?;

    if let Some(path) = &cli.perfetto {
        let mut file = fs::File::create(path)
            .map_err(|e| format!("failed to create {}: {e}", path.display()))?;
        trace
            .write_perfetto_json(&mut file)
            .map_err(|e| format!("failed to write perfetto trace: {e}"))?;
        eprintln!("wrote perfetto trace to {}", path.display());
    }

    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();
}
