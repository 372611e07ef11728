// Small dev utility: print per-line cycle durations, total duration and lead time of a process.
//
// Usage:
//   cargo run --bin process_duration_report -- [--json-log] <process.json> [qty]
//
// The JSON file holds one ProdProcess (code, name, lines).
// --json-log switches the tracing output to JSON lines.

use anyhow::{bail, Context};
use production_aps::engine::CycleDurationCalculator;
use production_aps::{logging, ProdProcess};
use rust_decimal::Decimal;
use std::str::FromStr;

fn main() -> anyhow::Result<()> {
    let (flags, positional): (Vec<String>, Vec<String>) =
        std::env::args().skip(1).partition(|arg| arg.starts_with("--"));

    if flags.iter().any(|f| f == "--json-log") {
        logging::init_json();
    } else {
        logging::init();
    }
    if let Some(unknown) = flags.iter().find(|f| *f != "--json-log") {
        bail!("unknown flag: {}", unknown);
    }

    let mut args = positional.into_iter();
    let Some(process_path) = args.next() else {
        bail!("usage: process_duration_report [--json-log] <process.json> [qty]");
    };
    let qty = match args.next() {
        Some(raw) => Decimal::from_str(raw.trim()).with_context(|| format!("invalid qty: {}", raw))?,
        None => Decimal::ONE,
    };

    let raw = std::fs::read_to_string(&process_path)
        .with_context(|| format!("failed to read {}", process_path))?;
    let mut process: ProdProcess =
        serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", process_path))?;
    process.attach_lines();

    let calculator = CycleDurationCalculator::new();

    println!("process={} ({}) qty={}", process.code, process.name, qty);
    for line in &process.lines {
        let durations = calculator
            .compute_cycle_durations(line, qty)
            .with_context(|| format!("line {}", line.name))?;
        println!(
            "  [p{}] {}: cycles={} machine={}s human={}s planned={}s",
            line.priority,
            line.name,
            durations.nb_cycles,
            durations.machine_duration,
            durations.human_duration,
            durations.planned_duration
        );
    }

    let total = calculator.compute_entire_duration(&process, qty)?;
    let lead_time = calculator.compute_lead_time_duration(&process, qty)?;
    println!("entire_duration={}s", total);
    println!("lead_time={}s", lead_time);
    Ok(())
}
