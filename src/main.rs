use std::io::Write;

use clap::Parser;
use log::debug;
use snafu::ErrorCompat;

mod args;
mod survey;

fn main() {
    let parsed = args::Args::parse();
    if parsed.verbose {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::init();
    }
    debug!("args: {:?}", parsed);

    let spreadsheet = parsed
        .spreadsheet
        .clone()
        .or_else(|| prompt("Path of the responses spreadsheet: "));
    let output_dir = parsed
        .output_dir
        .clone()
        .or_else(|| prompt("Output directory for the charts: "));

    let (spreadsheet, output_dir) = match (spreadsheet, output_dir) {
        (Some(spreadsheet), Some(output_dir)) => (spreadsheet, output_dir),
        // Nothing to work with. Not an error.
        _ => return,
    };

    let opts = survey::AnalysisOptions {
        input_type: parsed.input_type,
        rules: parsed.rules,
        summary: parsed.summary,
        reference: parsed.reference,
    };

    if let Err(e) = survey::run_analysis(&spreadsheet, &output_dir, &opts) {
        eprintln!("An error occured {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}

fn prompt(message: &str) -> Option<String> {
    print!("{}", message);
    std::io::stdout().flush().ok()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line).ok()?;
    let line = line.trim();
    if line.is_empty() {
        None
    } else {
        Some(line.to_string())
    }
}
