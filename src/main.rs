//! Snapsort CLI - thin front-end over the sorting engine
//!
//! Parses arguments, wires up logging, drains the progress channel onto
//! stdout and prints the final summary. All classification and copy
//! logic lives in the library.

use anyhow::{Context, Result, bail};
use clap::Parser;
use snapsort::{Cli, CopyOutcome, CopyProgress, RunOptions, Sorter};
use std::sync::mpsc;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.sample_config {
        print!("{}", RunOptions::sample_config());
        return Ok(());
    }

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let (Some(source), Some(destination)) = (cli.source.clone(), cli.destination.clone()) else {
        bail!("both SOURCE and DEST directories are required (see --help)");
    };

    let options = match &cli.config {
        Some(path) => {
            let from_file = RunOptions::load_from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?;
            cli.merge_with_options(from_file)
        }
        None => cli.to_options(),
    };

    let sorter = Sorter::new(options);
    let records = sorter.analyze(&source)?;

    let (tx, rx) = mpsc::channel::<CopyProgress>();
    let printer = std::thread::spawn(move || {
        for event in rx {
            match event.outcome {
                CopyOutcome::Copied => {
                    println!(
                        "Processed : {} --> {}",
                        event.source.display(),
                        event.destination.display()
                    );
                }
                CopyOutcome::Failed(message) => {
                    eprintln!(
                        "FAILED    : {} --> {} ({})",
                        event.source.display(),
                        event.destination.display(),
                        message
                    );
                }
            }
        }
    });

    let copy_stats = sorter.sort(&records, &destination, &tx);
    drop(tx); // close the channel so the printer drains and exits
    let _ = printer.join();
    let copy_stats = copy_stats?;

    println!("{}", sorter.stats().summary());
    if copy_stats.failed > 0 {
        println!("Completed with {} failures", copy_stats.failed);
    }

    Ok(())
}
