//! CostWatch CLI
//!
//! Thin operator surface over the console: simulate a provider
//! connection test, or poll a live backend and tail the activity log.

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, Command};
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

use costwatch_core::{Console, ConsoleConfig, EntryId};
use costwatch_schema::{run_probe, ProbeConfig, ProviderKind, RawSourceInput};

fn cli() -> Command {
    Command::new("costwatch")
        .version("0.1.0")
        .about("Client console for a FinOps monitoring backend")
        .subcommand_required(true)
        .subcommand(
            Command::new("probe")
                .about("Simulate a provider connection test")
                .arg(
                    Arg::new("type")
                        .long("type")
                        .required(true)
                        .help("Provider wire name, e.g. SPLUNK_MOCK"),
                )
                .arg(
                    Arg::new("field")
                        .long("field")
                        .action(ArgAction::Append)
                        .value_name("KEY=VALUE")
                        .help("Raw form field, repeatable"),
                ),
        )
        .subcommand(
            Command::new("watch")
                .about("Poll a backend and tail the activity log")
                .arg(
                    Arg::new("base-url")
                        .long("base-url")
                        .default_value("http://localhost:8000")
                        .help("Backend base URL (no trailing /api)"),
                )
                .arg(
                    Arg::new("duration")
                        .long("duration")
                        .value_parser(value_parser!(u64))
                        .help("Stop after this many seconds (default: run until Ctrl-C)"),
                ),
        )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match cli().get_matches().subcommand() {
        Some(("probe", matches)) => {
            let kind: ProviderKind = matches
                .get_one::<String>("type")
                .context("--type is required")?
                .parse()?;

            let mut input = RawSourceInput::new();
            if let Some(fields) = matches.get_many::<String>("field") {
                for raw in fields {
                    let (key, value) = raw
                        .split_once('=')
                        .with_context(|| format!("field '{raw}' is not KEY=VALUE"))?;
                    input = input.set(key, value);
                }
            }

            println!("probing {} ...", kind.label());
            match run_probe(kind, &input, ProbeConfig::default()).await {
                Ok(detail) => println!("ok: {detail}"),
                Err(failure) => println!("failed: {failure}"),
            }
            Ok(())
        }
        Some(("watch", matches)) => {
            let base_url = matches
                .get_one::<String>("base-url")
                .context("--base-url has a default")?
                .clone();
            let deadline = matches
                .get_one::<u64>("duration")
                .map(|secs| Instant::now() + Duration::from_secs(*secs));

            let mut console = Console::new(ConsoleConfig::new().with_base_url(base_url))?;
            console.start_sync();

            let mut printed: HashSet<EntryId> = HashSet::new();
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(Duration::from_secs(2)) => {
                        // Oldest-first so the tail reads chronologically.
                        for entry in console.activity().entries().into_iter().rev() {
                            if printed.insert(entry.id) {
                                println!(
                                    "[{}] {:7} {}",
                                    entry.timestamp.format("%H:%M:%S"),
                                    entry.kind.as_str(),
                                    entry.message
                                );
                            }
                        }
                    }
                    _ = tokio::signal::ctrl_c() => break,
                }
                if deadline.is_some_and(|d| Instant::now() >= d) {
                    break;
                }
            }

            console.stop_sync();
            println!(
                "synced state: {} checks, {} alerts, {} data sources",
                console.stores().checks.len().await,
                console.stores().alerts.len().await,
                console.stores().sources.len().await,
            );
            Ok(())
        }
        _ => unreachable!("subcommand required"),
    }
}
