use std::fs;
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use tal_contract::Contract;
use tal_ledger::BookConfig;
use tal_store::{InMemoryStore, StoreSnapshot};
use tal_types::Record;
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Invoke(args) => cmd_invoke(&cli.store, config, args, cli.format),
        Command::Init(args) => cmd_init(&cli.store, config, args),
        Command::Dump(args) => cmd_dump(&cli.store, args, cli.format),
        Command::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

/// Load the record book configuration, or the defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<BookConfig> {
    let Some(path) = path else {
        return Ok(BookConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config = BookConfig::from_toml(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    Ok(config)
}

/// Load the store from its snapshot file. A missing file is an empty store.
pub fn load_store(path: &Path) -> anyhow::Result<InMemoryStore> {
    if !path.exists() {
        debug!(path = %path.display(), "no snapshot, starting empty");
        return Ok(InMemoryStore::new());
    }
    let json = fs::read_to_string(path)
        .with_context(|| format!("reading store {}", path.display()))?;
    let snapshot = StoreSnapshot::from_json(&json)?;
    Ok(InMemoryStore::from_snapshot(&snapshot)?)
}

pub fn save_store(path: &Path, store: &InMemoryStore) -> anyhow::Result<()> {
    let json = store.snapshot()?.to_json()?;
    fs::write(path, json).with_context(|| format!("writing store {}", path.display()))?;
    debug!(path = %path.display(), keys = store.len()?, "snapshot saved");
    Ok(())
}

/// Run one contract invocation against the snapshot at `path` and persist
/// the result. Returns the invocation payload.
pub fn invoke(
    path: &Path,
    config: BookConfig,
    function: &str,
    args: &[String],
) -> anyhow::Result<Vec<u8>> {
    let contract = Contract::with_config(load_store(path)?, config);
    let payload = contract.invoke(function, args)?;
    save_store(path, &contract.into_store())?;
    Ok(payload)
}

fn cmd_invoke(
    path: &Path,
    config: BookConfig,
    args: InvokeArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let payload = invoke(path, config, &args.function, &args.args)?;
    let text = String::from_utf8_lossy(&payload);
    match format {
        OutputFormat::Json => println!("{text}"),
        OutputFormat::Text => {
            println!("{} {}", "✓".green().bold(), args.function.bold());
            if !payload.is_empty() {
                println!("{text}");
            }
        }
    }
    Ok(())
}

fn cmd_init(path: &Path, config: BookConfig, args: InitArgs) -> anyhow::Result<()> {
    let contract = Contract::with_config(load_store(path)?, config);
    contract.init()?;
    if args.seed {
        contract.invoke("initLedger", &[] as &[&str])?;
    }
    let store = contract.into_store();
    save_store(path, &store)?;
    println!(
        "{} Initialized store {} ({} keys)",
        "✓".green().bold(),
        path.display().to_string().bold(),
        store.len()?
    );
    Ok(())
}

fn cmd_dump(path: &Path, args: DumpArgs, format: OutputFormat) -> anyhow::Result<()> {
    let store = load_store(path)?;
    let prefix = args.prefix.unwrap_or_default();
    let snapshot = store.snapshot()?;
    let entries = snapshot.decode_entries()?;
    let entries = entries.iter().filter(|(key, _)| key.starts_with(&prefix));

    match format {
        OutputFormat::Json => {
            let object: serde_json::Map<String, serde_json::Value> = entries
                .map(|(key, value)| (key.clone(), record_value(value)))
                .collect();
            println!("{}", serde_json::to_string_pretty(&object)?);
        }
        OutputFormat::Text => {
            let mut count = 0usize;
            for (key, value) in entries {
                println!(
                    "{}  {}  {}",
                    key.yellow(),
                    record_kind(value).cyan(),
                    String::from_utf8_lossy(value)
                );
                count += 1;
            }
            if count == 0 {
                println!("No records.");
            }
        }
    }
    Ok(())
}

/// Label for a stored value: its doc type, `vehicle`, or `raw` for values
/// that are not records.
fn record_kind(bytes: &[u8]) -> &'static str {
    match Record::decode(bytes) {
        Ok(record) => record.doc_type().map_or("vehicle", |doc_type| doc_type.as_str()),
        Err(_) => "raw",
    }
}

/// Stored bytes as JSON: parsed when they hold JSON, otherwise a string.
fn record_value(bytes: &[u8]) -> serde_json::Value {
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(bytes).into_owned()))
}
