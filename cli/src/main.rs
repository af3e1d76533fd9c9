use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use renditioner::cli::{Cli, Command, PrefixArgs};
use renditioner::report::{format_size, print_plan, Report};
use renditioner_core::pipeline::validate_key;
use renditioner_core::plan::{base_filename, build_targets};
use renditioner_core::{InboundEvent, LocalStorage, Processor};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Init logging
    let log_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    match &cli.command {
        Command::Process {
            file,
            output,
            container,
            delete,
            timeout,
            dry_run,
            prefixes,
        } => {
            handle_process(
                file,
                output,
                container,
                *delete,
                timeout.map(Duration::from_secs),
                *dry_run,
                prefixes,
            )
            .await
        }
        Command::Plan { key, prefixes } => handle_plan(key, prefixes),
    }
}

async fn handle_process(
    file: &str,
    output: &Path,
    container: &str,
    delete: bool,
    timeout: Option<Duration>,
    dry_run: bool,
    prefixes: &PrefixArgs,
) -> Result<()> {
    let config = prefixes.to_config();
    config.validate().context("Invalid directory configuration")?;
    log::info!(
        "Using configuration: small={} medium={} original={} source={}",
        config.small_dir,
        config.medium_dir,
        config.original_dir,
        config.source_dir
    );

    let storage = LocalStorage::new(output)
        .await
        .context("Failed to initialize local storage")?
        .with_source_root(".");

    let mut processor = Processor::new(Arc::new(storage), config);
    if let Some(limit) = timeout {
        processor = processor.with_io_timeout(limit);
    }

    // The local runner has no real bucket; the file path is the object key.
    let event = InboundEvent::new(container, file);
    processor.validate(&event)?;
    let targets = processor.plan(&event);

    if dry_run {
        println!("[dry-run] {} would produce under {}:", file, output.display());
        print_plan(&targets);
        if delete {
            println!("  and then delete {}", file);
        }
        return Ok(());
    }

    let source_size = std::fs::metadata(file)
        .with_context(|| format!("Cannot read input file {}", file))?
        .len();
    println!("Processing {} ({})...", file, format_size(source_size));

    processor
        .process(&event, delete)
        .await
        .with_context(|| format!("Processor failed for {}", file))?;

    println!("✓ Processed {} into {}", file, output.display());
    Report::collect(source_size, output, &targets).print_summary();

    Ok(())
}

fn handle_plan(key: &str, prefixes: &PrefixArgs) -> Result<()> {
    let config = prefixes.to_config();
    config.validate().context("Invalid directory configuration")?;

    let targets = build_targets(&config, base_filename(key));

    if let Err(e) = validate_key(&config, key) {
        println!("Note: processing would reject this key: {}", e);
    }
    println!("Renditions for {}:", key);
    print_plan(&targets);

    Ok(())
}
