//! brlkeys - load braille display key tables and replay key events

use std::io::{self, Read};

use anyhow::{Context, Result};
use clap::Parser;

use brlkeys::cli::{self, CliArgs};
use brlkeys::keytable::load_key_table;

fn main() -> Result<()> {
    let args = CliArgs::parse();

    let log_dir = if args.log_file {
        match brlkeys::config_paths::ensure_logs_dir() {
            Ok(dir) => Some(dir),
            Err(e) => {
                eprintln!("Warning: {}", e);
                None
            }
        }
    } else {
        None
    };
    brlkeys::tracing::init(log_dir.as_deref());

    let definition = load_key_table(&args.device, args.table.as_deref())
        .with_context(|| format!("Failed to load key table for {}", args.device))?;
    println!("{}", cli::summarize(&definition));

    let Some(script_path) = args.script else {
        return Ok(());
    };

    let script = if script_path.as_os_str() == "-" {
        let mut script = String::new();
        io::stdin()
            .read_to_string(&mut script)
            .context("Failed to read event script from stdin")?;
        script
    } else {
        std::fs::read_to_string(&script_path)
            .with_context(|| format!("Failed to read event script {}", script_path.display()))?
    };
    let events = cli::parse_event_script(&script)
        .with_context(|| format!("Invalid event script {}", script_path.display()))?;

    let mut table = definition.instantiate();
    if args.log_events {
        table.enable_event_logging();
    }

    tracing::info!("Replaying {} key events", events.len());
    let stdout = io::stdout();
    cli::replay(&mut table, &events, &mut stdout.lock()).context("Failed to write output")?;

    Ok(())
}
