//! azconfig CLI
//!
//! Entry point for the `azconfig` command-line tool.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use azconfig::{ops, Store, ToolConfig};

#[derive(Parser)]
#[command(name = "azconfig")]
#[command(about = "Label automation for Azure App Configuration", version)]
struct Cli {
    /// The environment (ex. ci, ctp etc.)
    #[arg(long)]
    env: String,

    /// The AppKey (ex. clientservices, reportingservices etc.)
    #[arg(long, visible_alias = "resource")]
    appkey: String,

    /// Label to operate on; defaults to the AppKey
    #[arg(long)]
    label: Option<String>,

    /// Import/export file
    #[arg(long)]
    file: Option<PathBuf>,

    /// Command: d=delete, a=set appsettings key, i=import, e=export
    #[arg(long, value_enum)]
    command: OpCode,

    /// With d: delete matching entries across labels concurrently
    #[arg(long)]
    sweep: bool,

    /// Path to tool config file (default: azconfig.toml if present)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OpCode {
    #[value(name = "d")]
    Delete,
    #[value(name = "a")]
    SetAppsettings,
    #[value(name = "i")]
    Import,
    #[value(name = "e")]
    Export,
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("Error: {}", err);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = ToolConfig::load(cli.config.as_deref())?;
    let store = Store::new(&config.program, config.resource_name(&cli.env));
    let label = cli.label.clone().unwrap_or_else(|| cli.appkey.clone());

    match cli.command {
        OpCode::Delete => {
            if cli.sweep {
                let issued = ops::delete::sweep(
                    &store,
                    &label,
                    Duration::from_millis(config.sweep_delay_ms),
                )?;
                println!("Issued {} delete calls", issued);
            } else {
                ops::delete::delete_label(&store, &label)?;
            }
        }
        OpCode::SetAppsettings => {
            ops::appsettings::set_appsettings(&store, &label, &config)?;
        }
        OpCode::Import => {
            let file = require_file(&cli, "imported")?;
            ops::import::import(&store, &cli.env, &label, &file, &config)?;
        }
        OpCode::Export => {
            let file = require_file(&cli, "exported")?;
            ops::export::export(&store, &label, &file, &config)?;
        }
    }

    Ok(())
}

fn require_file(cli: &Cli, action: &str) -> Result<String, String> {
    cli.file
        .as_ref()
        .map(|p| p.display().to_string())
        .ok_or_else(|| format!("Provide the name of the file to be {}.", action))
}
