mod client;
mod layout;
mod runner;
mod script;
mod sim;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::io;

#[derive(Parser)]
#[command(name = "keypad-cli")]
#[command(about = "Host tools for the I2C keypad: simulator and layout")]
struct Cli {
    /// Show debug logging from the keypad state machines
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a scenario script against a simulated keypad
    Simulate {
        /// Path to the scenario script
        #[arg(value_name = "SCRIPT")]
        path: String,
    },
    /// Print the key legends and codes
    Layout {
        /// Also write an HTML/SVG drawing of the pad to this file
        #[arg(long)]
        html: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Command::Simulate { path } => {
            let contents =
                fs::read_to_string(&path).with_context(|| format!("reading {}", path))?;
            let lines =
                script::parse_script(&contents).with_context(|| format!("parsing {}", path))?;

            let summary = runner::run(&lines, &mut io::stdout().lock())?;
            println!(
                "{} statements, {} expectations passed",
                summary.statements, summary.expectations
            );
        }
        Command::Layout { html } => {
            print!("{}", layout::render_text());
            if let Some(path) = html {
                fs::write(&path, layout::generate_html())
                    .with_context(|| format!("writing {}", path))?;
                println!("Layout written to {}", path);
            }
        }
    }

    Ok(())
}
