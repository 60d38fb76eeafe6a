use crate::config::{HarnessConfig, Selection};
use crate::demos::DEMOS;
use crate::error::Result;
use crate::logger::initialize_logger;
use clap::Parser;
use log::LevelFilter;
use std::io::Write;

/// Runs the map demonstrations.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Demo to run; may be repeated. Defaults to `films`.
    #[arg(short, long = "demo", value_name = "NAME")]
    pub demos: Vec<String>,

    /// Run every demo.
    #[arg(short, long, conflicts_with = "demos")]
    pub all: bool,

    /// List the available demos and exit.
    #[arg(short, long)]
    pub list: bool,

    /// Raise log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl From<Args> for HarnessConfig {
    fn from(args: Args) -> Self {
        let defaults = HarnessConfig::default();
        let selection = if args.list {
            Selection::List
        } else if args.all {
            Selection::All
        } else if !args.demos.is_empty() {
            Selection::Named(args.demos)
        } else {
            defaults.selection
        };
        let log_level = match args.verbose {
            0 => defaults.log_level,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };
        HarnessConfig {
            selection,
            log_level,
        }
    }
}

pub fn run() -> Result<()> {
    let config = HarnessConfig::from(Args::parse());
    initialize_logger(config.log_level);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_with(&config, &mut out)
}

/// Execute the configured selection, writing demo output to `out`.
///
/// Names are resolved before anything runs, so an unknown name produces no
/// partial output.
pub fn run_with(config: &HarnessConfig, out: &mut dyn Write) -> Result<()> {
    if config.selection == Selection::List {
        for demo in DEMOS {
            writeln!(out, "{:<18}{}", demo.name, demo.summary)?;
        }
        return Ok(());
    }

    let selected = config.demos()?;
    let titled = selected.len() > 1;
    for demo in selected {
        if titled {
            writeln!(out, "== {} ==", demo.name)?;
        }
        demo.run(out)?;
    }
    out.flush()?;
    Ok(())
}
