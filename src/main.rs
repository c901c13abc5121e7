use std::io::{self, Read};

use anyhow::{Context, Result};
use chipsim::{session, Script, SessionOptions};
use clap::Parser;
use tracing_subscriber::EnvFilter;

// Arithmetic chip circuit simulator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// circuit description file (reads stdin when omitted)
    input: Option<String>,

    /// abort on the first command referring to a bad chip
    #[arg(long)]
    strict: bool,

    /// increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .compact()
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let content = match &args.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("could not read file `{path}`"))?,
        None => {
            let mut content = String::new();
            io::stdin()
                .read_to_string(&mut content)
                .context("could not read stdin")?;
            content
        }
    };

    let script = Script::<f64>::parse(&content).context("malformed circuit description")?;
    let options = SessionOptions {
        strict: args.strict,
    };
    let stdout = io::stdout();
    session::run(&script, options, &mut stdout.lock())?;
    Ok(())
}
