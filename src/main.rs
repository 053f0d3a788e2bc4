use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod error;
mod git;
mod mapping;
mod output;
mod resolve;
mod tag;
mod workflow;

fn main() -> Result<()> {
    let args = cli::RootArgs::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .init();

    workflow::run(args)
}
