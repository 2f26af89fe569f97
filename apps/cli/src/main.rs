//! Advisor CLI: profile-aware fundraising and community advice from the
//! terminal.
//!
//! Every subcommand runs one agent kind against the configured
//! chat-completion service.

mod commands;
mod profile;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
