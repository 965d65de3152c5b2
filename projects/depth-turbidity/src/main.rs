use anyhow::Result;
use depth_turbidity::cli::{Args, Command};
use depth_turbidity::commands;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Load environment variables from .env if present
    dotenvy::dotenv().ok();

    // Logs go to stderr, stdout carries the exported series
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse_args();

    match args.command {
        Command::Profile(profile) => commands::profile(profile)?,
        Command::View(view) => commands::view(view)?,
    }

    Ok(())
}
