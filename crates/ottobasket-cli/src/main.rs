// Ottobasket command-line entry point.
//
// Initializes tracing on stderr (stdout may carry the valued table), then
// dispatches to the requested subcommand.

mod command;

use anyhow::Context;
use std::io::IsTerminal;

fn main() -> anyhow::Result<()> {
    init_tracing()?;
    command::run()
}

fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ottobasket=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
