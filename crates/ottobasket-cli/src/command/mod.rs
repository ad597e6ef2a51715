use clap::{Parser, Subcommand};

use self::{sgp::SgpArg, value::ValueArg};

mod sgp;
mod value;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Value players and write the auction table
    Value(#[clap(flatten)] ValueArg),
    /// Fit an SGP bundle from league standings
    Sgp(#[clap(flatten)] SgpArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Value(arg) => value::run(&arg)?,
        Mode::Sgp(arg) => sgp::run(&arg)?,
    }
    Ok(())
}
