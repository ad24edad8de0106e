use clap::Parser;

mod args;
mod deck;
mod logging;
mod tresette;
use self::args::Args;
use self::tresette::cli_main;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init(&args.log_level);
    let config = args.table_config()?;
    cli_main(config, args.frontend())
}
