use clap::Parser;
use filefold::cli::{Cli, run_cli};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run_cli(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
