mod cli;

use clap::Parser;
use cli::Cli;
use reissue_engine::error::Error;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = cli::run(cli) {
        eprintln!("Error: {}", e);
        let code = match e {
            Error::Config(_) => 2,
            Error::Scenario(_) | Error::Io(_) => 1,
        };
        std::process::exit(code);
    }
}
