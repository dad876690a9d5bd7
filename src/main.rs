use clap::Parser;
use stagwatch::cli::{run, Cli};
use stagwatch::logging::init_logging;

fn main() -> std::process::ExitCode {
    init_logging();
    run(Cli::parse())
}
