use depot_core::{logging, storage};

mod cli;

use crate::cli::CliCommand;

fn main() {
    // Fall back to stderr when the state dir is not writable.
    if logging::init_logging().is_err() {
        logging::init_logging_stderr();
    }

    let result = CliCommand::run_from_args();
    storage::sweep_pending();

    if let Err(err) = result {
        eprintln!("depot error: {:#}", err);
        std::process::exit(1);
    }
}
