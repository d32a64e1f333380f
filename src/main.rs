//! graphql-http-handler entry point
//!
//! Installs logging, then delegates to the CLI module. Errors are printed
//! to stderr with a non-zero exit.

use graphql_http_handler::{cli, observability};

fn main() {
    observability::init_logging();

    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
