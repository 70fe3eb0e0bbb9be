#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the platewatch API server.
//!
//! ```text
//! platewatch_server [--simulator]
//! platewatch_server --interactive
//! ```
//!
//! Without flags the server reads its configuration from environment
//! variables; `--interactive` prompts for it instead.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "platewatch_server",
    about = "Vehicle sighting tracking API server"
)]
struct Cli {
    /// Prompt for configuration instead of reading environment variables
    #[arg(long)]
    interactive: bool,

    /// Run the background ANPR feed simulator
    #[arg(long)]
    simulator: bool,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let cli = Cli::parse();

    if cli.interactive {
        return platewatch_server::interactive::run().await;
    }

    if cli.simulator {
        // SAFETY: We are single-threaded at this point (before server starts)
        // and the variable is only read once during server initialisation.
        unsafe {
            std::env::set_var("SIMULATOR", "true");
        }
    }

    platewatch_server::run_server().await
}
