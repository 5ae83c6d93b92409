//! devsweep CLI - Clean up leftover dev-server processes
//!
//! Runs the whole cleanup campaign and exits. No arguments are needed;
//! the flags only add output formats and the optional lock-file cleanup.

mod commands;
mod console;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "devsweep")]
#[command(author, version, about = "Kill leftover dev-server processes and free their ports")]
struct Cli {
    /// Also delete package-manager lock files and caches in the current directory
    #[arg(long)]
    clean_locks: bool,

    /// Output the final report in JSON format
    #[arg(long)]
    json: bool,

    /// Show debug diagnostics on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("devsweep=debug,devsweep_core=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Faults should carry a trace; respect an explicit setting
    if std::env::var_os("RUST_LIB_BACKTRACE").is_none() {
        std::env::set_var("RUST_LIB_BACKTRACE", "1");
    }
    console::install_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = commands::sweep::SweepOptions {
        json: cli.json,
        clean_locks: cli.clean_locks,
    };

    tokio::select! {
        result = commands::sweep::run(options) => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                console::fault(&e);
                ExitCode::FAILURE
            }
        },
        Ok(()) = tokio::signal::ctrl_c() => {
            console::cancelled();
            ExitCode::FAILURE
        }
    }
}
