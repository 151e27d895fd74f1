use clap::Parser;

use crate::app::{ServeOptions, execute_run, execute_serve};
use crate::args::{BenchArgs, Command};
use crate::error::AppResult;

/// Binary entry point: parse arguments, install logging, and run the chosen
/// subcommand on a multi-threaded runtime.
///
/// # Errors
///
/// Returns an error when the runtime cannot be built or the subcommand fails.
pub fn run() -> AppResult<()> {
    let args = BenchArgs::parse();

    crate::logger::init_logging(args.verbose, args.no_color);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(args))
}

async fn run_async(args: BenchArgs) -> AppResult<()> {
    match args.command {
        Command::Serve(serve_args) => execute_serve(ServeOptions::from(&serve_args)).await,
        Command::Run(run_args) => execute_run(&run_args).await,
    }
}
