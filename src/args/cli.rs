use std::net::SocketAddr;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use super::defaults::DEFAULT_LISTEN_ADDR;
use super::parsers::{parse_duration_arg, parse_listen_addr, parse_positive_u64};
use super::types::PositiveU64;

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Bandwidth load tester: serve synthetic payloads, or drive bounded-concurrency load against them and report throughput."
)]
pub struct BenchArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Enable debug logging, including one line per request outcome
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Disable ANSI colors in log output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Start the payload server
    Serve(ServeArgs),
    /// Run a load test against a payload server
    Run(RunArgs),
}

#[derive(Debug, Args, Clone)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, short = 'l', default_value = DEFAULT_LISTEN_ADDR, value_parser = parse_listen_addr)]
    pub listen: SocketAddr,

    /// Largest payload the server will generate, in bytes (default 100 MiB)
    #[arg(long = "max-payload", value_parser = parse_positive_u64)]
    pub max_payload: Option<PositiveU64>,
}

/// Run settings as given on the command line. Every field is optional so
/// config file values can fill the gaps; validation happens once the two
/// sources are merged.
#[derive(Debug, Args, Clone, Default)]
pub struct RunArgs {
    /// Path to a .toml or .json config file
    #[arg(long)]
    pub config: Option<String>,

    /// Base URL of the payload server
    #[arg(long, short = 'u')]
    pub url: Option<String>,

    /// Maximum number of requests in flight at once
    #[arg(long, short = 'c')]
    pub concurrency: Option<u64>,

    /// Total number of requests to issue (count mode)
    #[arg(long, short = 'n')]
    pub requests: Option<u64>,

    /// Test duration (duration mode, supports ms/s/m/h); wins over --requests
    #[arg(long, short = 'd', value_parser = parse_duration_arg)]
    pub duration: Option<Duration>,

    /// Payload size requested from the server, in bytes
    #[arg(long, short = 's')]
    pub size: Option<u64>,

    /// Per-request timeout (supports ms/s/m/h)
    #[arg(long, value_parser = parse_duration_arg)]
    pub timeout: Option<Duration>,

    /// Connection timeout (supports ms/s/m/h)
    #[arg(long = "connect-timeout", value_parser = parse_duration_arg)]
    pub connect_timeout: Option<Duration>,

    /// Write a key=value report to this path
    #[arg(long, short = 'o')]
    pub output: Option<String>,

    /// Reset server statistics before the run
    #[arg(long = "reset-stats")]
    pub reset_stats: bool,
}
