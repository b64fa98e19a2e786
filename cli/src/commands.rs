pub mod scan;
pub mod services;

use std::sync::Arc;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use probr_common::config::{DEFAULT_CONCURRENCY, ScanConfig};
use probr_common::network::ports::ScanMode;
use probr_core::probe::{ProbeBackend, StubBackend, TcpConnectBackend};

#[derive(Parser)]
#[command(name = "probr")]
#[command(version, about = "A concurrent TCP reachability prober.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Less output (-q drops decoration, -qq prints the summary only)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub quiet: u8,

    /// Skip the start-up banner
    #[arg(long, global = true)]
    pub no_banner: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Probe the ports of a single host
    #[command(alias = "s")]
    Scan(ScanArgs),
    /// List the ports probed in common mode
    #[command(alias = "ls")]
    Services,
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// IPv4 address or hostname to probe
    pub target: String,

    /// Which ports to probe
    #[arg(short, long, value_enum, default_value_t = ModeArg::Common)]
    pub mode: ModeArg,

    /// First port of the range (range mode)
    #[arg(long, allow_negative_numbers = true)]
    pub start: Option<i64>,

    /// Last port of the range, inclusive (range mode)
    #[arg(long, allow_negative_numbers = true)]
    pub end: Option<i64>,

    /// Probes in flight at once
    #[arg(short, long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Per-probe timeout in milliseconds
    #[arg(short, long = "timeout-ms", default_value_t = 1_000)]
    pub timeout_ms: u64,

    /// How ports are probed
    #[arg(short, long, value_enum, default_value_t = BackendArg::Tcp)]
    pub backend: BackendArg,

    /// Seed for the stub backend
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Print the report as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Only list open ports in the table
    #[arg(long)]
    pub open_only: bool,

    /// Program that turns open ports into advisory findings
    #[arg(long, value_name = "PROGRAM")]
    pub advisor_cmd: Option<String>,

    /// Argument passed to the advisor program (repeatable)
    #[arg(long = "advisor-arg", value_name = "ARG", requires = "advisor_cmd")]
    pub advisor_args: Vec<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Common,
    Range,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    /// Real TCP connect attempts
    Tcp,
    /// Deterministic simulation, no traffic
    Stub,
}

impl From<ModeArg> for ScanMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Common => ScanMode::Common,
            ModeArg::Range => ScanMode::Range,
        }
    }
}

impl ScanArgs {
    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            concurrency: self.concurrency,
            probe_timeout: Duration::from_millis(self.timeout_ms),
        }
    }

    pub fn backend(&self) -> Arc<dyn ProbeBackend> {
        match self.backend {
            BackendArg::Tcp => Arc::new(TcpConnectBackend),
            BackendArg::Stub => Arc::new(StubBackend::new(self.seed)),
        }
    }
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
