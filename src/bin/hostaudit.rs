//! hostaudit - point-in-time host audit.
//!
//! Audits the local machine, or a remote one over SSH, and prints a text
//! report or JSON. With `--file` the JSON snapshot is written to disk together
//! with a Prometheus exposition file next to it.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use hostaudit::collector::{Collector, CommandRunner, LocalRunner, SshRunner};
use hostaudit::config::AuditConfig;
use hostaudit::error::Result;
use hostaudit::normalize::UnitBase;
use hostaudit::report;
use hostaudit::storage::{self, AuditSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Sectioned report for a terminal.
    Text,
    /// Pretty-printed JSON snapshot.
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Units {
    /// `G` means 1024^3 (what `df -h` and `free -h` print).
    Binary,
    /// `G` means 1000^3.
    Si,
}

impl From<Units> for UnitBase {
    fn from(units: Units) -> Self {
        match units {
            Units::Binary => UnitBase::Binary,
            Units::Si => UnitBase::Si,
        }
    }
}

/// Point-in-time host audit.
#[derive(Parser, Debug)]
#[command(name = "hostaudit", about = "Point-in-time host audit", version)]
struct Args {
    /// Output format on stdout.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Report processes using more than this % of CPU.
    #[arg(short, long, default_value_t = 5.0)]
    cpu_threshold: f64,

    /// Report processes using more than this % of memory.
    #[arg(short, long, default_value_t = 5.0)]
    memory_threshold: f64,

    /// Minimum network flux (sent + received, KB) for a program to be reported.
    #[arg(short, long, default_value_t = 2.0)]
    flux_min: f64,

    /// Network capture duration in seconds.
    #[arg(long, default_value_t = 3)]
    flux_duration: u64,

    /// Services to check, space separated (default: ssh cron docker).
    #[arg(short, long, value_delimiter = ' ', num_args = 1..)]
    services: Vec<String>,

    /// Write the JSON snapshot to this file and the metrics next to it (.prom).
    #[arg(short = 'p', long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// How K/M/G suffixes are converted in the metrics file.
    #[arg(long, value_enum, default_value_t = Units::Binary)]
    units: Units,

    /// Audit a remote host over SSH instead of this machine.
    #[arg(long)]
    remote: bool,

    /// Remote host.
    #[arg(long, env = "TARGET_HOST", default_value = "host.docker.internal")]
    host: String,

    /// Remote user.
    #[arg(long, env = "TARGET_USER", default_value = "root")]
    user: String,

    /// Private key for the remote host.
    #[arg(long, env = "SSH_KEY_PATH", value_name = "PATH")]
    key: Option<PathBuf>,

    /// Disable colors in the text report.
    #[arg(long)]
    no_color: bool,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn audit_config(&self) -> AuditConfig {
        AuditConfig {
            cpu_threshold: self.cpu_threshold,
            memory_threshold: self.memory_threshold,
            flux_min_kb: self.flux_min,
            flux_duration: Duration::from_secs(self.flux_duration),
            services: self.services.clone(),
            unit_base: self.units.into(),
            ..AuditConfig::default()
        }
    }

    fn runner(&self) -> Box<dyn CommandRunner> {
        if self.remote {
            let mut ssh = SshRunner::new(&self.host, &self.user);
            if let Some(ref key) = self.key {
                ssh = ssh.with_identity_file(key);
            }
            Box::new(ssh)
        } else {
            Box::new(LocalRunner::new())
        }
    }
}

/// Initializes the tracing subscriber with the appropriate log level.
/// Logs go to stderr so JSON on stdout stays parseable.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("hostaudit={}", level).parse() {
        filter = filter.add_directive(directive);
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Describes the contents of a snapshot for logging.
fn describe_snapshot(snapshot: &AuditSnapshot) -> String {
    format!(
        "{}: {} interfaces, {} partitions, {} busy processes, {} flux rows, {} services",
        snapshot.hostname(),
        snapshot.interfaces.len(),
        snapshot.partitions.len(),
        snapshot.processes.cpu_rows().len() + snapshot.processes.memory_rows().len(),
        snapshot.flux.len(),
        snapshot.services.len()
    )
}

fn run(args: &Args) -> Result<()> {
    let config = args.audit_config();
    let base = config.unit_base;
    let mut collector = Collector::new(args.runner(), config);
    info!("auditing {}", collector.runner().describe());

    match collector.is_privileged() {
        Some(false) => warn!("not running as root: nethogs needs root, network flux may be empty"),
        None => debug!("could not determine effective uid"),
        Some(true) => {}
    }

    let snapshot = collector.collect_snapshot();
    info!("collected {}", describe_snapshot(&snapshot));

    if let Some(ref path) = args.file {
        let prom_path = storage::export(path, &snapshot, base)?;
        info!("JSON snapshot written to {}", path.display());
        info!("Prometheus metrics written to {}", prom_path.display());
    }

    match args.output {
        OutputFormat::Text => {
            let color = !args.no_color && std::io::stdout().is_terminal();
            print!("{}", report::render_text(&snapshot, color));
        }
        OutputFormat::Json if args.file.is_none() => {
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        OutputFormat::Json => {}
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    if let Err(e) = run(&args) {
        error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

    #[test]
    fn parses_defaults() {
        let args = Args::try_parse_from(["hostaudit"]).unwrap();
        assert_eq!(args.output, OutputFormat::Text);
        assert!(!args.remote);

        let config = args.audit_config();
        assert_eq!(config, AuditConfig::default());
    }

    #[test]
    fn parses_thresholds_and_services() {
        let args = Args::try_parse_from([
            "hostaudit", "-o", "json", "-c", "10", "-m", "2.5", "-f", "4", "-s", "nginx postgresql",
            "-p", "/tmp/audit.json", "--units", "si",
        ])
        .unwrap();

        assert_eq!(args.output, OutputFormat::Json);
        assert_eq!(args.file, Some(PathBuf::from("/tmp/audit.json")));

        let config = args.audit_config();
        assert_eq!(config.cpu_threshold, 10.0);
        assert_eq!(config.memory_threshold, 2.5);
        assert_eq!(config.flux_min_kb, 4.0);
        assert_eq!(config.services, vec!["nginx", "postgresql"]);
        assert_eq!(config.unit_base, UnitBase::Si);
    }

    #[test]
    fn remote_mode_uses_ssh() {
        let args = Args::try_parse_from([
            "hostaudit", "--remote", "--host", "db-01", "--user", "audit", "--key", "/keys/id",
        ])
        .unwrap();
        assert_eq!(args.runner().describe(), "ssh audit@db-01");

        let local = Args::try_parse_from(["hostaudit"]).unwrap();
        assert_eq!(local.runner().describe(), "local");
    }

    #[test]
    fn rejects_unknown_format() {
        assert!(Args::try_parse_from(["hostaudit", "-o", "yaml"]).is_err());
    }

    #[test]
    fn describe_snapshot_counts_sections() {
        let mut snapshot = AuditSnapshot::empty(Local::now());
        snapshot.processes.cpu = vec!["PID ...".to_string(), "1 root x 9.0 0.1".to_string()];
        let desc = describe_snapshot(&snapshot);
        assert!(desc.starts_with("unknown:"));
        assert!(desc.contains("1 busy processes"));
        assert!(desc.contains("0 services"));
    }
}
