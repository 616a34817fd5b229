//! timeaudit - Audit time-tracking exports.
//!
//! Usage:
//!   timeaudit                 Audit ./report.csv with defaults
//!   timeaudit run [FILE]      Audit an export and print the findings
//!   timeaudit serve           Serve the audit over HTTP
//!   timeaudit sweep           Delete expired report run directories
//!   timeaudit --help          Show help

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, eyre};
use tracing_subscriber::EnvFilter;

use timeaudit_analyze::TimeAuditor;
use timeaudit_core::{
    AuditConfig, AuditResult, DEFAULT_BIG_TASK_HOURS, DEFAULT_OUTPUT_DIR, DEFAULT_RETENTION_HOURS,
};
use timeaudit_report::{ReportWriter, to_pretty_json};
use timeaudit_server::ServerConfig;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "TIMEAUDIT_LOG";

/// Where the detailed report CSV can be exported from.
const EXPORT_HINT_URL: &str = "https://app.clockify.me/reports/detailed";

#[derive(Parser)]
#[command(
    name = "timeaudit",
    version,
    about = "Audit time-tracking exports",
    long_about = "timeaudit checks a detailed time-tracking export for overlapping \
                  entries, suspiciously short or long tasks, and rolls time up per \
                  user, day and description.\n\n\
                  Run without a subcommand to audit ./report.csv."
)]
struct Cli {
    /// Enable debug logging (overridden by TIMEAUDIT_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Audit an export and print the findings
    Run(RunArgs),

    /// Serve the audit over HTTP
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// Base directory for report run directories
        #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
        output: PathBuf,

        /// Delete run directories older than this many hours
        #[arg(long, default_value_t = DEFAULT_RETENTION_HOURS)]
        retention_hours: u32,
    },

    /// Delete expired report run directories
    Sweep {
        /// Base directory for report run directories
        #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
        output: PathBuf,

        /// Delete run directories older than this many hours
        #[arg(long, default_value_t = DEFAULT_RETENTION_HOURS)]
        retention_hours: u32,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Export to audit
    #[arg(default_value = "report.csv")]
    file: PathBuf,

    /// Tasks longer than this many hours are reported as big
    #[arg(short, long, default_value_t = DEFAULT_BIG_TASK_HOURS)]
    big_task_hours: f64,

    /// Base directory for report run directories
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    output: PathBuf,

    /// Do not write per-user report files
    #[arg(long)]
    no_write: bool,

    /// Delete run directories older than this many hours
    #[arg(long, default_value_t = DEFAULT_RETENTION_HOURS)]
    retention_hours: u32,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            file: PathBuf::from("report.csv"),
            big_task_hours: DEFAULT_BIG_TASK_HOURS,
            output: PathBuf::from(DEFAULT_OUTPUT_DIR),
            no_write: false,
            retention_hours: DEFAULT_RETENTION_HOURS,
            format: OutputFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    match cli.command {
        Some(Command::Run(args)) => run_audit(args)?,
        Some(Command::Serve {
            host,
            port,
            output,
            retention_hours,
        }) => {
            run_server(ServerConfig {
                host,
                port,
                output_dir: output,
                retention_hours,
            })?;
        }
        Some(Command::Sweep {
            output,
            retention_hours,
            format,
        }) => {
            run_sweep(&output, retention_hours, format)?;
        }
        None => run_audit(RunArgs::default())?,
    }

    Ok(())
}

/// Install the tracing subscriber, writing to stderr.
fn init_tracing(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| eyre!("failed to initialize tracing subscriber: {error}"))
}

/// Audit one export and print the findings.
fn run_audit(args: RunArgs) -> Result<()> {
    if !args.file.exists() {
        println!("The {} file is needed.", args.file.display());
        println!("You can export it from {EXPORT_HINT_URL}");
        return Ok(());
    }

    let bytes = std::fs::read(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let config = AuditConfig::builder()
        .big_task_hours(args.big_task_hours)
        .output_dir(args.output.clone())
        .write_reports(!args.no_write)
        .retention_hours(args.retention_hours)
        .build()
        .context("Invalid configuration")?;
    tracing::debug!(?config, "audit configuration");

    eprintln!("Auditing {}...", args.file.display());

    let result = TimeAuditor::new(config)
        .run_bytes(&bytes)
        .with_context(|| format!("Audit of {} failed", args.file.display()))?;

    match args.format {
        OutputFormat::Text => print_findings(&result, &args.output)?,
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
    }

    Ok(())
}

/// Print the audit sections as indented JSON blocks.
fn print_findings(result: &AuditResult, output: &Path) -> Result<()> {
    println!("Overlap per user");
    println!("{}", to_pretty_json(&result.overlap_per_user)?);

    println!("Time stats");
    println!("{}", to_pretty_json(&result.time_stats)?);

    println!("Very small tasks per user (duration < 0.01)");
    println!("{}", to_pretty_json(&result.small_tasks_per_user)?);

    println!(
        "Very big tasks per user (duration > {} hours)",
        result.big_task_hours
    );
    println!("{}", to_pretty_json(&result.big_tasks_per_user)?);

    match &result.run_dir {
        Some(run_dir) => println!(
            "{} per-user report(s) written to {}",
            result.report_files.len(),
            output.join(run_dir).display()
        ),
        None => println!("Per-user reports were not written."),
    }

    Ok(())
}

/// Serve the audit over HTTP until interrupted.
fn run_server(config: ServerConfig) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime
        .block_on(timeaudit_server::serve(config))
        .context("Server failed")
}

/// Run a retention sweep on its own.
fn run_sweep(output: &Path, retention_hours: u32, format: OutputFormat) -> Result<()> {
    let report = ReportWriter::new(output)
        .sweep_expired(retention_hours)
        .with_context(|| format!("Sweep of {} failed", output.display()))?;

    match format {
        OutputFormat::Text => {
            println!(
                "Removed {} expired run director{} from {}",
                report.removed.len(),
                if report.removed.len() == 1 { "y" } else { "ies" },
                output.display()
            );
            for name in &report.removed {
                println!("   {name}");
            }
            if !report.failed.is_empty() {
                println!("Could not remove {} expired run directories:", report.failed.len());
                for name in &report.failed {
                    println!("   {name}");
                }
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}
