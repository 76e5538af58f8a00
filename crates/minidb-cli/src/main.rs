//! MiniDB Command-Line Interface
//!
//! An interactive shell over a directory of MiniDB tables.
//!
//! # Usage
//!
//! ```bash
//! # Start interactive REPL on ./db
//! minidb
//!
//! # Use another data directory
//! minidb -d /var/lib/minidb
//!
//! # Execute a single command
//! minidb -c "SELECT * FROM students WHERE age > 20"
//!
//! # Execute commands from a file
//! minidb -f setup.sql
//!
//! # Output as JSON
//! minidb -o json -c "SELECT * FROM students"
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod formatter;
mod repl;
mod session;

use config::CliConfig;
use formatter::OutputFormat;
use repl::Repl;
use session::Session;

/// MiniDB command-line interface
#[derive(Parser, Debug)]
#[command(
    name = "minidb",
    version,
    about = "Interactive shell for MiniDB",
    long_about = "An interactive shell for MiniDB, a small file-backed table store.\n\n\
                  Each table lives in one text file under the data directory. Commands\n\
                  can be typed at the prompt, passed with -c, or read from a file."
)]
struct Args {
    /// Directory holding the table files
    #[arg(short = 'd', long, value_name = "DIR", env = "MINIDB_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Execute a single command and exit
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// Execute commands from file and exit
    #[arg(short = 'f', long, value_name = "FILE")]
    file: Option<PathBuf>,

    /// Output format [default: from config, else plain]
    #[arg(short = 'o', long, value_enum)]
    output: Option<OutputFormatArg>,

    /// Load every table at startup
    #[arg(long)]
    eager_load: bool,

    /// Print execution time after each command
    #[arg(long)]
    timing: bool,

    /// Enable verbose output
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Suppress banner (for scripting)
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Configuration file path
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

/// Output format argument
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormatArg {
    /// Header line plus tab-separated rows
    Plain,
    /// Display results in a formatted table
    Table,
    /// Display results as JSON
    Json,
    /// Display results as CSV
    Csv,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Plain => OutputFormat::Plain,
            OutputFormatArg::Table => OutputFormat::Table,
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Csv => OutputFormat::Csv,
        }
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let args = Args::parse();

    init_logging(args.verbose);

    let config = load_config(&args)?;
    let format = match args.output {
        Some(arg) => arg.into(),
        None => config
            .output_format
            .parse::<OutputFormat>()
            .map_err(|e| anyhow!(e))?,
    };

    if let Some(command) = &args.command {
        execute_command(&config, command, format)
    } else if let Some(file) = &args.file {
        execute_file(&config, file, format)
    } else {
        run_repl(&config, format, args.quiet)?;
        Ok(ExitCode::SUCCESS)
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("minidb=debug,minidb_sql=debug")
    } else {
        EnvFilter::new("minidb=warn,minidb_sql=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn load_config(args: &Args) -> Result<CliConfig> {
    let mut config = if let Some(path) = &args.config {
        CliConfig::from_file(path)?
    } else {
        CliConfig::load_default()?
    };

    // Command line wins over the config file
    if let Some(dir) = &args.data_dir {
        config.data_dir = dir.clone();
    }
    config.eager_load |= args.eager_load;
    config.timing |= args.timing;

    Ok(config)
}

fn execute_command(config: &CliConfig, command: &str, format: OutputFormat) -> Result<ExitCode> {
    info!("Executing command: {}", command);

    let mut session = Session::open(config, format)?;
    if session::is_exit_command(command) || session.execute_and_print(command) {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn execute_file(config: &CliConfig, path: &Path, format: OutputFormat) -> Result<ExitCode> {
    info!("Executing file: {}", path.display());

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    let mut session = Session::open(config, format)?;

    let summary = session.execute_script(&content);
    info!(
        succeeded = summary.succeeded,
        failed = summary.failed,
        "script finished"
    );

    if summary.failed > 0 {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn run_repl(config: &CliConfig, format: OutputFormat, quiet: bool) -> Result<()> {
    let session = Session::open(config, format)?;
    let mut repl = Repl::new(session, config)?;

    if !quiet {
        repl.print_banner();
    }

    repl.run()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_config() {
        let args = Args::parse_from([
            "minidb",
            "--config",
            "/nonexistent/minidb.toml",
            "-d",
            "/tmp/x",
        ]);
        assert!(load_config(&args).is_err());

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("minidb.toml");
        std::fs::write(&path, "data_dir = \"/srv/db\"\noutput_format = \"csv\"\n").unwrap();

        let args = Args::parse_from([
            "minidb",
            "--config",
            path.to_str().unwrap(),
            "-d",
            "/tmp/x",
            "--eager-load",
        ]);
        let config = load_config(&args).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/x"));
        assert!(config.eager_load);
        assert_eq!(config.output_format, "csv");
    }

    #[test]
    fn test_output_arg() {
        let args = Args::parse_from(["minidb", "-o", "json", "-c", "SELECT * FROM t"]);
        assert!(matches!(args.output, Some(OutputFormatArg::Json)));
        assert_eq!(args.command.as_deref(), Some("SELECT * FROM t"));
    }
}
