//! fragscan - load fragfiles and decompose in-game messages.
//!
//! Usage:
//!   fragscan check <FRAGFILE>
//!   fragscan scan <FRAGFILE> [INPUT] [--json] [--flags]
//!   fragscan dump <FRAGFILE>
//!   fragscan config
//!
//! Logs go to the file named by FRAGSCAN_LOG_PATH, then the `log_file`
//! config setting, then stderr.

mod commands;

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

use clap::{Parser, Subcommand};
use fragscan_types::{LoadPolicy, ScanConfig};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

const APP_NAME: &str = "fragscan";

#[derive(Parser)]
#[command(version, about = "Fragfile loader and message matcher")]
struct Cli {
    /// Warn about and skip bad fragfile lines instead of failing
    #[arg(long, global = true, conflicts_with = "strict")]
    lenient: bool,

    /// Fail on the first bad fragfile line, whatever the config says
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a fragfile and summarize its contents
    Check { fragfile: PathBuf },
    /// Match messages, one per line, from INPUT or stdin
    Scan {
        fragfile: PathBuf,
        input: Option<PathBuf>,
        /// Print matches as JSON lines
        #[arg(long)]
        json: bool,
        /// Also match flag-alert templates
        #[arg(long)]
        flags: bool,
    },
    /// Print the loaded fragfile as JSON
    Dump { fragfile: PathBuf },
    /// Show the config file location and current settings
    Config,
}

/// Route tracing output to `log_file` when it can be opened, stderr otherwise
fn init_logging(log_file: Option<&Path>) {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    let opened = log_file.map(|path| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| (path, e))
    });

    let (writer, ansi, open_error) = match opened {
        Some(Ok(file)) => (BoxMakeWriter::new(Mutex::new(file)), false, None),
        Some(Err(err)) => (BoxMakeWriter::new(std::io::stderr), true, Some(err)),
        None => (BoxMakeWriter::new(std::io::stderr), true, None),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(ansi)
        .with_writer(writer)
        .init();

    if let Some((path, error)) = open_error {
        tracing::warn!(path = %path.display(), %error, "Failed to open log file, logging to stderr");
    }
}

fn load_config() -> Result<ScanConfig, confy::ConfyError> {
    confy::load(APP_NAME, None)
}

fn select_policy(cli: &Cli, config: &ScanConfig) -> LoadPolicy {
    if cli.strict {
        LoadPolicy::strict()
    } else if cli.lenient {
        LoadPolicy::lenient()
    } else {
        config.load
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let loaded = load_config();

    let log_file = std::env::var_os("FRAGSCAN_LOG_PATH")
        .map(PathBuf::from)
        .or_else(|| loaded.as_ref().ok().and_then(|c| c.log_file.clone()));
    init_logging(log_file.as_deref());

    let config = loaded.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        ScanConfig::default()
    });
    let policy = select_policy(&cli, &config);

    let result = match cli.command {
        Commands::Check { fragfile } => commands::check(&fragfile, policy),
        Commands::Scan {
            fragfile,
            input,
            json,
            flags,
        } => commands::scan(
            &fragfile,
            input.as_deref(),
            policy,
            json || config.json_output,
            flags,
        ),
        Commands::Dump { fragfile } => commands::dump(&fragfile, policy),
        Commands::Config => commands::show_config(APP_NAME, &config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "Command failed");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_policy_flags_override_config() {
        let config = ScanConfig {
            load: LoadPolicy::lenient(),
            ..Default::default()
        };

        let cli = parse(&["fragscan", "check", "a.fragfile"]);
        assert_eq!(select_policy(&cli, &config), LoadPolicy::lenient());

        let cli = parse(&["fragscan", "--strict", "check", "a.fragfile"]);
        assert_eq!(select_policy(&cli, &config), LoadPolicy::strict());

        let cli = parse(&["fragscan", "dump", "a.fragfile", "--lenient"]);
        assert_eq!(select_policy(&cli, &ScanConfig::default()), LoadPolicy::lenient());
    }

    #[test]
    fn test_lenient_and_strict_conflict() {
        assert!(Cli::try_parse_from(["fragscan", "--lenient", "--strict", "config"]).is_err());
    }
}
