use crate::error::KemonoDlError;
use clap::{ArgAction, Parser};
use std::fs::{File, OpenOptions};
use std::io::{self, IsTerminal};
use std::path::Path;
use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub urls: Vec<String>,
    pub config_path: Option<String>,
    pub output_dir: Option<String>,
    pub threads: Option<usize>,
    pub max_attempts: Option<u32>,
    pub overwrite: bool,
    pub log_file: Option<String>,
}

pub struct Args {
    pub command: Command,
    pub log_level: Level,
}

#[derive(Debug, Parser)]
#[command(
    name = "kemono-dl",
    version,
    about = "Download the files attached to Kemono posts"
)]
struct Cli {
    #[arg(
        short = 'v',
        long = "verbose",
        help = "Sets the level of verbosity",
        action = ArgAction::Count
    )]
    verbose: u8,

    #[arg(
        short = 't',
        long = "threads",
        value_name = "THREADS",
        help = "Number of files downloaded concurrently [default: 4]"
    )]
    threads: Option<usize>,

    #[arg(
        short = 'o',
        long = "output-dir",
        value_name = "DIR",
        help = "Directory the posts are saved under [default: downloads]"
    )]
    output_dir: Option<String>,

    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Optional config file (YAML, TOML or JSON)"
    )]
    config: Option<String>,

    #[arg(
        long = "max-attempts",
        value_name = "N",
        help = "Maximum attempts per HTTP request, including the first [default: 5]"
    )]
    max_attempts: Option<u32>,

    #[arg(
        long = "overwrite",
        help = "Download files again even if they already exist"
    )]
    overwrite: bool,

    #[arg(
        long = "log-file",
        value_name = "FILE",
        help = "Also append log records to this file"
    )]
    log_file: Option<String>,

    #[arg(value_name = "URLS", required = true, help = "Post URLs to download")]
    urls: Vec<String>,
}

impl From<Cli> for Args {
    fn from(cli: Cli) -> Self {
        let log_level = match cli.verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        };

        Args {
            command: Command {
                urls: cli.urls,
                config_path: cli.config,
                output_dir: cli.output_dir,
                threads: cli.threads,
                max_attempts: cli.max_attempts,
                overwrite: cli.overwrite,
                log_file: cli.log_file,
            },
            log_level,
        }
    }
}

pub fn parse_args() -> Args {
    Args::from(Cli::parse())
}

/// Logs go to stderr so stdout only carries the run summary. With a log file,
/// every record is also appended to it through a background writer; keep the
/// returned guard alive until the run ends so buffered records get flushed.
pub fn init_tracing(
    log_level: Level,
    log_file: Option<&Path>,
) -> Result<Option<WorkerGuard>, KemonoDlError> {
    let mut filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();
    for directive in ["hyper=warn", "hyper_util=warn", "reqwest=warn"] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let (writer, guard) = log_file_writer(path)?;
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(io::stderr().is_terminal()),
        )
        .with(file_layer)
        .init();

    Ok(guard)
}

fn log_file_writer(path: &Path) -> Result<(NonBlocking, WorkerGuard), KemonoDlError> {
    let file = open_log_file(path).map_err(|source| KemonoDlError::LogFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(tracing_appender::non_blocking(file))
}

/// Opens `path` for appending, creating it and its parent directories.
fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
