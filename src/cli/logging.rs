//! Logging setup for the CLI
//!
//! Log lines go to stderr at `info` (or `debug` with `--verbose`, or whatever
//! `RUST_LOG` says) and, unless disabled, to a dated file under
//! `<output_dir>/logs/` at `debug` so a run can be reviewed afterwards.

use anyhow::{Context, Result};
use env_logger::{Builder, Env, Logger, Target};
use log::{LevelFilter, Log, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Forwards each record to the console logger and the optional file logger,
/// each applying its own filter
struct DualLogger {
    console: Logger,
    file: Option<Logger>,
}

impl DualLogger {
    fn max_level(&self) -> LevelFilter {
        let file = self.file.as_ref().map_or(LevelFilter::Off, Logger::filter);
        self.console.filter().max(file)
    }
}

impl Log for DualLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.console.enabled(metadata) || self.file.as_ref().is_some_and(|f| f.enabled(metadata))
    }

    fn log(&self, record: &Record) {
        self.console.log(record);
        if let Some(file) = &self.file {
            file.log(record);
        }
    }

    fn flush(&self) {
        self.console.flush();
        if let Some(file) = &self.file {
            file.flush();
        }
    }
}

fn file_logger(file: File) -> Logger {
    Builder::new()
        .filter_level(LevelFilter::Debug)
        .target(Target::Pipe(Box::new(file)))
        .build()
}

/// Path of today's log file under `output_dir`
pub fn log_file_path(output_dir: &Path) -> PathBuf {
    let name = chrono::Local::now()
        .format("stitch_%Y_%m_%d.log")
        .to_string();
    output_dir.join("logs").join(name)
}

/// Initialize logging; `RUST_LOG` takes precedence over `verbose` on the console
pub fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let file = match log_file {
        Some(path) => {
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(file_logger(file))
        }
        None => None,
    };

    let default_level = if verbose { "debug" } else { "info" };
    let console = Builder::from_env(Env::default().default_filter_or(default_level))
        .target(Target::Stderr)
        .build();

    let logger = DualLogger { console, file };
    let max_level = logger.max_level();
    log::set_boxed_logger(Box::new(logger)).context("Logger already initialized")?;
    log::set_max_level(max_level);
    Ok(())
}
