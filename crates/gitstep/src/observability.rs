//! Structured logging to a JSONL file.
//!
//! Nothing in this module writes to stdout. Prompts and command output own
//! the terminal; log records go to a daily-rolled file, or to stderr when no
//! writable location exists.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const ENV_LOG_PATH: &str = "GITSTEP_LOG_PATH";
const ENV_LOG_DIR: &str = "GITSTEP_LOG_DIR";
const LOG_FILE_SUFFIX: &str = ".jsonl";

/// Where and under what name logs are written.
#[derive(Clone, Debug)]
pub struct ObservabilityConfig {
    /// Service name; also the log file stem.
    pub service: String,
    /// Log directory from config, used when no env override is set.
    pub log_dir: Option<PathBuf>,
}

impl ObservabilityConfig {
    /// Config for this binary with an optional configured log directory.
    pub fn from_env_with_overrides(log_dir: Option<PathBuf>) -> Self {
        Self {
            service: env!("CARGO_PKG_NAME").to_string(),
            log_dir,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct LogTarget {
    dir: PathBuf,
    file_name: String,
}

/// Keeps the background log writer alive. Drop it last.
pub struct ObservabilityGuard {
    _log_guard: WorkerGuard,
}

/// Install the global subscriber.
pub fn init_observability(
    cfg: &ObservabilityConfig,
    env_filter: EnvFilter,
) -> Result<ObservabilityGuard> {
    let (writer, guard) = build_log_writer(&cfg.service, cfg.log_dir.as_deref())
        .unwrap_or_else(|err| {
            eprintln!("Warning: {err}. Falling back to stderr logging.");
            tracing_appender::non_blocking(std::io::stderr())
        });

    let log_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_ansi(false)
        .with_current_span(true)
        .with_span_list(false)
        .with_writer(writer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(log_layer)
        .try_init()?;

    tracing::debug!("observability initialized");
    Ok(ObservabilityGuard { _log_guard: guard })
}

/// Build the log filter.
///
/// Priority: `--quiet` > `-v`/`-vv` > `RUST_LOG` > configured level.
pub fn env_filter(quiet: bool, verbose: u8, default_level: &str) -> EnvFilter {
    if quiet {
        return EnvFilter::new("error");
    }
    match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    }
}

fn build_log_writer(
    service: &str,
    config_log_dir: Option<&Path>,
) -> Result<(NonBlocking, WorkerGuard), String> {
    let target = resolve_log_target_with(
        service,
        std::env::var_os(ENV_LOG_PATH).map(PathBuf::from),
        std::env::var_os(ENV_LOG_DIR).map(PathBuf::from),
        config_log_dir.map(Path::to_path_buf),
    )?;
    let appender = tracing_appender::rolling::daily(&target.dir, &target.file_name);
    Ok(tracing_appender::non_blocking(appender))
}

/// `GITSTEP_LOG_PATH` > `GITSTEP_LOG_DIR` > config > data dir > cwd.
fn resolve_log_target_with(
    service: &str,
    path_override: Option<PathBuf>,
    dir_override: Option<PathBuf>,
    config_dir: Option<PathBuf>,
) -> Result<LogTarget, String> {
    if let Some(path) = path_override {
        return log_target_from_path(&path);
    }
    if let Some(dir) = dir_override.or(config_dir) {
        return log_target_from_dir(dir, service);
    }

    let file_name = format!("{service}{LOG_FILE_SUFFIX}");
    let data_dir = directories::ProjectDirs::from("", "", service)
        .map(|dirs| dirs.data_local_dir().join("logs"));
    data_dir
        .into_iter()
        .chain(std::env::current_dir().ok())
        .find(|dir| ensure_writable(dir, &file_name).is_ok())
        .map(|dir| LogTarget { dir, file_name })
        .ok_or_else(|| "no writable log directory found".to_string())
}

fn log_target_from_dir(dir: PathBuf, service: &str) -> Result<LogTarget, String> {
    let file_name = format!("{service}{LOG_FILE_SUFFIX}");
    ensure_writable(&dir, &file_name)?;
    Ok(LogTarget { dir, file_name })
}

fn log_target_from_path(path: &Path) -> Result<LogTarget, String> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .map(ToString::to_string)
        .ok_or_else(|| format!("{ENV_LOG_PATH} must end in a UTF-8 file name"))?;
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    ensure_writable(dir, &file_name)?;
    Ok(LogTarget {
        dir: dir.to_path_buf(),
        file_name,
    })
}

fn ensure_writable(dir: &Path, file_name: &str) -> Result<(), String> {
    std::fs::create_dir_all(dir)
        .map_err(|e| format!("failed to create log directory {}: {e}", dir.display()))?;
    let path = dir.join(file_name);
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| format!("failed to open log file {}: {e}", path.display()))?;
    Ok(())
}
