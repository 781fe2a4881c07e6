use log::LevelFilter;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::append::rolling_file::policy::compound::{
    CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
};
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::errors::FilterError;
use crate::utils::devlog::DEV_TARGET;

pub const AUDIT_TARGET: &str = "filterkit::audit";

const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {t} - {m}{n}";
const ROLL_SIZE: u64 = 10 * 1024 * 1024;
const DEFAULT_RETENTION: u32 = 7;

static HANDLE: OnceLock<log4rs::Handle> = OnceLock::new();

/// Initializes logging from a log4rs YAML file.
///
/// # Errors
/// Returns `Config` if the file cannot be loaded or a logger is already installed.
pub fn init_path(path: &Path) -> Result<(), FilterError> {
    log4rs::init_file(path, log4rs::config::Deserializers::default())
        .map_err(|e| FilterError::Config(format!("log config {}: {e}", path.display())))
}

/// Maps a level name to a filter; unknown names fall back to `info`.
#[must_use]
pub fn parse_level(level: Option<&str>) -> LevelFilter {
    match level.unwrap_or("info").to_ascii_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

fn rolling(base: &Path, stem: &str, keep: u32) -> Result<RollingFileAppender, FilterError> {
    let roller = FixedWindowRoller::builder()
        .build(&format!("{}", base.join(format!("{stem}.{{}}.log")).display()), keep)
        .map_err(|e| FilterError::Config(e.to_string()))?;
    let policy = CompoundPolicy::new(Box::new(SizeTrigger::new(ROLL_SIZE)), Box::new(roller));
    RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build(base.join(format!("{stem}.log")), Box::new(policy))
        .map_err(FilterError::from)
}

/// Installs rolling `app.log` and `audit.log` files under `dir` (current directory if `None`).
///
/// Calling it again swaps the configuration of the already installed logger.
///
/// # Errors
/// Returns an error if the directory or appenders cannot be created, or if a
/// different logger implementation already owns the `log` facade.
pub fn configure_logging(dir: Option<&Path>, level: Option<&str>, retention: Option<usize>) -> Result<(), FilterError> {
    configure_logging_with_dev(dir, level, retention, false)
}

/// Same as [`configure_logging`]; with `enable_dev` the `devlog!` lines are also
/// persisted to `dev.log`.
///
/// # Errors
/// See [`configure_logging`].
pub fn configure_logging_with_dev(
    dir: Option<&Path>,
    level: Option<&str>,
    retention: Option<usize>,
    enable_dev: bool,
) -> Result<(), FilterError> {
    let base = match dir {
        Some(d) => PathBuf::from(d),
        None => std::env::current_dir()?,
    };
    std::fs::create_dir_all(&base)?;
    let keep = retention.and_then(|r| u32::try_from(r).ok()).unwrap_or(DEFAULT_RETENTION);
    let lvl = parse_level(level);

    let mut builder = Config::builder()
        .appender(Appender::builder().build("app", Box::new(rolling(&base, "app", keep)?)))
        .appender(Appender::builder().build("audit", Box::new(rolling(&base, "audit", keep)?)))
        .logger(Logger::builder().appender("audit").additive(false).build(AUDIT_TARGET, lvl));
    if enable_dev {
        builder = builder
            .appender(Appender::builder().build("dev", Box::new(rolling(&base, "dev", keep)?)))
            .logger(Logger::builder().appender("dev").additive(false).build(DEV_TARGET, LevelFilter::Trace));
    } else {
        builder = builder.logger(Logger::builder().additive(false).build(DEV_TARGET, LevelFilter::Off));
    }
    let config = builder
        .build(Root::builder().appender("app").build(lvl))
        .map_err(|e| FilterError::Config(e.to_string()))?;

    if let Some(handle) = HANDLE.get() {
        handle.set_config(config);
        return Ok(());
    }
    let handle = log4rs::init_config(config).map_err(|e| FilterError::Config(e.to_string()))?;
    let _ = HANDLE.set(handle);
    Ok(())
}

/// Configures logging from `FILTERKIT_LOG_DIR`, `FILTERKIT_LOG_LEVEL`,
/// `FILTERKIT_LOG_RETENTION` and `FILTERKIT_DEV`.
///
/// # Errors
/// See [`configure_logging`].
pub fn configure_from_env() -> Result<(), FilterError> {
    let dir = std::env::var("FILTERKIT_LOG_DIR").ok().map(PathBuf::from);
    let level = std::env::var("FILTERKIT_LOG_LEVEL").ok();
    let retention = std::env::var("FILTERKIT_LOG_RETENTION").ok().and_then(|s| s.parse::<usize>().ok());
    let dev = std::env::var("FILTERKIT_DEV")
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false);
    configure_logging_with_dev(dir.as_deref(), level.as_deref(), retention, dev)
}
