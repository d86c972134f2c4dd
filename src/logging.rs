//! Logging bootstrap for the `quire` binary.
//!
//! The library only uses the `log` facade. The binary starts a
//! `flexi_logger` backend writing to stderr so stdout stays parseable
//! (`quire list --json`, `quire export`).

use anyhow::{Context, Result};
use flexi_logger::{Logger, LoggerHandle};

/// Level used when `--verbose` is passed.
pub const VERBOSE_LEVEL: &str = "debug";

/// Start stderr logging. `RUST_LOG`, when set, takes precedence over `level`.
///
/// The returned handle must be kept alive for the lifetime of the process.
pub fn init_logging(level: &str) -> Result<LoggerHandle> {
    let level = level.trim().to_ascii_lowercase();
    Logger::try_with_env_or_str(&level)
        .with_context(|| format!("invalid log level `{}`", level))?
        .log_to_stderr()
        .format(flexi_logger::default_format)
        .start()
        .context("failed to start logger")
}
