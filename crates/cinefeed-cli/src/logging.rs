use anyhow::Result;
use std::io;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::{self, time::ChronoUtc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Where log records go
pub enum LogTarget {
    Stderr,
    /// Daily-rotated file; `cinefeed.log` rotates to `cinefeed.2026-01-17` and so on
    File(PathBuf),
}

/// 0 = info, 1 = debug with hyper connection noise suppressed, 2+ = trace.
/// `RUST_LOG` wins over the verbosity flags; `quiet` wins over both.
fn build_filter(verbose_level: u8, quiet: bool) -> EnvFilter {
    if quiet {
        return EnvFilter::new("error");
    }
    let default = match verbose_level {
        0 => "info",
        1 => "debug,hyper::proto::h1=warn,hyper::client::pool=warn,rustls=warn",
        _ => "trace",
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

fn json_requested() -> bool {
    std::env::var("RUST_LOG_JSON")
        .map(|v| v == "true")
        .unwrap_or_else(|_| !io::stdout().is_terminal())
}

pub fn init_logging(verbose_level: u8, quiet: bool, target: LogTarget) -> Result<()> {
    let registry = Registry::default().with(build_filter(verbose_level, quiet));
    let json = json_requested();

    match target {
        LogTarget::File(log_path) => {
            let file_appender = rolling_appender(&log_path)?;
            if json {
                let layer = fmt::layer()
                    .json()
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(file_appender);
                registry.with(layer).init();
            } else {
                let layer = fmt::layer()
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(false)
                    .with_writer(file_appender);
                registry.with(layer).init();
            }
        }
        LogTarget::Stderr => {
            if json {
                let layer = fmt::layer()
                    .json()
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(io::stderr);
                registry.with(layer).init();
            } else {
                let layer = fmt::layer()
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(io::stderr);
                registry.with(layer).init();
            }
        }
    }

    Ok(())
}

fn rolling_appender(log_path: &Path) -> Result<RollingFileAppender> {
    let log_dir = log_path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("Log file path has no parent directory"))?;
    std::fs::create_dir_all(log_dir)?;

    let log_filename = log_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("Invalid log filename"))?;
    // "cinefeed" from "cinefeed.log"
    let log_prefix = log_filename.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(log_filename);

    Ok(RollingFileAppender::new(Rotation::DAILY, log_dir, log_prefix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_rolling_appender_creates_directory() {
        let dir = TempDir::new().unwrap();
        let log_path = dir.path().join("logs").join("cinefeed.log");
        assert!(rolling_appender(&log_path).is_ok());
        assert!(dir.path().join("logs").is_dir());
    }

    #[test]
    fn test_rolling_appender_rejects_bare_root() {
        assert!(rolling_appender(Path::new("/")).is_err());
    }
}
