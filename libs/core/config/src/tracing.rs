use crate::{LogConfig, LogFormat};
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install color-eyre with a project-standard configuration.
///
/// Call this early in the main() before any fallible operations to ensure
/// colored error output. Safe to call multiple times.
///
/// Configuration:
/// - Shows file:line where errors occur
/// - Hides environment variables (less noise)
pub fn install_color_eyre() {
    let _ = color_eyre::config::HookBuilder::default()
        .display_location_section(true)
        .display_env_section(false)
        .install();
}

/// Keeps the non-blocking log writers alive.
///
/// Dropping the guard flushes whatever is still buffered, so hold it until the
/// process is about to exit. There is no global handle: whoever initialised
/// logging owns the teardown.
#[must_use = "dropping the guard immediately discards buffered log output"]
pub struct TracingGuard {
    _writers: Vec<WorkerGuard>,
}

impl std::fmt::Debug for TracingGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TracingGuard")
            .field("writers", &self._writers.len())
            .finish()
    }
}

/// Initialize tracing from the `[log]` section and return the teardown guard.
///
/// This function sets up:
/// 1. a stdout layer, pretty or JSON depending on `config.format`
/// 2. an optional daily rolling JSON file when `config.directory` is set
/// 3. `ErrorLayer` so eyre reports carry span traces
///
/// `RUST_LOG` overrides `config.level` when present. An unparseable level
/// falls back to `info`.
///
/// # Multiple Calls
///
/// Safe to call multiple times. If a global subscriber already exists the
/// call logs at debug and the returned guard only keeps the new writers alive.
pub fn init_tracing(config: &LogConfig) -> TracingGuard {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let (stdout_writer, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());
    let mut writers = vec![stdout_guard];

    let stdout_layer = match config.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(false)
            .flatten_event(true)
            .with_writer(stdout_writer)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .with_target(false)
            .with_file(false)
            .with_line_number(false)
            .pretty()
            .with_writer(stdout_writer)
            .boxed(),
    };

    let file_layer = config.directory.as_ref().map(|directory| {
        let appender =
            tracing_appender::rolling::daily(directory, format!("{}.log", config.file_prefix));
        let (file_writer, file_guard) = tracing_appender::non_blocking(appender);
        writers.push(file_guard);
        fmt::layer()
            .json()
            .with_target(true)
            .with_writer(file_writer)
            .boxed()
    });

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .with(tracing_error::ErrorLayer::default())
        .try_init();

    match result {
        Ok(_) => {
            info!(
                format = %config.format,
                level = %config.level,
                log_dir = ?config.directory,
                "Tracing initialized"
            );
        }
        Err(_) => {
            debug!("Tracing already initialized, skipping re-initialization");
        }
    }

    TracingGuard { _writers: writers }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_pretty() {
        let _guard = init_tracing(&LogConfig::default());
    }

    #[test]
    fn test_init_tracing_json() {
        let config = LogConfig {
            format: LogFormat::Json,
            ..LogConfig::default()
        };
        let _guard = init_tracing(&config);
    }

    #[test]
    fn test_init_tracing_multiple_calls() {
        let first = init_tracing(&LogConfig::default());
        let second = init_tracing(&LogConfig::default());
        drop(second);
        drop(first);
    }

    #[test]
    fn test_init_tracing_with_file_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config = LogConfig {
            directory: Some(dir.path().to_path_buf()),
            ..LogConfig::default()
        };
        let guard = init_tracing(&config);
        assert_eq!(guard._writers.len(), 2);
    }

    #[test]
    fn test_init_tracing_invalid_level_falls_back() {
        temp_env::with_var_unset("RUST_LOG", || {
            let config = LogConfig {
                level: "=[not a directive".to_string(),
                ..LogConfig::default()
            };
            let _guard = init_tracing(&config);
        });
    }
}
