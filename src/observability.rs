//! This module provides the logging setup and structured diagnostics for the
//! search machinery.
//!
//! Everything in the crate logs through the `log` facade. Nothing is printed
//! unless the host application installs a logger, either its own or the one
//! configured by [`enable_verbose_logging`].
//!
//! The `log_metric!` macro emits one structured record per event at `debug`
//! level. It is compiled out of release builds.

use std::fs::OpenOptions;
use std::sync::Mutex;

use log::LevelFilter;

use crate::error::Result;

/// Logs a structured key-value metric record, only in debug builds.
///
/// # Example
/// ```
/// use prepcv::log_metric;
/// let rounds = 3;
/// log_metric!("event" = "selection", "rounds" = &rounds);
/// ```
#[macro_export]
macro_rules! log_metric {
    ($($key:literal = $value:expr),+ $(,)?) => {
        #[cfg(debug_assertions)]
        {
            let mut parts = Vec::new();
            $(
                parts.push(format!("\"{}\": \"{}\"", $key, $value));
            )+
            log::debug!("PREPCV_METRIC: {{ {} }}", parts.join(", "));
        }
    };
}

// Set only once a logger has been configured successfully.
static LOGGER_READY: Mutex<bool> = Mutex::new(false);

/// Environment variable that overrides the default `info` level, using the
/// usual `env_logger` filter syntax.
pub const LOG_ENV: &str = "PREPCV_LOG";

/// Installs an `env_logger` printing `[LEVEL] message` lines.
///
/// Only the first successful call has any effect. When `log_file` is given,
/// records are appended to that file instead of stderr.
///
/// # Errors
/// `PrepCvError::Io` if the log file cannot be opened. A later call may retry.
pub fn enable_verbose_logging(log_file: Option<&str>) -> Result<()> {
    let mut ready = LOGGER_READY.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if *ready {
        return Ok(());
    }
    init_logger(log_file)?;
    *ready = true;
    Ok(())
}

fn init_logger(log_file: Option<&str>) -> Result<()> {
    let mut builder = env_logger::Builder::new();

    builder.is_test(cfg!(test));
    builder.filter_level(LevelFilter::Info);
    builder.parse_env(LOG_ENV);

    // Level and message only
    builder.format(|buf, record| {
        use std::io::Write;
        writeln!(buf, "[{}] {}", record.level(), record.args())?;
        buf.flush()?;
        Ok(())
    });

    if let Some(filename) = log_file {
        let file = OpenOptions::new().append(true).create(true).open(filename)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    // Another logger may already be installed by the host; that is fine.
    let _ = builder.try_init();
    Ok(())
}
