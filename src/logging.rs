//! Diagnostic tracing setup.
//!
//! Tracing output goes to a file so it never paints over the terminal UI.
//! Nothing is installed unless a file is given.

use std::error::Error;
use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Filter directives, e.g. `OMNICHAT_LOG=omnichat=debug`.
pub const LOG_FILTER_ENV: &str = "OMNICHAT_LOG";

pub fn init_tracing(trace_file: Option<&str>) -> Result<(), Box<dyn Error>> {
    let Some(path) = trace_file else {
        return Ok(());
    };

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter =
        EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| -> Box<dyn Error> { err })?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "tracing initialised");
    Ok(())
}
