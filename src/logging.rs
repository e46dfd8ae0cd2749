//! Diagnostics, enabled by pointing `DIFFIUM_LOG` at a file.
//!
//! The terminal belongs to the UI, so log output only ever goes to that file.
//! `RUST_LOG` controls the filter (default `diffium=debug`).

use std::fs::File;
use std::sync::Mutex;
use std::time::Instant;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_ENV: &str = "DIFFIUM_LOG";
const DEFAULT_FILTER: &str = "diffium=debug";

/// Install the file subscriber if `DIFFIUM_LOG` is set. Call once at startup.
pub fn init() -> anyhow::Result<()> {
    let Some(path) = std::env::var_os(LOG_ENV) else {
        return Ok(());
    };

    let file = File::options()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.to_string_lossy()))?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(filter)
        .try_init()
        .context("installing tracing subscriber")?;

    Ok(())
}

/// RAII timer that logs the elapsed time at `trace` level on drop.
pub struct Timer {
    label: &'static str,
    start: Instant,
}

impl Timer {
    /// Start timing `label`.
    #[inline]
    pub fn start(label: &'static str) -> Self {
        Self {
            label,
            start: Instant::now(),
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        tracing::trace!(label = self.label, elapsed = ?self.start.elapsed(), "timing");
    }
}
