//! Logging setup for mimedupe.
//!
//! Diagnostics go through the `log` facade to an `env_logger` backend on
//! stderr, so they never mix with the report on stdout. The level comes from:
//!
//! 1. `RUST_LOG` environment variable (if set)
//! 2. CLI flags: `--quiet` (error only) or `--verbose` (debug/trace)
//! 3. Default: info level
//!
//! Debug builds prefix every line with a timestamp; module paths are added
//! once `-v` is given.
//!
//! # Example
//!
//! ```rust,no_run
//! use mimedupe::logging::init_logging;
//!
//! init_logging(1, false);
//! log::debug!("visible with -v");
//! ```

use std::env;
use std::io::Write;

use env_logger::{Builder, Target};
use log::LevelFilter;

/// Initialize the logging subsystem based on CLI verbosity flags.
///
/// Only the first call installs a logger; later calls are ignored so the
/// application entry point can be run repeatedly in one process.
///
/// # Arguments
///
/// * `verbose` - Verbosity count from CLI (0=normal, 1=debug, 2+=trace)
/// * `quiet` - If true, only show errors (overridden by RUST_LOG)
pub fn init_logging(verbose: u8, quiet: bool) {
    let from_env = env::var_os("RUST_LOG").is_some();

    let mut builder = Builder::new();
    builder.target(Target::Stderr);
    if from_env {
        builder.parse_default_env();
    } else {
        builder.filter_level(determine_level(verbose, quiet));
    }
    configure_format(&mut builder, verbose);

    if builder.try_init().is_ok() {
        if from_env {
            log::debug!("Logging initialized from RUST_LOG");
        } else {
            log::debug!(
                "Logging initialized at level: {:?}",
                determine_level(verbose, quiet)
            );
        }
    }
}

/// Determine the log level from CLI flags.
fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

fn configure_format(builder: &mut Builder, verbose: u8) {
    let with_module = verbose >= 1;
    let with_timestamp = cfg!(debug_assertions);

    builder.format(move |buf, record| {
        let level = record.level();
        let level_style = buf.default_level_style(level);

        if with_timestamp {
            write!(buf, "{} ", buf.timestamp_seconds())?;
        }
        write!(buf, "{level_style}{:<5}{level_style:#} ", level)?;
        if with_module {
            write!(buf, "[{}] ", record.module_path().unwrap_or("unknown"))?;
        }
        writeln!(buf, "{}", record.args())
    });
}
