//! # Logging Module
//!
//! This module provides user-facing logging for copyright-keeper:
//! - Verbose logging that can be enabled/disabled
//! - Standard info logging with color support
//!
//! Diagnostic events go through `tracing` (see [`init_tracing`]). The macros
//! here are for messages meant for the person running the tool: verbose logs
//! go to stderr and info logs to stdout for better pipeline integration.
//!
//! ## Example
//!
//! ```rust
//! use copyright_keeper::logging::{ColorMode, set_verbose};
//! use copyright_keeper::{info_log, verbose_log};
//!
//! set_verbose();
//! ColorMode::Auto.apply();
//!
//! verbose_log!("Processing file: {}", "example.c");
//! info_log!("Updated: {}", "example.c");
//! ```

mod modes;

pub use modes::{ColorMode, init_tracing, is_quiet, is_verbose, set_quiet, set_verbose};
use owo_colors::{OwoColorize, Stream};

/// Logs a message to stderr if verbose mode is enabled.
///
/// Uses the same format string syntax as [`eprintln!`].
#[macro_export]
macro_rules! verbose_log {
    ($($arg:tt)*) => {
        if $crate::logging::is_verbose() {
            eprintln!($($arg)*);
        }
    };
}

/// Logs a message to stdout unless quiet mode is enabled.
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {
        if !$crate::logging::is_quiet() {
            $crate::logging::print_info_log(&format!($($arg)*));
        }
    };
}

/// Print an info message in yellow when colors are enabled.
///
/// Used by the [`info_log!`] macro.
pub fn print_info_log(message: &str) {
  println!("{}", message.if_supports_color(Stream::Stdout, |m| m.yellow()));
}
