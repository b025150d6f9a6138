//! `trove-trends` library crate.
//!
//! The binary (`trends`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the series model and article client can be reused outside the TUI

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod plot;
pub mod report;
pub mod tui;
