//! Print dispatch for PrintHub.
//!
//! This crate provides:
//! - The [`Dispatcher`], which keeps at most one job active per printer and
//!   advances through each printer's FIFO backlog
//! - The [`Launcher`] seam and the [`CommandLauncher`] that runs the
//!   configured per-printer command
//! - Per-printer async locks serializing check-and-promote cycles

pub mod dispatcher;
pub mod launcher;
pub mod locks;
pub mod template;

pub use dispatcher::Dispatcher;
pub use launcher::{CommandLauncher, LaunchError, LaunchReport, LaunchRequest, Launcher};
pub use locks::PrinterLocks;
