//! `fx-landing` library crate.
//!
//! The binary (`fx-ingest`) is a thin wrapper around this library so that:
//!
//! - the ingest procedure is testable without spawning processes
//! - the HTTP and storage capabilities can be swapped for fakes

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod report;

#[cfg(test)]
pub(crate) mod testing;
