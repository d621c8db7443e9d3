//! Command implementations.
//!
//! `regtest` has a single command: run (or list) the tests of one file.

pub mod run;

pub use run::execute as run_execute;
