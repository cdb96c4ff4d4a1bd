//! Command-line front ends for `marker-splice-lib`.
//!
//! Shared by the `marker-splice`, `splice-template` and `truncate-section`
//! executables.

pub mod app;
pub mod cli;
