//! CLI module for chainsim.
//!
//! This module contains all CLI logic extracted from main.rs to enable
//! full test coverage. The entry point `run_cli` can be called from main.rs
//! with parsed arguments.

mod args;
mod commands;
mod output;

pub use args::{Args, Command, DEFAULT_ENSEMBLE_RUNS};
pub use commands::{load_config, run_cli};
pub use output::{
    downsample_indices, format_capture, format_ensemble, format_generations, format_trajectory,
    format_verdict, print_help, print_run_report, print_version, render_json,
};
