//! CLI argument parsing.
//!
//! This module provides the argument parser for the chainsim CLI.
//! Extracted to enable comprehensive testing of argument parsing logic.

use std::path::PathBuf;

/// Default replicate count for `ensemble` when `--runs` is absent.
pub const DEFAULT_ENSEMBLE_RUNS: usize = 100;

/// CLI arguments container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    /// The command to execute.
    pub command: Command,
}

/// Available CLI commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the three models once
    Run {
        /// Optional configuration YAML; defaults are used when absent.
        config_path: Option<PathBuf>,
        /// Optional seed override.
        seed_override: Option<u64>,
        /// Emit the bundle as JSON instead of the text report.
        json: bool,
        /// Enable verbose output.
        verbose: bool,
    },
    /// Print the criticality verdict only
    Classify {
        /// Optional configuration YAML.
        config_path: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        /// Path to the configuration YAML file.
        config_path: PathBuf,
    },
    /// Run a replicate ensemble of the branching model
    Ensemble {
        /// Optional configuration YAML.
        config_path: Option<PathBuf>,
        /// Number of replicates.
        runs: usize,
        /// Optional seed override.
        seed_override: Option<u64>,
    },
    /// Estimate the geometric capture probability
    Capture {
        /// Optional configuration YAML.
        config_path: Option<PathBuf>,
        /// Optional trial-count override.
        trials: Option<u64>,
        /// Optional seed override.
        seed_override: Option<u64>,
    },
    /// Show help
    Help,
    /// Show version
    Version,
}

impl Args {
    /// Parse command-line arguments from an iterator.
    ///
    /// This method is testable as it accepts any iterator of strings,
    /// not just `std::env::args()`.
    #[must_use]
    pub fn parse_from<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        Self::parse_from_vec(&args)
    }

    /// Parse command-line arguments from the environment.
    #[must_use]
    pub fn parse() -> Self {
        Self::parse_from(std::env::args())
    }

    /// Whether the command asked for verbose output.
    #[must_use]
    pub fn verbose(&self) -> bool {
        matches!(self.command, Command::Run { verbose: true, .. })
    }

    /// Internal parsing from a vector of strings.
    fn parse_from_vec(args: &[String]) -> Self {
        if args.len() < 2 {
            return Self {
                command: Command::Help,
            };
        }

        let command = match args[1].as_str() {
            "run" => Self::parse_run_command(args),
            "classify" => Command::Classify {
                config_path: Self::optional_path(args),
            },
            "validate" => Self::parse_validate_command(args),
            "ensemble" => Self::parse_ensemble_command(args),
            "capture" => Self::parse_capture_command(args),
            "-h" | "--help" | "help" => Command::Help,
            "-V" | "--version" | "version" => Command::Version,
            unknown => {
                eprintln!("Unknown command: {unknown}");
                Command::Help
            }
        };

        Self { command }
    }

    /// Positional config path in `args[2]`, if it is not a flag.
    fn optional_path(args: &[String]) -> Option<PathBuf> {
        args.get(2)
            .filter(|a| !a.starts_with('-'))
            .map(PathBuf::from)
    }

    /// Index of the first flag after the optional positional path.
    fn flags_start(args: &[String]) -> usize {
        if Self::optional_path(args).is_some() {
            3
        } else {
            2
        }
    }

    /// Parse the 'run' command arguments.
    fn parse_run_command(args: &[String]) -> Command {
        let mut seed_override = None;
        let mut json = false;
        let mut verbose = false;

        let mut i = Self::flags_start(args);
        while i < args.len() {
            match args[i].as_str() {
                "--seed" => {
                    if i + 1 < args.len() {
                        if let Ok(seed) = args[i + 1].parse() {
                            seed_override = Some(seed);
                        }
                        i += 2;
                    } else {
                        i += 1;
                    }
                }
                "--json" => {
                    json = true;
                    i += 1;
                }
                "-v" | "--verbose" => {
                    verbose = true;
                    i += 1;
                }
                _ => i += 1,
            }
        }

        Command::Run {
            config_path: Self::optional_path(args),
            seed_override,
            json,
            verbose,
        }
    }

    /// Parse the 'validate' command arguments.
    fn parse_validate_command(args: &[String]) -> Command {
        match Self::optional_path(args) {
            Some(config_path) => Command::Validate { config_path },
            None => {
                eprintln!("Error: 'validate' command requires config path");
                Command::Help
            }
        }
    }

    /// Parse the 'ensemble' command arguments.
    fn parse_ensemble_command(args: &[String]) -> Command {
        let mut runs = DEFAULT_ENSEMBLE_RUNS;
        let mut seed_override = None;

        let mut i = Self::flags_start(args);
        while i < args.len() {
            match args[i].as_str() {
                "--runs" => {
                    if let Some(n) = args.get(i + 1).and_then(|a| a.parse().ok()) {
                        runs = n;
                    }
                    i += 2;
                }
                "--seed" => {
                    if let Some(seed) = args.get(i + 1).and_then(|a| a.parse().ok()) {
                        seed_override = Some(seed);
                    }
                    i += 2;
                }
                _ => i += 1,
            }
        }

        Command::Ensemble {
            config_path: Self::optional_path(args),
            runs,
            seed_override,
        }
    }

    /// Parse the 'capture' command arguments.
    fn parse_capture_command(args: &[String]) -> Command {
        let mut trials = None;
        let mut seed_override = None;

        let mut i = Self::flags_start(args);
        while i < args.len() {
            match args[i].as_str() {
                "--trials" => {
                    trials = args.get(i + 1).and_then(|a| a.parse().ok());
                    i += 2;
                }
                "--seed" => {
                    if let Some(seed) = args.get(i + 1).and_then(|a| a.parse().ok()) {
                        seed_override = Some(seed);
                    }
                    i += 2;
                }
                _ => i += 1,
            }
        }

        Command::Capture {
            config_path: Self::optional_path(args),
            trials,
            seed_override,
        }
    }
}
