//! Utilities that are used across the `ign-report` subcommands.

pub mod display;
