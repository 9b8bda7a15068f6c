//! `ign-report` collects the quality control metrics of DNA sequencing samples
//! from the reports written by Qualimap, snpEff and Picard, and renders them
//! into one report per sample. This package is composed of both a library
//! crate, as well as a binary crate.
//!
//! The heart of the library are the line scanners in [`parse`], which pull
//! the metrics out of each upstream report format while tolerating reports
//! written by different tool versions, missing sections and malformed lines.
//! The [`aggregate::Aggregator`] runs them for each sample of a project and
//! checks that everything a report needs is present.
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![warn(rust_2021_compatibility)]

pub mod aggregate;
pub mod commands;
pub mod config;
pub mod metrics;
pub mod parse;
pub mod paths;
pub mod plot;
pub mod render;
pub mod utils;

#[cfg(test)]
mod fixtures;
