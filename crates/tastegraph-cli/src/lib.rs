//! Command-line front end for TasteGraph.

pub mod commands;
pub mod config;
pub mod output;
pub mod report;
pub mod tables;
