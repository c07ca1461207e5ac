//! Subcommand implementations for the `tastegraph` binary.

pub mod graph_cmd;
pub mod profile_cmd;
pub mod recommend_cmd;
