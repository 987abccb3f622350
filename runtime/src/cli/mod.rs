//! CLI subcommand implementations for the statscrawl binary.

pub mod output;
pub mod run_cmd;
