//! CLI subcommands.

pub mod backends;
pub mod batch;
pub mod config;
pub mod scan;
