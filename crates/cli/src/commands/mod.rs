//! CLI subcommand implementations

pub mod errors;
pub mod namespaces;
pub mod pods;
pub mod stats;
