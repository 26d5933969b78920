//! CLI subcommand implementations.

pub mod fetch;
pub mod status;
pub mod subsections;
pub mod years;
