//! CLI subcommand implementations.

pub mod availability;
pub mod book;
pub mod directory;
pub mod interviews;
pub mod slots;
pub mod util;
