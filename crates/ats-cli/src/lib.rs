//! Interview scheduling CLI library.
//!
//! This crate provides the CLI interface for the interview scheduler.

mod cli;
pub mod commands;
mod config;

pub use cli::{
    ApplicationsAction, AvailabilityAction, Cli, Commands, JobsAction, UsersAction,
};
pub use config::{Config, EmailConfig};
