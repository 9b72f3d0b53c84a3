//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Interview scheduling for the applicant tracker.
///
/// Keeps weekly availability for recruiters and candidates, offers open
/// interview slots, and books interviews without double-booking anyone.
#[derive(Debug, Parser)]
#[command(name = "ats", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage users (recruiters, hiring managers, candidates).
    #[command(subcommand)]
    Users(UsersAction),

    /// Manage job postings.
    #[command(subcommand)]
    Jobs(JobsAction),

    /// Manage job applications.
    #[command(subcommand)]
    Applications(ApplicationsAction),

    /// Manage weekly availability.
    #[command(subcommand)]
    Availability(AvailabilityAction),

    /// List open interview start times shared by an interviewer and a candidate.
    Slots {
        /// Recruiter or hiring manager running the interview.
        #[arg(long)]
        interviewer: i64,

        /// Candidate being interviewed.
        #[arg(long)]
        candidate: i64,

        /// First day to search (YYYY-MM-DD).
        #[arg(long)]
        from: String,

        /// Last day to search, inclusive (YYYY-MM-DD).
        #[arg(long)]
        to: String,

        /// Slot length in minutes.
        #[arg(long, default_value_t = 30)]
        duration: u32,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Book an interview at a previously offered start time.
    Book {
        #[arg(long)]
        job: i64,

        #[arg(long)]
        candidate: i64,

        /// Recruiter coordinating the interview.
        #[arg(long)]
        coordinator: i64,

        /// Hiring manager; defaults to the coordinator.
        #[arg(long)]
        interviewer: Option<i64>,

        /// Start time (e.g., 2030-01-07T10:00 or 2030-01-07T10:00:00Z).
        #[arg(long)]
        start: String,

        /// Requested end time; the configured interview length wins.
        #[arg(long)]
        end: Option<String>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List booked interviews.
    Interviews {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}

/// User management actions.
#[derive(Debug, Subcommand)]
pub enum UsersAction {
    /// Register a user and print its ID.
    Add {
        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        #[arg(long)]
        email: Option<String>,
    },
}

/// Job posting actions.
#[derive(Debug, Subcommand)]
pub enum JobsAction {
    /// Post a job and print its ID.
    Add {
        #[arg(long)]
        title: String,

        #[arg(long)]
        company: String,

        /// Recruiter who owns the posting.
        #[arg(long)]
        coordinator: i64,
    },
}

/// Application actions.
#[derive(Debug, Subcommand)]
pub enum ApplicationsAction {
    /// Record that a candidate applied to a job.
    Add {
        #[arg(long)]
        candidate: i64,

        #[arg(long)]
        job: i64,
    },
}

/// Availability actions.
#[derive(Debug, Subcommand)]
pub enum AvailabilityAction {
    /// Replace a user's weekly availability.
    Set {
        #[arg(long)]
        owner: i64,

        /// Weekly rules such as "Monday 09:00-17:00". Pass none to clear.
        rules: Vec<String>,
    },

    /// Show a user's weekly availability.
    Show {
        #[arg(long)]
        owner: i64,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}
