//! Core scheduling logic for the applicant tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Availability: recurring weekly windows an interviewer offers
//! - Slot generation: tiling availability into free, future interview slots
//! - Booking: committing an interview only when no reservation collides
//!
//! Storage and notification delivery live behind the traits in [`store`] and
//! [`notify`], so the engine never touches a database or mail server itself.

pub mod application;
pub mod availability;
pub mod booking;
mod error;
pub mod interval;
pub mod notify;
mod scheduler;
pub mod slots;
pub mod store;

pub use application::{Application, ApplicationStatus, Candidate, JobSummary};
pub use availability::{AvailabilityRule, Weekday, WeeklyAvailability};
pub use booking::{Booking, BookingRequest, CommitOutcome, NewBooking};
pub use error::ScheduleError;
pub use interval::TimeRange;
pub use notify::{InterviewInvitation, NoopNotifier, Notifier};
pub use scheduler::{Scheduler, SchedulingPolicy};
pub use slots::{SlotQuery, generate_slots};

/// Identifier of a user (candidate, recruiter, or hiring manager).
pub type UserId = i64;
/// Identifier of a job posting.
pub type JobId = i64;
/// Identifier of a committed interview.
pub type InterviewId = i64;
/// Identifier of a job application.
pub type ApplicationId = i64;
