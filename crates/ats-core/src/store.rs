//! Storage seams the scheduler is built on.
//!
//! The scheduler owns one value implementing these traits and never reaches
//! for a shared handle. Reads take `&self`; writes take `&mut self` so a
//! store can run them inside its own transaction.

use crate::{
    Application, Booking, Candidate, CommitOutcome, JobId, JobSummary, NewBooking, TimeRange,
    UserId, WeeklyAvailability,
};

/// Recurring availability keyed by owner.
pub trait AvailabilityStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the owner's rules in stored order, empty if none are set.
    fn availability_for(&self, owner_id: UserId) -> Result<WeeklyAvailability, Self::Error>;

    /// Replaces every rule of `availability.owner_id` with the given list.
    fn replace_availability(&mut self, availability: &WeeklyAvailability)
    -> Result<(), Self::Error>;
}

/// Committed interviews.
pub trait BookingStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Bookings intersecting `window` that involve `user_id` on the hiring
    /// side (as coordinator or interviewer) or `candidate_id` as candidate.
    fn bookings_touching(
        &self,
        user_id: UserId,
        candidate_id: UserId,
        window: TimeRange,
    ) -> Result<Vec<Booking>, Self::Error>;

    /// Inserts `booking` unless a colliding booking exists.
    ///
    /// The conflict check and the insert must be atomic with respect to
    /// every other `commit_booking` against the same data, including calls
    /// from other threads and processes.
    fn commit_booking(&mut self, booking: &NewBooking) -> Result<CommitOutcome, Self::Error>;
}

/// Lookup of users and jobs referenced by a booking.
pub trait Directory {
    type Error: std::error::Error + Send + Sync + 'static;

    fn candidate(&self, user_id: UserId) -> Result<Option<Candidate>, Self::Error>;

    fn job(&self, job_id: JobId) -> Result<Option<JobSummary>, Self::Error>;

    fn user_exists(&self, user_id: UserId) -> Result<bool, Self::Error>;
}

/// The application pipeline, as far as scheduling advances it.
pub trait ApplicationTracker {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Moves the candidate's application for `job_id` to interviewing when
    /// the pipeline allows it. Returns the application as it now stands, or
    /// `None` if the candidate never applied.
    fn mark_interviewing(
        &mut self,
        candidate_id: UserId,
        job_id: JobId,
    ) -> Result<Option<Application>, Self::Error>;
}
