//! Error taxonomy surfaced by the scheduling engine.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::InterviewId;

/// Scheduling errors.
///
/// Everything except [`ScheduleError::Store`] is the caller's to resolve: pick
/// another slot, fix the range, or reference an existing record.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// The date range, time window, or duration is malformed.
    #[error("invalid range: {0}")]
    InvalidRange(String),
    /// The requested interval collides with an existing interview.
    #[error("slot unavailable: interview {interview_id} already holds {start} to {end}")]
    SlotConflict {
        interview_id: InterviewId,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    /// A referenced job, candidate, or user does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
    /// The backing store failed.
    #[error("store error: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ScheduleError {
    /// Wraps a storage-layer error.
    pub fn store<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Store(Box::new(err))
    }

    /// Returns true when the error was caused by the request rather than the store.
    pub const fn is_client_error(&self) -> bool {
        !matches!(self, Self::Store(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_are_not_client_errors() {
        let err = ScheduleError::store(std::io::Error::other("disk full"));
        assert!(!err.is_client_error());
        assert_eq!(err.to_string(), "store error: disk full");
    }

    #[test]
    fn not_found_message_names_entity() {
        let err = ScheduleError::NotFound {
            entity: "job",
            id: 7,
        };
        assert!(err.is_client_error());
        assert_eq!(err.to_string(), "job 7 not found");
    }
}
