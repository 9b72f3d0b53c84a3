//! Interview bookings.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{InterviewId, JobId, TimeRange, UserId};

/// A committed interview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub interview_id: InterviewId,
    pub job_id: JobId,
    pub candidate_id: UserId,
    /// The recruiter who posted the job and owns the booking.
    pub coordinator_id: UserId,
    /// The person conducting the interview, when not the coordinator.
    pub interviewer_id: Option<UserId>,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
}

impl Booking {
    /// The calendar this booking occupies on the hiring side.
    pub fn effective_interviewer(&self) -> UserId {
        self.interviewer_id.unwrap_or(self.coordinator_id)
    }

    pub const fn slot(&self) -> TimeRange {
        TimeRange {
            start: self.start_time,
            end: self.end_time,
        }
    }

    /// Whether `user_id` sits on the hiring side of this booking, either
    /// coordinating it or conducting it.
    pub fn involves(&self, user_id: UserId) -> bool {
        self.coordinator_id == user_id || self.interviewer_id == Some(user_id)
    }

    /// Whether this booking rules out `candidate`: it overlaps in time and
    /// holds either the same candidate or the candidate's interviewer.
    pub fn blocks(&self, candidate: &NewBooking) -> bool {
        let shares_person = self.candidate_id == candidate.candidate_id
            || self.involves(candidate.effective_interviewer());
        shares_person && self.slot().overlaps(&candidate.slot)
    }
}

/// A client's request to book an interview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub job_id: JobId,
    pub candidate_id: UserId,
    pub coordinator_id: UserId,
    #[serde(default)]
    pub interviewer_id: Option<UserId>,
    pub start_time: NaiveDateTime,
    /// Advisory only; the committer derives the end from its own policy.
    #[serde(default)]
    pub end_time: Option<NaiveDateTime>,
}

impl BookingRequest {
    /// Hiring manager if one is assigned, otherwise the coordinator.
    pub fn effective_interviewer(&self) -> UserId {
        self.interviewer_id.unwrap_or(self.coordinator_id)
    }
}

/// A validated booking ready for the store's atomic check-and-insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub job_id: JobId,
    pub candidate_id: UserId,
    pub coordinator_id: UserId,
    pub interviewer_id: Option<UserId>,
    pub slot: TimeRange,
}

impl NewBooking {
    pub fn effective_interviewer(&self) -> UserId {
        self.interviewer_id.unwrap_or(self.coordinator_id)
    }

    /// Attaches the identifier the store allocated.
    pub const fn into_booking(self, interview_id: InterviewId) -> Booking {
        Booking {
            interview_id,
            job_id: self.job_id,
            candidate_id: self.candidate_id,
            coordinator_id: self.coordinator_id,
            interviewer_id: self.interviewer_id,
            start_time: self.slot.start,
            end_time: self.slot.end,
        }
    }
}

/// Result of an atomic commit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The booking was persisted.
    Committed(Booking),
    /// Nothing was written; this existing booking collides.
    Conflict(Booking),
}
