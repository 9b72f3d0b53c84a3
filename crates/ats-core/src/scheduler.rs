//! The slot generator and booking committer.

use chrono::{Duration, NaiveDateTime, Timelike, Utc};
use tracing::{debug, info, warn};

use crate::store::{ApplicationTracker, AvailabilityStore, BookingStore, Directory};
use crate::{
    Booking, BookingRequest, CommitOutcome, InterviewInvitation, NewBooking, Notifier,
    ScheduleError, SlotQuery, TimeRange, UserId, WeeklyAvailability, generate_slots,
};

/// Default interview length when the caller does not configure one.
pub const DEFAULT_INTERVIEW_MINUTES: u32 = 30;
/// Default cap on the number of days a single slot search may span.
pub const DEFAULT_MAX_RANGE_DAYS: u32 = 90;

/// Server-side scheduling policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulingPolicy {
    /// Every booking lasts exactly this long, whatever end the client sends.
    pub interview_minutes: u32,
    pub max_range_days: u32,
}

impl Default for SchedulingPolicy {
    fn default() -> Self {
        Self {
            interview_minutes: DEFAULT_INTERVIEW_MINUTES,
            max_range_days: DEFAULT_MAX_RANGE_DAYS,
        }
    }
}

impl SchedulingPolicy {
    fn interview_length(&self) -> Result<Duration, ScheduleError> {
        if self.interview_minutes == 0 {
            return Err(ScheduleError::InvalidRange(
                "interview length must be positive".to_string(),
            ));
        }
        Ok(Duration::minutes(i64::from(self.interview_minutes)))
    }

    /// Derives the booked interval from the requested start.
    ///
    /// Starts must fall on a whole minute, the precision slots are offered at.
    fn slot_for(&self, request: &BookingRequest) -> Result<TimeRange, ScheduleError> {
        if request.start_time.second() != 0 || request.start_time.nanosecond() != 0 {
            return Err(ScheduleError::InvalidRange(format!(
                "start {} must fall on a whole minute",
                request.start_time
            )));
        }
        if let Some(end) = request.end_time {
            if end <= request.start_time {
                return Err(ScheduleError::InvalidRange(format!(
                    "end {end} must be after start {}",
                    request.start_time
                )));
            }
        }
        let slot = TimeRange::starting_at(request.start_time, self.interview_length()?)?;
        if let Some(end) = request.end_time.filter(|end| *end != slot.end) {
            debug!(requested_end = %end, end = %slot.end, "ignoring client-supplied end time");
        }
        Ok(slot)
    }
}

/// Finds open interview slots and commits bookings against a store.
#[derive(Debug)]
pub struct Scheduler<S, N> {
    store: S,
    notifier: N,
    policy: SchedulingPolicy,
}

impl<S, N> Scheduler<S, N> {
    pub const fn new(store: S, notifier: N, policy: SchedulingPolicy) -> Self {
        Self {
            store,
            notifier,
            policy,
        }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub const fn policy(&self) -> &SchedulingPolicy {
        &self.policy
    }

    pub fn into_parts(self) -> (S, N) {
        (self.store, self.notifier)
    }
}

impl<S, N> Scheduler<S, N>
where
    S: AvailabilityStore,
{
    /// Returns the owner's weekly availability.
    pub fn availability(&self, owner_id: UserId) -> Result<WeeklyAvailability, ScheduleError> {
        self.store
            .availability_for(owner_id)
            .map_err(ScheduleError::store)
    }

    /// Replaces the owner's availability wholesale.
    pub fn set_availability(
        &mut self,
        availability: &WeeklyAvailability,
    ) -> Result<(), ScheduleError> {
        self.store
            .replace_availability(availability)
            .map_err(ScheduleError::store)?;
        info!(
            owner_id = availability.owner_id,
            rules = availability.rules.len(),
            "availability replaced"
        );
        Ok(())
    }
}

impl<S, N> Scheduler<S, N>
where
    S: AvailabilityStore + BookingStore,
{
    /// Lists open slot start times for the query, relative to the current time.
    pub fn find_open_slots(&self, query: &SlotQuery) -> Result<Vec<NaiveDateTime>, ScheduleError> {
        self.find_open_slots_at(query, Utc::now().naive_utc())
    }

    /// Lists open slot start times, treating `now` as the current time.
    pub fn find_open_slots_at(
        &self,
        query: &SlotQuery,
        now: NaiveDateTime,
    ) -> Result<Vec<NaiveDateTime>, ScheduleError> {
        let (duration, window) = query.validate(self.policy.max_range_days)?;
        let booked_length = self.policy.interview_length()?;

        let availability = self.availability(query.interviewer_id)?;
        if availability.is_empty() {
            debug!(
                interviewer_id = query.interviewer_id,
                "no availability configured"
            );
            return Ok(Vec::new());
        }

        // A booking made near the end of the window can run past it.
        let lookup = TimeRange {
            end: window
                .end
                .checked_add_signed(booked_length)
                .unwrap_or(window.end),
            ..window
        };
        let busy: Vec<TimeRange> = self
            .store
            .bookings_touching(query.interviewer_id, query.candidate_id, lookup)
            .map_err(ScheduleError::store)?
            .iter()
            .map(Booking::slot)
            .collect();

        let slots = generate_slots(
            &availability.rules,
            &busy,
            query.start_date,
            query.end_date,
            duration,
            booked_length,
            now,
        );
        debug!(
            interviewer_id = query.interviewer_id,
            candidate_id = query.candidate_id,
            busy = busy.len(),
            slots = slots.len(),
            "computed open slots"
        );
        Ok(slots)
    }
}

impl<S, N> Scheduler<S, N>
where
    S: BookingStore + Directory + ApplicationTracker,
    N: Notifier,
{
    /// Books an interview if nobody involved is already busy.
    ///
    /// The store's atomic commit is the authority on conflicts; slots handed
    /// out earlier may have been taken since. After a successful commit the
    /// application moves to interviewing and an invitation is queued, and
    /// neither of those can fail the booking.
    pub fn book_interview(&mut self, request: &BookingRequest) -> Result<Booking, ScheduleError> {
        let slot = self.policy.slot_for(request)?;

        let job = self
            .store
            .job(request.job_id)
            .map_err(ScheduleError::store)?
            .ok_or(ScheduleError::NotFound {
                entity: "job",
                id: request.job_id,
            })?;
        let candidate = self
            .store
            .candidate(request.candidate_id)
            .map_err(ScheduleError::store)?
            .ok_or(ScheduleError::NotFound {
                entity: "candidate",
                id: request.candidate_id,
            })?;
        for user_id in [request.coordinator_id, request.effective_interviewer()] {
            if !self.store.user_exists(user_id).map_err(ScheduleError::store)? {
                return Err(ScheduleError::NotFound {
                    entity: "user",
                    id: user_id,
                });
            }
        }

        let new_booking = NewBooking {
            job_id: job.job_id,
            candidate_id: candidate.user_id,
            coordinator_id: request.coordinator_id,
            interviewer_id: request.interviewer_id,
            slot,
        };
        let booking = match self
            .store
            .commit_booking(&new_booking)
            .map_err(ScheduleError::store)?
        {
            CommitOutcome::Committed(booking) => booking,
            CommitOutcome::Conflict(existing) => {
                info!(
                    existing = existing.interview_id,
                    candidate_id = new_booking.candidate_id,
                    interviewer_id = new_booking.effective_interviewer(),
                    start = %slot.start,
                    "booking rejected, slot taken"
                );
                return Err(ScheduleError::SlotConflict {
                    interview_id: existing.interview_id,
                    start: existing.start_time,
                    end: existing.end_time,
                });
            }
        };
        info!(
            interview_id = booking.interview_id,
            job_id = booking.job_id,
            candidate_id = booking.candidate_id,
            interviewer_id = booking.effective_interviewer(),
            start = %booking.start_time,
            "interview booked"
        );

        let application_id = match self.store.mark_interviewing(candidate.user_id, job.job_id) {
            Ok(Some(application)) => Some(application.app_id),
            Ok(None) => {
                warn!(
                    candidate_id = candidate.user_id,
                    job_id = job.job_id,
                    "no application to advance"
                );
                None
            }
            Err(err) => {
                warn!(error = %err, "failed to advance application status");
                None
            }
        };

        match candidate.email {
            Some(email) if !email.trim().is_empty() => {
                self.notifier.notify(InterviewInvitation {
                    interview_id: booking.interview_id,
                    candidate_email: email,
                    candidate_name: candidate.first_name,
                    job_title: job.title,
                    company: job.company,
                    application_id,
                    start_time: booking.start_time,
                });
            }
            _ => warn!(
                candidate_id = candidate.user_id,
                "candidate has no email, skipping invitation"
            ),
        }

        Ok(booking)
    }
}
