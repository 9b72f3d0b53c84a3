//! Storage layer for the interview scheduler.
//!
//! Provides persistence for users, jobs, applications, weekly availability,
//! and booked interviews using `rusqlite`, and implements the store traits
//! from [`ats_core::store`].
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! Open one `Database` per thread (or process) against the same file; SQLite's
//! locking plus the busy timeout serialize writers between them.
//!
//! # Booking Atomicity
//!
//! [`Database::commit_booking`] runs the conflict query and the insert inside
//! one `BEGIN IMMEDIATE` transaction. The reserved lock is taken before the
//! read, so no second connection can observe the same free interval and
//! insert into it before the first commits.
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Interview times are timezone-naive and stored as TEXT in a fixed-width
//! ISO 8601 form with nanoseconds (e.g., `2030-01-07T10:30:00.000000000`), so
//! lexicographic ordering matches chronological ordering and overlap checks
//! run in SQL. Years are limited to 0000-9999 to keep the width fixed.
//! Availability times are stored as `HH:MM`.

use std::path::Path;
use std::time::Duration;

use ats_core::store::{ApplicationTracker, AvailabilityStore, BookingStore, Directory};
use ats_core::{
    Application, ApplicationStatus, AvailabilityRule, Booking, Candidate, CommitOutcome,
    JobSummary, NewBooking, TimeRange, Weekday, WeeklyAvailability,
};
use ats_core::{ApplicationId, InterviewId, JobId, UserId};
use chrono::{NaiveDateTime, Utc};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use thiserror::Error;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.9f";
const TIME_OF_DAY_FORMAT: &str = "%H:%M";
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A stored timestamp could not be parsed.
    #[error("invalid timestamp in {column}: {value}")]
    TimestampParse {
        column: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored row violates the data model.
    #[error("invalid {table} row: {message}")]
    InvalidRow { table: &'static str, message: String },
    /// The application pipeline forbids the requested status change.
    #[error("application {app_id} cannot move from {from} to {to}")]
    InvalidTransition {
        app_id: ApplicationId,
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// A user to register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
}

/// A job posting to register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJob {
    pub title: String,
    pub company: String,
    pub coordinator_id: UserId,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.busy_timeout(BUSY_TIMEOUT)?;
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS users (
                user_id INTEGER PRIMARY KEY AUTOINCREMENT,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                email TEXT,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS jobs (
                job_id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                company TEXT NOT NULL,
                coordinator_id INTEGER NOT NULL,
                posted_at TEXT NOT NULL,
                FOREIGN KEY (coordinator_id) REFERENCES users(user_id)
            );

            -- status: pipeline label (e.g., 'Applied', 'Offer Rejected')
            CREATE TABLE IF NOT EXISTS applications (
                app_id INTEGER PRIMARY KEY AUTOINCREMENT,
                candidate_id INTEGER NOT NULL,
                job_id INTEGER NOT NULL,
                status TEXT NOT NULL DEFAULT 'Applied',
                submitted_at TEXT NOT NULL,
                UNIQUE (candidate_id, job_id),
                FOREIGN KEY (candidate_id) REFERENCES users(user_id) ON DELETE CASCADE,
                FOREIGN KEY (job_id) REFERENCES jobs(job_id) ON DELETE CASCADE
            );

            -- position: order the owner listed the rule in
            CREATE TABLE IF NOT EXISTS availability_rules (
                owner_id INTEGER NOT NULL,
                position INTEGER NOT NULL,
                day_of_week TEXT NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL,
                PRIMARY KEY (owner_id, position),
                CHECK (start_time < end_time),
                FOREIGN KEY (owner_id) REFERENCES users(user_id) ON DELETE CASCADE
            );

            -- start_time/end_time: naive ISO 8601 (e.g., '2030-01-07T10:00:00.000000000')
            CREATE TABLE IF NOT EXISTS interviews (
                interview_id INTEGER PRIMARY KEY AUTOINCREMENT,
                job_id INTEGER NOT NULL,
                candidate_id INTEGER NOT NULL,
                coordinator_id INTEGER NOT NULL,
                interviewer_id INTEGER,
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL,
                created_at TEXT NOT NULL,
                CHECK (start_time < end_time),
                FOREIGN KEY (job_id) REFERENCES jobs(job_id),
                FOREIGN KEY (candidate_id) REFERENCES users(user_id),
                FOREIGN KEY (coordinator_id) REFERENCES users(user_id),
                FOREIGN KEY (interviewer_id) REFERENCES users(user_id)
            );

            CREATE INDEX IF NOT EXISTS idx_interviews_candidate ON interviews(candidate_id, start_time);
            CREATE INDEX IF NOT EXISTS idx_interviews_coordinator ON interviews(coordinator_id, start_time);
            CREATE INDEX IF NOT EXISTS idx_interviews_interviewer ON interviews(interviewer_id, start_time);
            ",
        )?;
        Ok(())
    }

    /// Registers a user and returns the allocated id.
    pub fn add_user(&mut self, user: &NewUser) -> Result<UserId, DbError> {
        self.conn.execute(
            "INSERT INTO users (first_name, last_name, email, created_at) VALUES (?, ?, ?, ?)",
            params![user.first_name, user.last_name, user.email, now_timestamp()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Registers a job posting and returns the allocated id.
    pub fn add_job(&mut self, job: &NewJob) -> Result<JobId, DbError> {
        self.conn.execute(
            "INSERT INTO jobs (title, company, coordinator_id, posted_at) VALUES (?, ?, ?, ?)",
            params![job.title, job.company, job.coordinator_id, now_timestamp()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Records an application in the `Applied` state.
    pub fn add_application(
        &mut self,
        candidate_id: UserId,
        job_id: JobId,
    ) -> Result<Application, DbError> {
        let status = ApplicationStatus::Applied;
        self.conn.execute(
            "INSERT INTO applications (candidate_id, job_id, status, submitted_at) VALUES (?, ?, ?, ?)",
            params![candidate_id, job_id, status.as_str(), now_timestamp()],
        )?;
        Ok(Application {
            app_id: self.conn.last_insert_rowid(),
            candidate_id,
            job_id,
            status,
        })
    }

    /// Looks up the candidate's application for a job.
    pub fn application(
        &self,
        candidate_id: UserId,
        job_id: JobId,
    ) -> Result<Option<Application>, DbError> {
        let row = self
            .conn
            .query_row(
                "
                SELECT app_id, status
                FROM applications
                WHERE candidate_id = ? AND job_id = ?
                ",
                params![candidate_id, job_id],
                |row| Ok((row.get::<_, ApplicationId>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;
        row.map(|(app_id, status)| {
            Ok(Application {
                app_id,
                candidate_id,
                job_id,
                status: parse_status(&status)?,
            })
        })
        .transpose()
    }

    /// Moves an application to `next`, enforcing the pipeline's transitions.
    pub fn update_application_status(
        &mut self,
        app_id: ApplicationId,
        next: ApplicationStatus,
    ) -> Result<(), DbError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let current: String = tx.query_row(
            "SELECT status FROM applications WHERE app_id = ?",
            [app_id],
            |row| row.get(0),
        )?;
        let current = parse_status(&current)?;
        if !current.can_transition_to(next) {
            return Err(DbError::InvalidTransition {
                app_id,
                from: current,
                to: next,
            });
        }
        tx.execute(
            "UPDATE applications SET status = ? WHERE app_id = ?",
            params![next.as_str(), app_id],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Lists every interview ordered by start time then ID.
    pub fn list_interviews(&self) -> Result<Vec<Booking>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT interview_id, job_id, candidate_id, coordinator_id, interviewer_id, start_time, end_time
            FROM interviews
            ORDER BY start_time ASC, interview_id ASC
            ",
        )?;
        let rows = stmt.query_map([], InterviewRow::from_row)?;
        let mut interviews = Vec::new();
        for row in rows {
            interviews.push(row?.into_booking()?);
        }
        Ok(interviews)
    }

    fn load_availability(&self, owner_id: UserId) -> Result<WeeklyAvailability, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT day_of_week, start_time, end_time
            FROM availability_rules
            WHERE owner_id = ?
            ORDER BY position ASC
            ",
        )?;
        let rows = stmt.query_map([owner_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;
        let mut rules = Vec::new();
        for row in rows {
            let (day, start, end) = row?;
            let day: Weekday = day.parse().map_err(|err| DbError::InvalidRow {
                table: "availability_rules",
                message: format!("{err}"),
            })?;
            let rule =
                AvailabilityRule::parse(day, &start, &end).map_err(|err| DbError::InvalidRow {
                    table: "availability_rules",
                    message: err.to_string(),
                })?;
            rules.push(rule);
        }
        Ok(WeeklyAvailability::new(owner_id, rules))
    }

    fn store_availability(&mut self, availability: &WeeklyAvailability) -> Result<(), DbError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "DELETE FROM availability_rules WHERE owner_id = ?",
            [availability.owner_id],
        )?;
        {
            let mut stmt = tx.prepare(
                "
                INSERT INTO availability_rules (owner_id, position, day_of_week, start_time, end_time)
                VALUES (?, ?, ?, ?, ?)
                ",
            )?;
            for (position, rule) in (0_i64..).zip(&availability.rules) {
                stmt.execute(params![
                    availability.owner_id,
                    position,
                    rule.day_of_week.name(),
                    rule.start_time.format(TIME_OF_DAY_FORMAT).to_string(),
                    rule.end_time.format(TIME_OF_DAY_FORMAT).to_string(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn interviews_touching(
        &self,
        user_id: UserId,
        candidate_id: UserId,
        window: TimeRange,
    ) -> Result<Vec<Booking>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT interview_id, job_id, candidate_id, coordinator_id, interviewer_id, start_time, end_time
            FROM interviews
            WHERE (coordinator_id = ?1 OR interviewer_id = ?1 OR candidate_id = ?2)
              AND start_time < ?4 AND end_time > ?3
            ORDER BY start_time ASC, interview_id ASC
            ",
        )?;
        let rows = stmt.query_map(
            params![
                user_id,
                candidate_id,
                format_timestamp(window.start),
                format_timestamp(window.end),
            ],
            InterviewRow::from_row,
        )?;
        let mut interviews = Vec::new();
        for row in rows {
            interviews.push(row?.into_booking()?);
        }
        Ok(interviews)
    }

    fn insert_interview_if_free(&mut self, booking: &NewBooking) -> Result<CommitOutcome, DbError> {
        let start = format_timestamp(booking.slot.start);
        let end = format_timestamp(booking.slot.end);

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let conflict = tx
            .query_row(
                "
                SELECT interview_id, job_id, candidate_id, coordinator_id, interviewer_id, start_time, end_time
                FROM interviews
                WHERE (coordinator_id = ?1 OR interviewer_id = ?1 OR candidate_id = ?2)
                  AND start_time < ?4 AND end_time > ?3
                ORDER BY start_time ASC, interview_id ASC
                LIMIT 1
                ",
                params![booking.effective_interviewer(), booking.candidate_id, start, end],
                InterviewRow::from_row,
            )
            .optional()?;
        if let Some(existing) = conflict {
            // Dropping the transaction rolls it back.
            return Ok(CommitOutcome::Conflict(existing.into_booking()?));
        }

        tx.execute(
            "
            INSERT INTO interviews
            (job_id, candidate_id, coordinator_id, interviewer_id, start_time, end_time, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ",
            params![
                booking.job_id,
                booking.candidate_id,
                booking.coordinator_id,
                booking.interviewer_id,
                start,
                end,
                now_timestamp(),
            ],
        )?;
        let interview_id: InterviewId = tx.last_insert_rowid();
        tx.commit()?;
        Ok(CommitOutcome::Committed(
            booking.clone().into_booking(interview_id),
        ))
    }

    fn advance_to_interviewing(
        &mut self,
        candidate_id: UserId,
        job_id: JobId,
    ) -> Result<Option<Application>, DbError> {
        let Some(mut application) = self.application(candidate_id, job_id)? else {
            return Ok(None);
        };
        let next = ApplicationStatus::Interviewing;
        if application.status == next {
            return Ok(Some(application));
        }
        match self.update_application_status(application.app_id, next) {
            Ok(()) => application.status = next,
            Err(DbError::InvalidTransition { from, .. }) => {
                tracing::warn!(
                    app_id = application.app_id,
                    status = %from,
                    "application not advanced to interviewing"
                );
            }
            Err(err) => return Err(err),
        }
        Ok(Some(application))
    }
}

impl AvailabilityStore for Database {
    type Error = DbError;

    fn availability_for(&self, owner_id: UserId) -> Result<WeeklyAvailability, DbError> {
        self.load_availability(owner_id)
    }

    fn replace_availability(&mut self, availability: &WeeklyAvailability) -> Result<(), DbError> {
        self.store_availability(availability)
    }
}

impl BookingStore for Database {
    type Error = DbError;

    fn bookings_touching(
        &self,
        user_id: UserId,
        candidate_id: UserId,
        window: TimeRange,
    ) -> Result<Vec<Booking>, DbError> {
        self.interviews_touching(user_id, candidate_id, window)
    }

    fn commit_booking(&mut self, booking: &NewBooking) -> Result<CommitOutcome, DbError> {
        self.insert_interview_if_free(booking)
    }
}

impl Directory for Database {
    type Error = DbError;

    fn candidate(&self, user_id: UserId) -> Result<Option<Candidate>, DbError> {
        let candidate = self
            .conn
            .query_row(
                "SELECT user_id, first_name, email FROM users WHERE user_id = ?",
                [user_id],
                |row| {
                    Ok(Candidate {
                        user_id: row.get(0)?,
                        first_name: row.get(1)?,
                        email: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(candidate)
    }

    fn job(&self, job_id: JobId) -> Result<Option<JobSummary>, DbError> {
        let job = self
            .conn
            .query_row(
                "SELECT job_id, title, company, coordinator_id FROM jobs WHERE job_id = ?",
                [job_id],
                |row| {
                    Ok(JobSummary {
                        job_id: row.get(0)?,
                        title: row.get(1)?,
                        company: row.get(2)?,
                        coordinator_id: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(job)
    }

    fn user_exists(&self, user_id: UserId) -> Result<bool, DbError> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM users WHERE user_id = ?)",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }
}

impl ApplicationTracker for Database {
    type Error = DbError;

    fn mark_interviewing(
        &mut self,
        candidate_id: UserId,
        job_id: JobId,
    ) -> Result<Option<Application>, DbError> {
        self.advance_to_interviewing(candidate_id, job_id)
    }
}

#[derive(Debug)]
struct InterviewRow {
    interview_id: InterviewId,
    job_id: JobId,
    candidate_id: UserId,
    coordinator_id: UserId,
    interviewer_id: Option<UserId>,
    start_time: String,
    end_time: String,
}

impl InterviewRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            interview_id: row.get(0)?,
            job_id: row.get(1)?,
            candidate_id: row.get(2)?,
            coordinator_id: row.get(3)?,
            interviewer_id: row.get(4)?,
            start_time: row.get(5)?,
            end_time: row.get(6)?,
        })
    }

    fn into_booking(self) -> Result<Booking, DbError> {
        Ok(Booking {
            interview_id: self.interview_id,
            job_id: self.job_id,
            candidate_id: self.candidate_id,
            coordinator_id: self.coordinator_id,
            interviewer_id: self.interviewer_id,
            start_time: parse_timestamp(&self.start_time, "interviews.start_time")?,
            end_time: parse_timestamp(&self.end_time, "interviews.end_time")?,
        })
    }
}

fn parse_status(status: &str) -> Result<ApplicationStatus, DbError> {
    status.parse().map_err(|err| DbError::InvalidRow {
        table: "applications",
        message: format!("{err}"),
    })
}

fn parse_timestamp(value: &str, column: &'static str) -> Result<NaiveDateTime, DbError> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).map_err(|source| {
        DbError::TimestampParse {
            column,
            value: value.to_string(),
            source,
        }
    })
}

fn format_timestamp(timestamp: NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

fn now_timestamp() -> String {
    format_timestamp(Utc::now().naive_utc())
}
