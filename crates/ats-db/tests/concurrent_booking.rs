//! Concurrent booking attempts against one database file.
//!
//! Each thread opens its own connection and races random bookings for the
//! same interviewer and candidate. Whatever interleaving SQLite picks, the
//! committed set must be pairwise non-overlapping.

use std::path::Path;
use std::thread;

use ats_core::store::BookingStore;
use ats_core::{Booking, CommitOutcome, NewBooking, TimeRange};
use ats_db::{Database, NewJob, NewUser};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::Rng;
use tempfile::TempDir;

const THREADS: usize = 8;
const ATTEMPTS_PER_THREAD: usize = 12;

struct Seed {
    recruiter: i64,
    manager: i64,
    candidates: Vec<i64>,
    job: i64,
}

fn seed(path: &Path) -> Seed {
    let mut db = Database::open(path).expect("open db");
    let mut user = |name: &str| {
        db.add_user(&NewUser {
            first_name: name.to_string(),
            last_name: "Racer".to_string(),
            email: None,
        })
        .expect("add user")
    };
    let recruiter = user("Alice");
    let manager = user("Sarah");
    let candidates = vec![user("Cara"), user("Omar"), user("Lena")];
    let job = db
        .add_job(&NewJob {
            title: "SRE".to_string(),
            company: "Acme".to_string(),
            coordinator_id: recruiter,
        })
        .expect("add job");
    Seed {
        recruiter,
        manager,
        candidates,
        job,
    }
}

fn day_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2030, 1, 7)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap()
}

fn random_attempt(rng: &mut impl Rng, seed: &Seed) -> NewBooking {
    // Starts every 10 minutes across three hours, 30 minute interviews, so
    // most pairs of attempts overlap.
    let offset = Duration::minutes(10 * rng.random_range(0..18_i64));
    let start = day_start() + offset;
    let candidate = seed.candidates[rng.random_range(0..seed.candidates.len())];
    let interviewer_id = if rng.random_bool(0.8) {
        Some(seed.manager)
    } else {
        None
    };
    NewBooking {
        job_id: seed.job,
        candidate_id: candidate,
        coordinator_id: seed.recruiter,
        interviewer_id,
        slot: TimeRange::starting_at(start, Duration::minutes(30)).unwrap(),
    }
}

fn assert_pairwise_free(bookings: &[Booking]) {
    for (i, a) in bookings.iter().enumerate() {
        for b in &bookings[i + 1..] {
            let shares_person = a.candidate_id == b.candidate_id
                || a.involves(b.effective_interviewer())
                || b.involves(a.effective_interviewer());
            assert!(
                !(shares_person && a.slot().overlaps(&b.slot())),
                "double booking: {a:?} and {b:?}"
            );
        }
    }
}

#[test]
fn concurrent_commits_never_double_book() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("ats.db");
    let seed = seed(&path);

    let committed: usize = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let path = path.as_path();
                let seed = &seed;
                scope.spawn(move || {
                    let mut db = Database::open(path).expect("open db in thread");
                    let mut rng = rand::rng();
                    let mut committed = 0;
                    for _ in 0..ATTEMPTS_PER_THREAD {
                        let attempt = random_attempt(&mut rng, seed);
                        match db.commit_booking(&attempt).expect("commit attempt") {
                            CommitOutcome::Committed(_) => committed += 1,
                            CommitOutcome::Conflict(existing) => {
                                assert!(existing.slot().overlaps(&attempt.slot));
                            }
                        }
                    }
                    committed
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("booking thread panicked"))
            .sum()
    });

    let db = Database::open(&path).unwrap();
    let bookings = db.list_interviews().unwrap();
    assert_eq!(bookings.len(), committed);
    assert!(!bookings.is_empty());
    assert_pairwise_free(&bookings);
}

#[test]
fn racing_for_one_slot_has_exactly_one_winner() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("ats.db");
    let seed = seed(&path);

    let winners: usize = thread::scope(|scope| {
        let handles: Vec<_> = seed
            .candidates
            .iter()
            .cycle()
            .take(THREADS)
            .map(|&candidate| {
                let path = path.as_path();
                let seed = &seed;
                scope.spawn(move || {
                    let mut db = Database::open(path).expect("open db in thread");
                    let attempt = NewBooking {
                        job_id: seed.job,
                        candidate_id: candidate,
                        coordinator_id: seed.recruiter,
                        interviewer_id: Some(seed.manager),
                        slot: TimeRange::starting_at(day_start(), Duration::minutes(30)).unwrap(),
                    };
                    usize::from(matches!(
                        db.commit_booking(&attempt).expect("commit attempt"),
                        CommitOutcome::Committed(_)
                    ))
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("booking thread panicked"))
            .sum()
    });

    assert_eq!(winners, 1);
    let db = Database::open(&path).unwrap();
    assert_eq!(db.list_interviews().unwrap().len(), 1);
}
