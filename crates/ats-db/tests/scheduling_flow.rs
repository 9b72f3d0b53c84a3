//! Slot search and booking through the scheduler on a real database.

use ats_core::{
    ApplicationStatus, AvailabilityRule, BookingRequest, NoopNotifier, ScheduleError, Scheduler,
    SchedulingPolicy, SlotQuery, Weekday, WeeklyAvailability,
};
use ats_db::{Database, NewJob, NewUser};
use chrono::{NaiveDate, NaiveDateTime};

struct Ids {
    recruiter: i64,
    manager: i64,
    candidate: i64,
    other_candidate: i64,
    job: i64,
}

// 2030-01-07 is a Monday, comfortably in the future.
fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 1, 7).unwrap()
}

fn at(hour: u32, minute: u32) -> NaiveDateTime {
    monday().and_hms_opt(hour, minute, 0).unwrap()
}

fn setup() -> (Scheduler<Database, NoopNotifier>, Ids) {
    let mut db = Database::open_in_memory().unwrap();
    let mut user = |name: &str| {
        db.add_user(&NewUser {
            first_name: name.to_string(),
            last_name: "Example".to_string(),
            email: Some(format!("{}@example.com", name.to_lowercase())),
        })
        .unwrap()
    };
    let recruiter = user("Alice");
    let manager = user("Sarah");
    let candidate = user("Cara");
    let other_candidate = user("Omar");
    let job = db
        .add_job(&NewJob {
            title: "Data Engineer".to_string(),
            company: "Globex".to_string(),
            coordinator_id: recruiter,
        })
        .unwrap();
    db.add_application(candidate, job).unwrap();
    db.add_application(other_candidate, job).unwrap();

    let mut scheduler = Scheduler::new(db, NoopNotifier, SchedulingPolicy::default());
    scheduler
        .set_availability(&WeeklyAvailability::new(
            manager,
            vec![AvailabilityRule::parse(Weekday::Monday, "09:00", "17:00").unwrap()],
        ))
        .unwrap();
    (
        scheduler,
        Ids {
            recruiter,
            manager,
            candidate,
            other_candidate,
            job,
        },
    )
}

fn query(ids: &Ids, candidate: i64) -> SlotQuery {
    SlotQuery {
        interviewer_id: ids.manager,
        candidate_id: candidate,
        start_date: monday(),
        end_date: monday(),
        duration_minutes: 30,
    }
}

fn request(ids: &Ids, candidate: i64, start: NaiveDateTime) -> BookingRequest {
    BookingRequest {
        job_id: ids.job,
        candidate_id: candidate,
        coordinator_id: ids.recruiter,
        interviewer_id: Some(ids.manager),
        start_time: start,
        end_time: None,
    }
}

#[test]
fn monday_availability_offers_sixteen_slots() {
    let (scheduler, ids) = setup();
    let slots = scheduler.find_open_slots(&query(&ids, ids.candidate)).unwrap();
    let expected: Vec<_> = (0..16)
        .map(|i| at(9, 0) + chrono::Duration::minutes(30 * i))
        .collect();
    assert_eq!(slots, expected);
}

#[test]
fn overlapping_booking_conflicts_and_adjacent_succeeds() {
    let (mut scheduler, ids) = setup();
    scheduler
        .book_interview(&request(&ids, ids.candidate, at(10, 0)))
        .unwrap();

    let mut overlapping = request(&ids, ids.other_candidate, at(10, 15));
    overlapping.end_time = Some(at(10, 45));
    assert!(matches!(
        scheduler.book_interview(&overlapping),
        Err(ScheduleError::SlotConflict { .. })
    ));

    let mut adjacent = request(&ids, ids.other_candidate, at(10, 30));
    adjacent.end_time = Some(at(11, 0));
    let booking = scheduler.book_interview(&adjacent).unwrap();
    assert_eq!(booking.end_time, at(11, 0));
}

#[test]
fn booking_moves_application_to_interviewing() {
    let (mut scheduler, ids) = setup();
    scheduler
        .book_interview(&request(&ids, ids.candidate, at(9, 0)))
        .unwrap();
    let app = scheduler
        .store()
        .application(ids.candidate, ids.job)
        .unwrap()
        .unwrap();
    assert_eq!(app.status, ApplicationStatus::Interviewing);
}

#[test]
fn offered_slots_are_bookable_and_then_disappear() {
    let (mut scheduler, ids) = setup();
    scheduler
        .book_interview(&request(&ids, ids.candidate, at(13, 0)))
        .unwrap();

    let q = query(&ids, ids.other_candidate);
    let before = scheduler.find_open_slots(&q).unwrap();
    assert_eq!(before, scheduler.find_open_slots(&q).unwrap());
    assert!(!before.contains(&at(13, 0)));
    assert_eq!(before.len(), 15);

    let chosen = before[3];
    scheduler
        .book_interview(&request(&ids, ids.other_candidate, chosen))
        .unwrap();
    let after = scheduler.find_open_slots(&q).unwrap();
    assert_eq!(after.len(), 14);
    assert!(!after.contains(&chosen));
}

#[test]
fn stale_slot_is_rejected_at_commit() {
    let (mut scheduler, ids) = setup();
    let slots = scheduler
        .find_open_slots(&query(&ids, ids.candidate))
        .unwrap();
    let stale = slots[0];

    scheduler
        .book_interview(&request(&ids, ids.other_candidate, stale))
        .unwrap();
    assert!(matches!(
        scheduler.book_interview(&request(&ids, ids.candidate, stale)),
        Err(ScheduleError::SlotConflict { .. })
    ));
}

#[test]
fn past_slots_are_never_offered() {
    let (scheduler, ids) = setup();
    let slots = scheduler
        .find_open_slots_at(&query(&ids, ids.candidate), at(12, 10))
        .unwrap();
    assert_eq!(slots.first(), Some(&at(12, 30)));
    assert!(slots.iter().all(|slot| *slot > at(12, 10)));
    assert_eq!(slots.len(), 9);
}

#[test]
fn wide_range_is_capped() {
    let (scheduler, ids) = setup();
    let mut q = query(&ids, ids.candidate);
    q.end_date = monday() + chrono::Duration::days(365);
    assert!(matches!(
        scheduler.find_open_slots(&q),
        Err(ScheduleError::InvalidRange(_))
    ));

    let (relaxed, ids) = {
        let (scheduler, ids) = setup();
        let (db, notifier) = scheduler.into_parts();
        let policy = SchedulingPolicy {
            max_range_days: 400,
            ..SchedulingPolicy::default()
        };
        (Scheduler::new(db, notifier, policy), ids)
    };
    let mut q = query(&ids, ids.candidate);
    q.end_date = monday() + chrono::Duration::days(365);
    // 53 Mondays between 2030-01-07 and 2031-01-07 inclusive.
    assert_eq!(relaxed.find_open_slots(&q).unwrap().len(), 53 * 16);
}

#[test]
fn sub_second_starts_are_rejected_before_storage() {
    let (mut scheduler, ids) = setup();
    let first = at(10, 0) + chrono::Duration::microseconds(900);
    assert!(matches!(
        scheduler.book_interview(&request(&ids, ids.candidate, first)),
        Err(ScheduleError::InvalidRange(_))
    ));
    let second = at(10, 30) + chrono::Duration::microseconds(100);
    assert!(matches!(
        scheduler.book_interview(&request(&ids, ids.other_candidate, second)),
        Err(ScheduleError::InvalidRange(_))
    ));
    assert!(scheduler.store().list_interviews().unwrap().is_empty());
}

#[test]
fn returned_booking_matches_stored_row() {
    let (mut scheduler, ids) = setup();
    let booking = scheduler
        .book_interview(&request(&ids, ids.candidate, at(10, 0)))
        .unwrap();
    assert_eq!(scheduler.store().list_interviews().unwrap(), vec![booking]);
}

#[test]
fn short_query_never_offers_unbookable_starts() {
    let (mut scheduler, ids) = setup();
    scheduler
        .book_interview(&request(&ids, ids.candidate, at(10, 30)))
        .unwrap();

    let mut short = query(&ids, ids.other_candidate);
    short.duration_minutes = 15;
    let slots = scheduler.find_open_slots(&short).unwrap();
    assert!(slots.contains(&at(10, 0)));
    assert!(!slots.contains(&at(10, 15)));
    assert!(!slots.contains(&at(10, 45)));
    assert!(slots.contains(&at(11, 0)));

    for start in [at(10, 0), at(11, 0)] {
        let booking = scheduler
            .book_interview(&request(&ids, ids.other_candidate, start))
            .unwrap();
        assert_eq!(booking.end_time, start + chrono::Duration::minutes(30));
    }
}
