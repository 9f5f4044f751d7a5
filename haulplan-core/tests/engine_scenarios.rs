use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use haulplan_core::{
    ConflictType, DriverAvailability, FixedClock, InMemoryRepository, ScheduleDraft, ScheduleFilter,
    ScheduleRepository, ScheduleStatus, SchedulingEngine, SchedulingPolicy, VehicleStatus,
};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn at(s: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s, "%H:%M").unwrap()
}

fn engine() -> SchedulingEngine<InMemoryRepository> {
    let now = Utc.with_ymd_and_hms(2025, 1, 2, 15, 0, 0).unwrap();
    SchedulingEngine::new(InMemoryRepository::seeded(), SchedulingPolicy::default())
        .with_clock(Arc::new(FixedClock(now)))
}

fn run(title: &str, day: &str, start: &str, end: &str) -> ScheduleDraft {
    ScheduleDraft::new(title).on(date(day)).between(at(start), at(end))
}

async fn hours_remaining(engine: &SchedulingEngine<InMemoryRepository>, driver_id: &str) -> f64 {
    engine
        .get_driver_availability(Some(driver_id))
        .await
        .unwrap()
        .first()
        .map(|d| d.hours_remaining)
        .unwrap()
}

#[tokio::test]
async fn hos_hours_are_conserved_across_create_update_delete() {
    let engine = engine();
    let before = hours_remaining(&engine, "DRV-002").await;
    assert_eq!(before, 32.0);

    let created = engine
        .create_schedule(run("Ontario shuttle", "2025-01-06", "08:00", "14:00").with_driver("DRV-002"))
        .await
        .unwrap();
    assert!(created.success, "{:?}", created.conflicts);
    let id = created.schedule.unwrap().id;
    assert_eq!(hours_remaining(&engine, "DRV-002").await, 26.0);

    // Re-saving the same hours many times must not drift.
    for _ in 0..5 {
        let outcome = engine
            .update_schedule(&id, ScheduleDraft::default().with_hours(6.0))
            .await
            .unwrap();
        assert!(outcome.success);
    }
    assert_eq!(hours_remaining(&engine, "DRV-002").await, 26.0);

    // Shrinking the job hands hours back.
    engine
        .update_schedule(&id, ScheduleDraft::default().with_hours(4.0))
        .await
        .unwrap();
    assert_eq!(hours_remaining(&engine, "DRV-002").await, 28.0);

    assert!(engine.delete_schedule(&id).await.unwrap());
    assert_eq!(hours_remaining(&engine, "DRV-002").await, before);
    assert!(!engine.delete_schedule(&id).await.unwrap());
}

#[tokio::test]
async fn reassigning_a_driver_moves_the_hours() {
    let engine = engine();
    let outcome = engine
        .update_schedule("SCH-001", ScheduleDraft::default().with_driver("DRV-002"))
        .await
        .unwrap();
    assert!(outcome.success, "{:?}", outcome.conflicts);
    assert_eq!(outcome.schedule.unwrap().driver_name.as_deref(), Some("Sarah Wilson"));

    assert_eq!(hours_remaining(&engine, "DRV-001").await, 33.0);
    assert_eq!(hours_remaining(&engine, "DRV-002").await, 24.0);
}

#[tokio::test]
async fn cancelling_releases_and_keeps_the_record() {
    let engine = engine();
    let outcome = engine
        .update_schedule("SCH-001", ScheduleDraft::default().with_status(ScheduleStatus::Cancelled))
        .await
        .unwrap();
    assert!(outcome.success);
    assert_eq!(hours_remaining(&engine, "DRV-001").await, 33.0);

    // A cancelled slot no longer blocks the driver.
    let reuse = engine
        .create_schedule(run("Backfill", "2025-01-03", "09:00", "12:00").with_driver("DRV-001"))
        .await
        .unwrap();
    assert!(reuse.success, "{:?}", reuse.conflicts);
    assert_eq!(engine.get_schedules(None).await.unwrap().len(), 3);
}

#[tokio::test]
async fn end_before_start_is_rejected_and_nothing_is_stored() {
    let engine = engine();
    let outcome = engine
        .create_schedule(run("Backwards", "2025-01-06", "17:00", "09:00").with_driver("DRV-002"))
        .await
        .unwrap();

    assert!(!outcome.success);
    assert!(outcome.schedule.is_none());
    assert_eq!(outcome.conflicts.len(), 1);
    assert_eq!(outcome.conflicts[0].conflict_type, ConflictType::TimeOverlap);
    assert_eq!(engine.get_schedules(None).await.unwrap().len(), 2);
    assert_eq!(hours_remaining(&engine, "DRV-002").await, 32.0);
}

#[tokio::test]
async fn short_driver_gets_one_hos_violation() {
    let engine = engine();
    engine
        .repository()
        .save_driver(&DriverAvailability::new("DRV-009", "Dana Low", 55.0, 60.0))
        .await
        .unwrap();

    let outcome = engine
        .create_schedule(
            run("Long haul", "2025-01-07", "06:00", "14:00")
                .with_driver("DRV-009")
                .with_hours(8.0),
        )
        .await
        .unwrap();

    assert!(!outcome.success);
    let hos: Vec<_> = outcome
        .conflicts
        .iter()
        .filter(|c| c.conflict_type == ConflictType::HosViolation)
        .collect();
    assert_eq!(hos.len(), 1);
    assert!(hos[0].message.contains("Dana Low"));
    assert!(hos[0].message.contains("5h available, 8h needed"));
}

#[tokio::test]
async fn second_booking_of_a_vehicle_is_refused() {
    let engine = engine();
    let first = engine
        .create_schedule(run("Morning drop", "2025-01-08", "08:00", "12:00").with_vehicle("VAN-001"))
        .await
        .unwrap();
    assert!(first.success);

    let second = engine
        .create_schedule(run("Overlapping drop", "2025-01-08", "11:00", "13:00").with_vehicle("VAN-001"))
        .await
        .unwrap();
    assert!(!second.success);
    assert_eq!(second.conflicts[0].conflict_type, ConflictType::DoubleBooking);
    assert!(second.conflicts[0]
        .affected_schedules
        .contains(&first.schedule.unwrap().id));

    // Back-to-back is fine.
    let third = engine
        .create_schedule(run("Afternoon drop", "2025-01-08", "12:00", "15:00").with_vehicle("VAN-001"))
        .await
        .unwrap();
    assert!(third.success);
}

#[tokio::test]
async fn revalidating_stored_schedules_finds_no_self_conflict() {
    let engine = engine();
    for s in engine.get_schedules(None).await.unwrap() {
        let v = engine.validate_schedule(&s).await.unwrap();
        assert!(!v.has(ConflictType::DoubleBooking), "{}", s.id);
        assert!(v.is_valid, "{}: {:?}", s.id, v.conflicts);
    }
}

#[tokio::test]
async fn rejected_update_changes_nothing() {
    let engine = engine();
    let before = engine.repository().snapshot().await;

    // TRK-001 is already booked on SCH-001; move SCH-002 onto it.
    let outcome = engine
        .update_schedule(
            "SCH-002",
            ScheduleDraft {
                start_date: Some(date("2025-01-03")),
                end_date: Some(date("2025-01-03")),
                assigned_vehicle_id: Some("TRK-001".into()),
                ..ScheduleDraft::default()
            },
        )
        .await
        .unwrap();
    assert!(!outcome.success);
    assert_eq!(engine.repository().snapshot().await, before);

    let missing = engine
        .update_schedule("SCH-404", ScheduleDraft::default())
        .await
        .unwrap();
    assert!(!missing.success);
    assert!(missing.conflicts.is_empty());
}

#[tokio::test]
async fn filter_and_sort() {
    let engine = engine();
    engine
        .create_schedule(run("Early bird", "2025-01-03", "05:00", "07:00").with_vehicle("VAN-001"))
        .await
        .unwrap();

    let all = engine.get_schedules(None).await.unwrap();
    let order: Vec<_> = all.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(
        order,
        vec![
            "Early bird",
            "Delivery to Austin Distribution Center",
            "Vehicle Maintenance - TRK-002"
        ]
    );
    assert!(all.windows(2).all(|w| w[0].starts_at() <= w[1].starts_at()));

    let by_driver = ScheduleFilter {
        assigned_driver_id: Some("DRV-001".into()),
        ..ScheduleFilter::default()
    };
    let hits = engine.get_schedules(Some(&by_driver)).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "SCH-001");

    let by_search = ScheduleFilter {
        search_term: Some("ford transit".into()),
        ..ScheduleFilter::default()
    };
    let hits = engine.get_schedules(Some(&by_search)).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Early bird");

    let started = engine
        .update_schedule("SCH-001", ScheduleDraft::default().with_status(ScheduleStatus::InProgress))
        .await
        .unwrap();
    assert!(started.success);

    let scheduled_only = ScheduleFilter::default().with_status(ScheduleStatus::Scheduled);
    let hits = engine.get_schedules(Some(&scheduled_only)).await.unwrap();
    let ids: Vec<_> = hits.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(ids, vec!["Early bird", "Vehicle Maintenance - TRK-002"]);
    assert!(hits.windows(2).all(|w| w[0].starts_at() <= w[1].starts_at()));

    let in_progress = ScheduleFilter::default().with_status(ScheduleStatus::InProgress);
    let hits = engine.get_schedules(Some(&in_progress)).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "SCH-001");
}

#[tokio::test]
async fn concurrent_creates_cannot_overbook_a_driver() {
    let engine = engine();
    engine
        .repository()
        .save_driver(&DriverAvailability::new("DRV-010", "Riley Race", 50.0, 60.0))
        .await
        .unwrap();

    let a = run("Leg A", "2025-01-09", "06:00", "12:00").with_driver("DRV-010");
    let b = run("Leg B", "2025-01-10", "06:00", "12:00").with_driver("DRV-010");
    let (ra, rb) = tokio::join!(engine.create_schedule(a), engine.create_schedule(b));

    let successes = [ra.unwrap(), rb.unwrap()].iter().filter(|o| o.success).count();
    assert_eq!(successes, 1);
    assert_eq!(hours_remaining(&engine, "DRV-010").await, 4.0);
}

#[tokio::test]
async fn availability_for_a_draft_window() {
    let engine = engine();
    let candidate = run("candidate", "2025-01-03", "10:00", "12:00");

    let drivers = engine.get_available_drivers_for_schedule(&candidate).await.unwrap();
    let ids: Vec<_> = drivers.iter().map(|d| d.driver_id.as_str()).collect();
    assert_eq!(ids, vec!["DRV-002", "DRV-003"]);

    let vehicles = engine.get_available_vehicles_for_schedule(&candidate).await.unwrap();
    let ids: Vec<_> = vehicles.iter().map(|v| v.vehicle_id.as_str()).collect();
    assert_eq!(ids, vec!["VAN-001"]);
}

#[tokio::test]
async fn weekly_view_and_statistics_follow_mutations() {
    let engine = engine();
    engine
        .update_schedule("SCH-001", ScheduleDraft::default().with_status(ScheduleStatus::InProgress))
        .await
        .unwrap();
    let truck = engine.get_vehicle_availability(Some("TRK-001")).await.unwrap();
    assert_eq!(truck[0].status, VehicleStatus::InUse);

    let view = engine.get_weekly_schedule_view(date("2024-12-30")).await.unwrap();
    assert_eq!(view.drivers.len(), 3);
    assert_eq!(view.vehicles.len(), 3);
    assert_eq!(view.drivers[0].total_hours, 8.0);

    let stats = engine.get_schedule_statistics().await.unwrap();
    assert_eq!(stats.total_schedules, 2);
    assert_eq!(stats.in_progress_count, 1);
    assert_eq!(stats.scheduled_count, 1);
}
