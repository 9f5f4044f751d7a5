//! Schedule CSV, one draft per row.
//!
//! Only `title` is required; anything left blank is defaulted by the engine
//! at create time. Driver and vehicle columns accept either `driver_id` or
//! `assigned_driver_id` (likewise for vehicles). Clock columns accept
//! `09:00`, `9:00` or `0900`.

use std::io::Read;

use anyhow::Result;
use chrono::NaiveTime;
use haulplan_core::time::parse_clock;
use haulplan_core::{ScheduleDraft, SchedulePriority, ScheduleStatus, ScheduleType};
use serde::Deserialize;

use super::{label, opt, parse_flexible_date, read_rows, required, text};
use crate::types::{ImportKind, ImportReport};

#[derive(Debug, Deserialize)]
struct ScheduleRow {
    #[serde(default)]
    id: Option<String>,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    end_date: Option<String>,
    #[serde(default)]
    start_time: Option<String>,
    #[serde(default)]
    end_time: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    priority: Option<String>,
    #[serde(default, alias = "type")]
    schedule_type: Option<String>,
    #[serde(default, alias = "assigned_driver_id")]
    driver_id: Option<String>,
    #[serde(default, alias = "assigned_vehicle_id")]
    vehicle_id: Option<String>,
    #[serde(default)]
    origin: Option<String>,
    #[serde(default)]
    destination: Option<String>,
    #[serde(default)]
    estimated_hours: Option<f64>,
    #[serde(default)]
    estimated_distance: Option<f64>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    created_by: Option<String>,
}

fn to_draft(row: ScheduleRow) -> Result<ScheduleDraft> {
    let clock = |s: &str| -> Result<NaiveTime> { Ok(parse_clock(s)?) };

    let start_date = opt(row.start_date, parse_flexible_date)?;
    Ok(ScheduleDraft {
        id: text(row.id),
        title: Some(required(row.title, "title")?),
        description: text(row.description),
        start_date,
        end_date: opt(row.end_date, parse_flexible_date)?.or(start_date),
        start_time: opt(row.start_time, clock)?,
        end_time: opt(row.end_time, clock)?,
        status: opt(row.status, label::<ScheduleStatus>)?,
        priority: opt(row.priority, label::<SchedulePriority>)?,
        schedule_type: opt(row.schedule_type, label::<ScheduleType>)?,
        assigned_driver_id: text(row.driver_id),
        assigned_vehicle_id: text(row.vehicle_id),
        origin: text(row.origin),
        destination: text(row.destination),
        estimated_hours: row.estimated_hours,
        estimated_distance: row.estimated_distance,
        notes: text(row.notes),
        created_by: text(row.created_by),
        ..ScheduleDraft::default()
    })
}

pub fn parse_schedule_csv<R: Read>(input: R) -> Result<ImportReport<ScheduleDraft>> {
    read_rows(input, ImportKind::Schedules, to_draft)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn rows_become_drafts() {
        let csv = "\
title,start_date,start_time,end_time,type,priority,assigned_driver_id,vehicle_id,estimated_distance
Houston pickup,2025-01-06,0700,11:30,pickup,high,DRV-002,VAN-001,48.5
Yard check,1/7/2025,9:00,10:00,Inspection,,,,
Bad clock,2025-01-06,7am,09:00,,,,,
,2025-01-06,07:00,09:00,,,,,
";
        let report = parse_schedule_csv(csv.as_bytes()).unwrap();
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.skipped.len(), 2);

        let pickup = &report.records[0];
        assert_eq!(pickup.schedule_type, Some(ScheduleType::Pickup));
        assert_eq!(pickup.priority, Some(SchedulePriority::High));
        assert_eq!(pickup.assigned_driver_id.as_deref(), Some("DRV-002"));
        assert_eq!(pickup.end_date, pickup.start_date);
        assert_eq!(pickup.effective_hours(), 4.5);

        let yard = &report.records[1];
        assert_eq!(yard.start_date, NaiveDate::from_ymd_opt(2025, 1, 7));
        assert_eq!(yard.assigned_vehicle_id, None);
        assert_eq!(yard.priority, None);
    }
}
