//! Weekly views and fleet statistics.
//!
//! Cancelled schedules still show up in the daily buckets but contribute no
//! hours, miles or overlaps.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::overlap::overlapping_pairs;
use crate::policy::SchedulingPolicy;
use crate::resources::{DriverAvailability, VehicleAvailability};
use crate::schedule::{Schedule, ScheduleStatus};

/// Hours in a week; the denominator for vehicle utilization.
const HOURS_PER_WEEK: f64 = 7.0 * 24.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySchedule {
    pub date: NaiveDate,
    pub schedules: Vec<Schedule>,
    pub total_hours: f64,
    pub has_conflicts: bool,
    /// "A overlaps with B", one entry per overlapping pair.
    pub conflicts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverWeeklySchedule {
    pub driver_id: String,
    pub driver_name: String,
    pub schedules: Vec<DailySchedule>,
    pub total_hours: f64,
    pub hos_compliance: bool,
    /// Percent of `max_hours`, capped at 100.
    pub utilization: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleWeeklySchedule {
    pub vehicle_id: String,
    pub vehicle_name: String,
    pub schedules: Vec<DailySchedule>,
    pub total_miles: f64,
    /// Percent of the 168 hours in a week, capped at 100.
    pub utilization: f64,
    pub maintenance_alerts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyScheduleView {
    pub week_start_date: NaiveDate,
    pub week_end_date: NaiveDate,
    pub drivers: Vec<DriverWeeklySchedule>,
    pub vehicles: Vec<VehicleWeeklySchedule>,
    /// Week schedules missing a driver or a vehicle.
    pub unassigned_schedules: Vec<Schedule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleStatistics {
    pub total_schedules: usize,
    pub scheduled_count: usize,
    pub in_progress_count: usize,
    pub completed_count: usize,
    pub cancelled_count: usize,
    pub delayed_count: usize,
    pub utilization_rate: f64,
    pub compliance_rate: f64,
    pub on_time_performance: f64,
}

fn percent(part: f64, whole: f64) -> f64 {
    if whole <= 0.0 {
        return 0.0;
    }
    (part / whole * 100.0).min(100.0)
}

fn billable_hours<'a>(schedules: impl IntoIterator<Item = &'a Schedule>) -> f64 {
    schedules
        .into_iter()
        .filter(|s| s.holds_resources())
        .map(Schedule::effective_hours)
        .sum()
}

/// Seven buckets starting at `week_start`, each holding the schedules that
/// start that day.
pub fn daily_buckets(week_start: NaiveDate, schedules: &[&Schedule]) -> Vec<DailySchedule> {
    week_start
        .iter_days()
        .take(7)
        .map(|date| {
            let day: Vec<&Schedule> = schedules.iter().copied().filter(|s| s.start_date == date).collect();
            let live: Vec<&Schedule> = day.iter().copied().filter(|s| s.holds_resources()).collect();
            let conflicts: Vec<String> = overlapping_pairs(&live)
                .into_iter()
                .map(|(i, j)| format!("{} overlaps with {}", live[i].title, live[j].title))
                .collect();
            DailySchedule {
                date,
                total_hours: billable_hours(day.iter().copied()),
                has_conflicts: !conflicts.is_empty(),
                conflicts,
                schedules: day.into_iter().cloned().collect(),
            }
        })
        .collect()
}

pub fn weekly_view(
    week_start: NaiveDate,
    drivers: &[DriverAvailability],
    vehicles: &[VehicleAvailability],
    schedules: &[Schedule],
) -> WeeklyScheduleView {
    let week_end = week_start.checked_add_days(Days::new(6)).unwrap_or(NaiveDate::MAX);
    let week: Vec<&Schedule> = schedules
        .iter()
        .filter(|s| s.start_date >= week_start && s.start_date <= week_end)
        .collect();

    let drivers = drivers
        .iter()
        .map(|d| {
            let mine: Vec<&Schedule> = week
                .iter()
                .copied()
                .filter(|s| s.assigned_driver_id.as_deref() == Some(d.driver_id.as_str()))
                .collect();
            let total_hours = billable_hours(mine.iter().copied());
            DriverWeeklySchedule {
                driver_id: d.driver_id.clone(),
                driver_name: d.name.clone(),
                schedules: daily_buckets(week_start, &mine),
                total_hours,
                hos_compliance: d.hours_remaining > 0.0,
                utilization: percent(total_hours, d.max_hours),
            }
        })
        .collect();

    let vehicles = vehicles
        .iter()
        .map(|v| {
            let mine: Vec<&Schedule> = week
                .iter()
                .copied()
                .filter(|s| s.assigned_vehicle_id.as_deref() == Some(v.vehicle_id.as_str()))
                .collect();
            let total_miles: f64 = mine
                .iter()
                .filter(|s| s.holds_resources())
                .filter_map(|s| s.estimated_distance)
                .sum();
            VehicleWeeklySchedule {
                vehicle_id: v.vehicle_id.clone(),
                vehicle_name: v.name.clone(),
                schedules: daily_buckets(week_start, &mine),
                total_miles,
                utilization: percent(billable_hours(mine.iter().copied()), HOURS_PER_WEEK),
                maintenance_alerts: v.maintenance_alerts(),
            }
        })
        .collect();

    let unassigned_schedules = week
        .iter()
        .copied()
        .filter(|s| !s.is_fully_assigned())
        .cloned()
        .collect();

    WeeklyScheduleView {
        week_start_date: week_start,
        week_end_date: week_end,
        drivers,
        vehicles,
        unassigned_schedules,
    }
}

pub fn statistics(schedules: &[Schedule], driver_count: usize, policy: &SchedulingPolicy) -> ScheduleStatistics {
    let count = |status: ScheduleStatus| schedules.iter().filter(|s| s.status == status).count();

    let capacity = driver_count as f64 * policy.weekly_capacity_hours;
    let utilization_rate = percent(billable_hours(schedules), capacity);

    let compliance_rate = if schedules.is_empty() {
        100.0
    } else {
        let compliant = schedules.iter().filter(|s| s.is_compliant()).count();
        compliant as f64 / schedules.len() as f64 * 100.0
    };

    let completed: Vec<&Schedule> = schedules
        .iter()
        .filter(|s| s.status == ScheduleStatus::Completed)
        .collect();
    let on_time_performance = if completed.is_empty() {
        100.0
    } else {
        let on_time = completed
            .iter()
            .filter(|s| s.completed_at.is_none_or(|done| done <= s.ends_at()))
            .count();
        on_time as f64 / completed.len() as f64 * 100.0
    };

    ScheduleStatistics {
        total_schedules: schedules.len(),
        scheduled_count: count(ScheduleStatus::Scheduled),
        in_progress_count: count(ScheduleStatus::InProgress),
        completed_count: count(ScheduleStatus::Completed),
        cancelled_count: count(ScheduleStatus::Cancelled),
        delayed_count: count(ScheduleStatus::Delayed),
        utilization_rate,
        compliance_rate,
        on_time_performance,
    }
}
