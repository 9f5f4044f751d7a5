//! Text and JSON rendering for CLI results.

use anyhow::{Context, Result};
use haulplan_core::time::format_clock;
use haulplan_core::{
    DriverAvailability, Schedule, ScheduleConflict, ScheduleOutcome, ScheduleStatistics, VehicleAvailability,
    WeeklyScheduleView,
};
use haulplan_ingest::SkippedRow;
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value).context("serialize output")?;
    println!("{s}");
    Ok(())
}

pub fn schedule_line(s: &Schedule) -> String {
    let window = if s.start_date == s.end_date {
        format!("{} {}-{}", s.start_date, format_clock(s.start_time), format_clock(s.end_time))
    } else {
        format!(
            "{} {} -> {} {}",
            s.start_date,
            format_clock(s.start_time),
            s.end_date,
            format_clock(s.end_time)
        )
    };
    format!(
        "{:<12} {:<28} {:<12} {:<7} {:<11} driver={} vehicle={} | {}",
        s.id,
        window,
        s.status,
        s.priority,
        s.schedule_type,
        s.driver_name.as_deref().or(s.assigned_driver_id.as_deref()).unwrap_or("-"),
        s.vehicle_name.as_deref().or(s.assigned_vehicle_id.as_deref()).unwrap_or("-"),
        s.title
    )
}

pub fn print_schedules(schedules: &[Schedule]) {
    if schedules.is_empty() {
        println!("(no schedules)");
        return;
    }
    for s in schedules {
        println!("{}", schedule_line(s));
    }
}

pub fn print_schedule_detail(s: &Schedule) {
    println!("{}", schedule_line(s));
    if let Some(d) = &s.description {
        println!("  description: {d}");
    }
    if s.origin.is_some() || s.destination.is_some() {
        println!(
            "  route: {} -> {}",
            s.origin.as_deref().unwrap_or("?"),
            s.destination.as_deref().unwrap_or("?")
        );
    }
    println!("  hours: {:.2}", s.effective_hours());
    if let Some(miles) = s.estimated_distance {
        println!("  distance: {miles:.1} mi");
    }
    if let Some(notes) = &s.notes {
        println!("  notes: {notes}");
    }
    println!("  created by {} at {}", s.created_by, s.created_at.to_rfc3339());
    if let Some(done) = s.completed_at {
        println!("  completed at {done}");
    }
}

fn print_conflict(c: &ScheduleConflict) {
    println!(
        "  [{:?}] {:?}: {} (schedules: {})",
        c.severity,
        c.conflict_type,
        c.message,
        c.affected_schedules.join(", ")
    );
    for hint in &c.suggestions {
        println!("      - {hint}");
    }
}

pub fn print_outcome(verb: &str, outcome: &ScheduleOutcome) {
    match &outcome.schedule {
        Some(s) if outcome.success => println!("{verb} {}", schedule_line(s)),
        _ if outcome.conflicts.is_empty() => println!("Not found"),
        _ => println!("Rejected:"),
    }
    for c in &outcome.conflicts {
        print_conflict(c);
    }
    for w in &outcome.warnings {
        println!("  warning: {w}");
    }
    for r in &outcome.recommendations {
        println!("  recommendation: {r}");
    }
}

pub fn driver_line(d: &DriverAvailability) -> String {
    format!(
        "{:<8} {:<16} {:<10} {:>5.1}/{:<5.1}h left={:<5.1} license={} ({}) eld={}{}",
        d.driver_id,
        d.name,
        d.status,
        d.current_hours,
        d.max_hours,
        d.hours_remaining,
        d.license_status,
        d.license_expiry,
        d.eld_status,
        if d.has_conflict { " CONFLICT" } else { "" }
    )
}

pub fn vehicle_line(v: &VehicleAvailability) -> String {
    let alerts = v.maintenance_alerts();
    format!(
        "{:<8} {:<28} {:<6} {:<14} {:>7} mi fuel={:>3}% inspection={}{}",
        v.vehicle_id,
        v.name,
        v.vehicle_type,
        v.status,
        v.current_mileage,
        v.fuel_level,
        v.inspection_status,
        if alerts.is_empty() {
            String::new()
        } else {
            format!(" alerts: {}", alerts.join("; "))
        }
    )
}

pub fn print_week(view: &WeeklyScheduleView) {
    println!("# Week {} .. {}\n", view.week_start_date, view.week_end_date);

    println!("## Drivers");
    for d in &view.drivers {
        println!(
            "{} ({}): {:.1}h, utilization {:.0}%{}",
            d.driver_name,
            d.driver_id,
            d.total_hours,
            d.utilization,
            if d.hos_compliance { "" } else { ", OUT OF HOURS" }
        );
        for day in d.schedules.iter().filter(|day| !day.schedules.is_empty()) {
            println!("  {} {:.1}h", day.date.format("%a %m-%d"), day.total_hours);
            for s in &day.schedules {
                println!("    {}", schedule_line(s));
            }
            for c in &day.conflicts {
                println!("    ! {c}");
            }
        }
    }

    println!("\n## Vehicles");
    for v in &view.vehicles {
        println!(
            "{} ({}): {:.0} mi, utilization {:.0}%",
            v.vehicle_name, v.vehicle_id, v.total_miles, v.utilization
        );
        for alert in &v.maintenance_alerts {
            println!("  alert: {alert}");
        }
        for day in v.schedules.iter().filter(|day| !day.schedules.is_empty()) {
            println!("  {}", day.date.format("%a %m-%d"));
            for s in &day.schedules {
                println!("    {}", schedule_line(s));
            }
            for c in &day.conflicts {
                println!("    ! {c}");
            }
        }
    }

    if !view.unassigned_schedules.is_empty() {
        println!("\n## Unassigned");
        print_schedules(&view.unassigned_schedules);
    }
}

pub fn print_stats(stats: &ScheduleStatistics) {
    println!("Schedules:     {}", stats.total_schedules);
    println!("  Scheduled:   {}", stats.scheduled_count);
    println!("  In Progress: {}", stats.in_progress_count);
    println!("  Completed:   {}", stats.completed_count);
    println!("  Cancelled:   {}", stats.cancelled_count);
    println!("  Delayed:     {}", stats.delayed_count);
    println!("Utilization:   {:.1}%", stats.utilization_rate);
    println!("Compliance:    {:.1}%", stats.compliance_rate);
    println!("On time:       {:.1}%", stats.on_time_performance);
}

pub fn print_skipped(skipped: &[SkippedRow]) {
    for row in skipped {
        println!("  skipped line {}: {}", row.line, row.reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use haulplan_core::fixtures;

    #[test]
    fn schedule_line_shows_window_and_names() {
        let s = &fixtures::schedules()[0];
        let line = schedule_line(s);
        assert!(line.starts_with("SCH-001"));
        assert!(line.contains("2025-01-03 08:00-16:00"));
        assert!(line.contains("driver=John Smith"));
        assert!(line.contains("Delivery to Austin Distribution Center"));
    }

    #[test]
    fn vehicle_line_lists_alerts() {
        let trk = &fixtures::vehicles()[1];
        assert!(vehicle_line(trk).contains("alerts: Inspection due soon"));
    }
}
