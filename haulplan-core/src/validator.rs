//! Validator: business rules over a candidate schedule.
//!
//! Every check runs; nothing short-circuits, so the operator sees the full
//! list of problems at once:
//! 1. window sanity (end after start)
//! 2. driver hours-of-service
//! 3. driver license
//! 4. driver double-booking
//! 5. vehicle inspection
//! 6. vehicle double-booking
//!
//! Checks 2-6 are skipped for cancelled schedules, which hold no resources.

use crate::conflict::{ConflictType, ScheduleConflict, ScheduleValidation};
use crate::overlap::colliding;
use crate::policy::SchedulingPolicy;
use crate::resources::{DriverAvailability, InspectionStatus, LicenseStatus, VehicleAvailability};
use crate::schedule::Schedule;

/// Read-only view of the stores a validation runs against.
#[derive(Debug, Clone, Copy)]
pub struct ResourceView<'a> {
    pub drivers: &'a [DriverAvailability],
    pub vehicles: &'a [VehicleAvailability],
    /// Stored schedules, possibly including the stored version of the candidate.
    pub schedules: &'a [Schedule],
}

impl<'a> ResourceView<'a> {
    pub fn driver(&self, id: &str) -> Option<&'a DriverAvailability> {
        self.drivers.iter().find(|d| d.driver_id == id)
    }

    pub fn vehicle(&self, id: &str) -> Option<&'a VehicleAvailability> {
        self.vehicles.iter().find(|v| v.vehicle_id == id)
    }

    fn stored(&self, id: &str) -> Option<&'a Schedule> {
        self.schedules.iter().find(|s| s.id == id)
    }
}

/// Round to two decimals for messages ("5h", "7.5h").
pub(crate) fn fmt_hours(h: f64) -> String {
    format!("{}", (h * 100.0).round() / 100.0)
}

pub fn validate_schedule(
    candidate: &Schedule,
    view: &ResourceView<'_>,
    policy: &SchedulingPolicy,
) -> ScheduleValidation {
    let mut conflicts = Vec::new();
    let mut warnings = Vec::new();
    let mut recommendations = Vec::new();
    let id = candidate.id.as_str();

    if candidate.ends_at() <= candidate.starts_at() {
        conflicts.push(ScheduleConflict::error(
            ConflictType::TimeOverlap,
            "End time must be after start time",
            id,
            &["Adjust the end time to be later than the start time"],
        ));
    }

    if candidate.holds_resources() {
        if let Some(driver) = candidate.assigned_driver_id.as_deref().and_then(|d| view.driver(d)) {
            check_driver(candidate, driver, view, policy, &mut conflicts, &mut warnings, &mut recommendations);
        }
        if let Some(vehicle) = candidate.assigned_vehicle_id.as_deref().and_then(|v| view.vehicle(v)) {
            check_vehicle(candidate, vehicle, view, &mut conflicts, &mut warnings);
        }
    }

    ScheduleValidation::from_parts(conflicts, warnings, recommendations)
}

fn check_driver(
    candidate: &Schedule,
    driver: &DriverAvailability,
    view: &ResourceView<'_>,
    policy: &SchedulingPolicy,
    conflicts: &mut Vec<ScheduleConflict>,
    warnings: &mut Vec<String>,
    recommendations: &mut Vec<String>,
) {
    let id = candidate.id.as_str();
    let needed = candidate.effective_hours();

    // Hours the stored version of this schedule already holds on the same
    // driver are handed back before comparing.
    let credited = view
        .stored(id)
        .filter(|prev| prev.holds_resources())
        .filter(|prev| prev.assigned_driver_id.as_deref() == Some(driver.driver_id.as_str()))
        .map(Schedule::effective_hours)
        .unwrap_or(0.0);
    let available = (driver.hours_remaining + credited).min(driver.max_hours.max(0.0));

    if available < needed {
        conflicts.push(ScheduleConflict::error(
            ConflictType::HosViolation,
            format!(
                "Driver {} has insufficient hours remaining ({}h available, {}h needed)",
                driver.name,
                fmt_hours(available),
                fmt_hours(needed)
            ),
            id,
            &["Assign a different driver", "Reduce schedule duration", "Split into multiple shifts"],
        ));
    } else if available - needed < policy.near_limit_hours {
        warnings.push(format!(
            "Driver {} will have {}h remaining after this assignment",
            driver.name,
            fmt_hours(available - needed)
        ));
        recommendations.push(format!(
            "Plan a reset break for {} before scheduling further work",
            driver.name
        ));
    }

    if driver.license_status != LicenseStatus::Valid {
        conflicts.push(ScheduleConflict::error(
            ConflictType::LicenseExpired,
            format!(
                "Driver {} has invalid license status: {}",
                driver.name, driver.license_status
            ),
            id,
            &["Assign a driver with valid license", "Update driver license status"],
        ));
    }

    let driver_id = driver.driver_id.as_str();
    let clashes: Vec<String> = colliding(candidate, view.schedules, |s| {
        s.assigned_driver_id.as_deref() == Some(driver_id)
    })
    .map(|s| s.id.clone())
    .collect();
    if !clashes.is_empty() {
        let mut conflict = ScheduleConflict::error(
            ConflictType::DoubleBooking,
            format!("Driver {} has conflicting schedules", driver.name),
            id,
            &["Choose a different time slot", "Assign a different driver"],
        );
        conflict.affected_schedules.extend(clashes);
        conflicts.push(conflict);
    }
}

fn check_vehicle(
    candidate: &Schedule,
    vehicle: &VehicleAvailability,
    view: &ResourceView<'_>,
    conflicts: &mut Vec<ScheduleConflict>,
    warnings: &mut Vec<String>,
) {
    let id = candidate.id.as_str();

    match vehicle.inspection_status {
        InspectionStatus::Overdue => conflicts.push(ScheduleConflict::error(
            ConflictType::MaintenanceRequired,
            format!("Vehicle {} has overdue inspection", vehicle.name),
            id,
            &["Complete vehicle inspection", "Assign a different vehicle"],
        )),
        InspectionStatus::DueSoon => conflicts.push(ScheduleConflict::warning(
            ConflictType::MaintenanceRequired,
            format!("Vehicle {} has an inspection due soon", vehicle.name),
            id,
            &["Book the inspection before the next dispatch"],
        )),
        InspectionStatus::Current => {}
    }

    if vehicle.has_issues {
        warnings.push(format!(
            "Vehicle {}: {}",
            vehicle.name,
            vehicle.issue_description.as_deref().unwrap_or("has reported issues")
        ));
    }

    let vehicle_id = vehicle.vehicle_id.as_str();
    let clashes: Vec<String> = colliding(candidate, view.schedules, |s| {
        s.assigned_vehicle_id.as_deref() == Some(vehicle_id)
    })
    .map(|s| s.id.clone())
    .collect();
    if !clashes.is_empty() {
        let mut conflict = ScheduleConflict::error(
            ConflictType::DoubleBooking,
            format!("Vehicle {} has conflicting schedules", vehicle.name),
            id,
            &["Choose a different time slot", "Assign a different vehicle"],
        );
        conflict.affected_schedules.extend(clashes);
        conflicts.push(conflict);
    }
}
