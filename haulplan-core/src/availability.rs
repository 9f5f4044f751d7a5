//! Which drivers and vehicles could take a draft schedule.

use crate::overlap::{colliding, TimeWindow};
use crate::resources::{DriverAvailability, InspectionStatus, LicenseStatus, VehicleAvailability, VehicleStatus};
use crate::schedule::Schedule;

/// Dispatchable, licensed, enough hours left, and free during the window.
pub fn driver_is_eligible<W: TimeWindow>(
    driver: &DriverAvailability,
    window: &W,
    needed_hours: f64,
    schedules: &[Schedule],
) -> bool {
    if !driver.is_dispatchable() {
        return false;
    }
    if driver.hours_remaining < needed_hours {
        return false;
    }
    if driver.license_status != LicenseStatus::Valid {
        return false;
    }
    let id = driver.driver_id.as_str();
    colliding(window, schedules, |s| s.assigned_driver_id.as_deref() == Some(id))
        .next()
        .is_none()
}

/// Currently `Available`, inspection not overdue, and free during the window.
pub fn vehicle_is_eligible<W: TimeWindow>(vehicle: &VehicleAvailability, window: &W, schedules: &[Schedule]) -> bool {
    if vehicle.status != VehicleStatus::Available {
        return false;
    }
    if vehicle.inspection_status == InspectionStatus::Overdue {
        return false;
    }
    let id = vehicle.vehicle_id.as_str();
    colliding(window, schedules, |s| s.assigned_vehicle_id.as_deref() == Some(id))
        .next()
        .is_none()
}

pub fn available_drivers<W: TimeWindow>(
    drivers: &[DriverAvailability],
    window: &W,
    needed_hours: f64,
    schedules: &[Schedule],
) -> Vec<DriverAvailability> {
    drivers
        .iter()
        .filter(|d| driver_is_eligible(*d, window, needed_hours, schedules))
        .cloned()
        .collect()
}

pub fn available_vehicles<W: TimeWindow>(
    vehicles: &[VehicleAvailability],
    window: &W,
    schedules: &[Schedule],
) -> Vec<VehicleAvailability> {
    vehicles
        .iter()
        .filter(|v| vehicle_is_eligible(*v, window, schedules))
        .cloned()
        .collect()
}
