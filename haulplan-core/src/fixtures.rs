//! Seed fleet: three drivers, three vehicles and two schedules.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::resources::{
    DriverAvailability, DriverStatus, EldStatus, InspectionStatus, LicenseStatus, VehicleAvailability,
    VehicleStatus,
};
use crate::schedule::{Schedule, SchedulePriority, ScheduleStatus, ScheduleType};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn clock(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap_or_default()
}

fn stamp(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).single().unwrap_or_default()
}

#[allow(clippy::too_many_arguments)]
fn driver(
    id: &str,
    name: &str,
    status: DriverStatus,
    current_hours: f64,
    license_expiry: NaiveDate,
    location: &str,
    vehicle: Option<&str>,
) -> DriverAvailability {
    let mut d = DriverAvailability::new(id, name, current_hours, 60.0).with_status(status);
    d.license_status = LicenseStatus::Valid;
    d.license_expiry = license_expiry;
    d.current_location = location.to_string();
    d.assigned_vehicle = vehicle.map(str::to_string);
    d.eld_status = EldStatus::Connected;
    d
}

pub fn drivers() -> Vec<DriverAvailability> {
    vec![
        driver("DRV-001", "John Smith", DriverStatus::Available, 35.0, date(2025, 12, 31), "Dallas, TX", Some("TRK-001")),
        driver("DRV-002", "Sarah Wilson", DriverStatus::Available, 28.0, date(2026, 3, 15), "Los Angeles, CA", None),
        driver("DRV-003", "Mike Johnson", DriverStatus::OnDuty, 45.0, date(2025, 8, 20), "Phoenix, AZ", Some("TRK-002")),
    ]
}

pub fn vehicles() -> Vec<VehicleAvailability> {
    let mut cascadia = VehicleAvailability::new("TRK-001", "Freightliner Cascadia #001", "truck");
    cascadia.current_mileage = 125_000;
    cascadia.next_maintenance_due = date(2025, 2, 15);
    cascadia.last_inspection = date(2024, 12, 1);
    cascadia.assigned_driver = Some("DRV-001".to_string());
    cascadia.current_location = "Dallas, TX".to_string();
    cascadia.fuel_level = 85;

    let mut peterbilt = VehicleAvailability::new("TRK-002", "Peterbilt 579 #002", "truck")
        .with_status(VehicleStatus::InUse)
        .with_inspection(InspectionStatus::DueSoon);
    peterbilt.current_mileage = 98_000;
    peterbilt.next_maintenance_due = date(2025, 1, 20);
    peterbilt.last_inspection = date(2024, 11, 15);
    peterbilt.assigned_driver = Some("DRV-003".to_string());
    peterbilt.current_location = "Phoenix, AZ".to_string();
    peterbilt.fuel_level = 60;

    let mut transit = VehicleAvailability::new("VAN-001", "Ford Transit #001", "van");
    transit.current_mileage = 45_000;
    transit.next_maintenance_due = date(2025, 3, 1);
    transit.last_inspection = date(2024, 12, 10);
    transit.current_location = "Houston, TX".to_string();
    transit.fuel_level = 75;

    vec![cascadia, peterbilt, transit]
}

pub fn schedules() -> Vec<Schedule> {
    vec![
        Schedule {
            id: "SCH-001".to_string(),
            title: "Delivery to Austin Distribution Center".to_string(),
            description: Some("Regular weekly delivery run".to_string()),
            start_date: date(2025, 1, 3),
            end_date: date(2025, 1, 3),
            start_time: clock(8, 0),
            end_time: clock(16, 0),
            status: ScheduleStatus::Scheduled,
            priority: SchedulePriority::High,
            schedule_type: ScheduleType::Delivery,
            assigned_driver_id: Some("DRV-001".to_string()),
            driver_name: Some("John Smith".to_string()),
            assigned_vehicle_id: Some("TRK-001".to_string()),
            vehicle_name: Some("Freightliner Cascadia #001".to_string()),
            origin: Some("Dallas, TX".to_string()),
            destination: Some("Austin, TX".to_string()),
            estimated_hours: Some(8.0),
            estimated_distance: Some(195.0),
            estimated_duration: Some(480),
            hos_compliance: Some(true),
            license_verified: Some(true),
            vehicle_inspection_current: Some(true),
            maintenance_required: None,
            notes: None,
            created_by: "Dispatcher".to_string(),
            created_at: stamp(2025, 1, 2, 10),
            updated_at: stamp(2025, 1, 2, 10),
            completed_at: None,
        },
        Schedule {
            id: "SCH-002".to_string(),
            title: "Vehicle Maintenance - TRK-002".to_string(),
            description: Some("Scheduled maintenance inspection".to_string()),
            start_date: date(2025, 1, 4),
            end_date: date(2025, 1, 4),
            start_time: clock(9, 0),
            end_time: clock(12, 0),
            status: ScheduleStatus::Scheduled,
            priority: SchedulePriority::Medium,
            schedule_type: ScheduleType::Maintenance,
            assigned_driver_id: None,
            driver_name: None,
            assigned_vehicle_id: Some("TRK-002".to_string()),
            vehicle_name: Some("Peterbilt 579 #002".to_string()),
            origin: None,
            destination: None,
            estimated_hours: Some(3.0),
            estimated_distance: None,
            estimated_duration: None,
            hos_compliance: None,
            license_verified: None,
            vehicle_inspection_current: None,
            maintenance_required: Some(true),
            notes: None,
            created_by: "Maintenance Manager".to_string(),
            created_at: stamp(2025, 1, 1, 14),
            updated_at: stamp(2025, 1, 1, 14),
            completed_at: None,
        },
    ]
}
