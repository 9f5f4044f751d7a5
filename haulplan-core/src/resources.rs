//! Driver and vehicle availability snapshots.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::labels::labeled_enum;

labeled_enum! {
    pub enum DriverStatus {
        Available => "Available",
        OnDuty => "On Duty",
        OffDuty => "Off Duty",
        Inactive => "Inactive",
    }
}

labeled_enum! {
    pub enum LicenseStatus {
        Valid => "Valid",
        Expired => "Expired",
        Suspended => "Suspended",
        Pending => "Pending",
    }
}

labeled_enum! {
    /// Electronic logging device link state.
    pub enum EldStatus {
        Connected => "Connected",
        Disconnected => "Disconnected",
        Error => "Error",
    }
}

labeled_enum! {
    pub enum VehicleStatus {
        Available => "Available",
        InUse => "In Use",
        Maintenance => "Maintenance",
        OutOfService => "Out of Service",
    }
}

labeled_enum! {
    pub enum InspectionStatus {
        Current => "Current",
        DueSoon => "Due Soon",
        Overdue => "Overdue",
    }
}

/// A driver's hours-of-service capacity.
///
/// `hours_remaining` is derived: always `max(0, max_hours - current_hours)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverAvailability {
    pub driver_id: String,
    pub name: String,
    pub status: DriverStatus,
    pub current_hours: f64,
    pub max_hours: f64,
    pub hours_remaining: f64,
    pub license_status: LicenseStatus,
    pub license_expiry: NaiveDate,
    pub current_location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_vehicle: Option<String>,
    pub eld_status: EldStatus,
    #[serde(default)]
    pub has_conflict: bool,
}

impl DriverAvailability {
    pub fn new(
        driver_id: impl Into<String>,
        name: impl Into<String>,
        current_hours: f64,
        max_hours: f64,
    ) -> Self {
        let mut d = Self {
            driver_id: driver_id.into(),
            name: name.into(),
            status: DriverStatus::Available,
            current_hours,
            max_hours,
            hours_remaining: 0.0,
            license_status: LicenseStatus::Valid,
            license_expiry: NaiveDate::MAX,
            current_location: String::new(),
            assigned_vehicle: None,
            eld_status: EldStatus::Connected,
            has_conflict: false,
        };
        d.resync_hours();
        d
    }

    pub fn with_license(mut self, status: LicenseStatus) -> Self {
        self.license_status = status;
        self
    }

    pub fn with_status(mut self, status: DriverStatus) -> Self {
        self.status = status;
        self
    }

    pub fn resync_hours(&mut self) {
        self.hours_remaining = (self.max_hours - self.current_hours).max(0.0);
    }

    pub fn consume_hours(&mut self, hours: f64) {
        self.current_hours += hours;
        self.resync_hours();
    }

    /// Give hours back. `current_hours` never drops below zero.
    pub fn release_hours(&mut self, hours: f64) {
        self.current_hours = (self.current_hours - hours).max(0.0);
        self.resync_hours();
    }

    /// Inactive and off-duty drivers are never offered for new work.
    pub fn is_dispatchable(&self) -> bool {
        !matches!(self.status, DriverStatus::Inactive | DriverStatus::OffDuty)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleAvailability {
    pub vehicle_id: String,
    pub name: String,
    /// Free-form body type ("truck", "van", ...).
    pub vehicle_type: String,
    pub status: VehicleStatus,
    pub current_mileage: u32,
    pub next_maintenance_due: NaiveDate,
    pub last_inspection: NaiveDate,
    pub inspection_status: InspectionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_driver: Option<String>,
    pub current_location: String,
    /// Percent, 0-100.
    pub fuel_level: u8,
    #[serde(default)]
    pub has_issues: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_description: Option<String>,
}

impl VehicleAvailability {
    pub fn new(vehicle_id: impl Into<String>, name: impl Into<String>, vehicle_type: impl Into<String>) -> Self {
        Self {
            vehicle_id: vehicle_id.into(),
            name: name.into(),
            vehicle_type: vehicle_type.into(),
            status: VehicleStatus::Available,
            current_mileage: 0,
            next_maintenance_due: NaiveDate::MAX,
            last_inspection: NaiveDate::MIN,
            inspection_status: InspectionStatus::Current,
            assigned_driver: None,
            current_location: String::new(),
            fuel_level: 100,
            has_issues: false,
            issue_description: None,
        }
    }

    pub fn with_inspection(mut self, status: InspectionStatus) -> Self {
        self.inspection_status = status;
        self
    }

    pub fn with_status(mut self, status: VehicleStatus) -> Self {
        self.status = status;
        self
    }

    /// Only an available vehicle becomes `In Use`; maintenance and
    /// out-of-service states win over dispatch.
    pub fn occupy(&mut self) {
        if self.status == VehicleStatus::Available {
            self.status = VehicleStatus::InUse;
        }
    }

    /// Only an in-use vehicle goes back to `Available`; maintenance and
    /// out-of-service states are left alone.
    pub fn release(&mut self) {
        if self.status == VehicleStatus::InUse {
            self.status = VehicleStatus::Available;
        }
    }

    pub fn maintenance_alerts(&self) -> Vec<String> {
        let mut alerts = Vec::new();
        match self.inspection_status {
            InspectionStatus::DueSoon => alerts.push("Inspection due soon".to_string()),
            InspectionStatus::Overdue => alerts.push("Inspection overdue".to_string()),
            InspectionStatus::Current => {}
        }
        if self.has_issues {
            alerts.push(
                self.issue_description
                    .clone()
                    .unwrap_or_else(|| "Has reported issues".to_string()),
            );
        }
        alerts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hours_remaining_stays_in_sync() {
        let mut d = DriverAvailability::new("DRV-9", "Test Driver", 55.0, 60.0);
        assert_eq!(d.hours_remaining, 5.0);

        d.consume_hours(8.0);
        assert_eq!(d.current_hours, 63.0);
        assert_eq!(d.hours_remaining, 0.0);

        d.release_hours(100.0);
        assert_eq!(d.current_hours, 0.0);
        assert_eq!(d.hours_remaining, 60.0);
    }

    #[test]
    fn release_only_frees_in_use_vehicles() {
        let mut v = VehicleAvailability::new("TRK-9", "Test Truck", "truck");
        v.occupy();
        v.release();
        assert_eq!(v.status, VehicleStatus::Available);

        let mut shop = v.clone().with_status(VehicleStatus::Maintenance);
        shop.release();
        assert_eq!(shop.status, VehicleStatus::Maintenance);
    }

    #[test]
    fn occupy_keeps_maintenance_and_out_of_service() {
        for held in [VehicleStatus::Maintenance, VehicleStatus::OutOfService] {
            let mut v = VehicleAvailability::new("TRK-9", "Test Truck", "truck").with_status(held);
            v.occupy();
            assert_eq!(v.status, held);
            v.release();
            assert_eq!(v.status, held);
        }
    }

    #[test]
    fn maintenance_alerts_cover_inspection_and_issues() {
        let mut v = VehicleAvailability::new("TRK-9", "Test Truck", "truck").with_inspection(InspectionStatus::Overdue);
        v.has_issues = true;
        assert_eq!(v.maintenance_alerts(), vec!["Inspection overdue", "Has reported issues"]);

        v.issue_description = Some("Brake light out".into());
        v.inspection_status = InspectionStatus::DueSoon;
        assert_eq!(v.maintenance_alerts(), vec!["Inspection due soon", "Brake light out"]);
    }

    #[test]
    fn labels_round_trip_through_serde() {
        let json = serde_json::to_string(&VehicleStatus::OutOfService).unwrap();
        assert_eq!(json, "\"Out of Service\"");
        assert_eq!("out of service".parse::<VehicleStatus>().unwrap(), VehicleStatus::OutOfService);
        assert_eq!("due-soon".parse::<InspectionStatus>().unwrap(), InspectionStatus::DueSoon);
    }
}
