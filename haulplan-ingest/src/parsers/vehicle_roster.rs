//! Vehicle roster CSV.
//!
//! Columns: `vehicle_id`, `name` (required), `vehicle_type`, `status`,
//! `current_mileage`, `next_maintenance_due`, `last_inspection`,
//! `inspection_status`, `assigned_driver`, `current_location`, `fuel_level`,
//! `has_issues`, `issue_description`.

use std::io::Read;

use anyhow::{bail, Result};
use haulplan_core::{InspectionStatus, VehicleAvailability, VehicleStatus};
use serde::Deserialize;

use super::{label, opt, parse_flag, parse_flexible_date, read_rows, required, text};
use crate::types::{ImportKind, ImportReport};

#[derive(Debug, Deserialize)]
struct VehicleRow {
    vehicle_id: String,
    name: String,
    #[serde(default)]
    vehicle_type: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    current_mileage: Option<u32>,
    #[serde(default)]
    next_maintenance_due: Option<String>,
    #[serde(default)]
    last_inspection: Option<String>,
    #[serde(default)]
    inspection_status: Option<String>,
    #[serde(default)]
    assigned_driver: Option<String>,
    #[serde(default)]
    current_location: Option<String>,
    #[serde(default)]
    fuel_level: Option<u8>,
    #[serde(default)]
    has_issues: Option<String>,
    #[serde(default)]
    issue_description: Option<String>,
}

fn to_vehicle(row: VehicleRow) -> Result<VehicleAvailability> {
    let id = required(row.vehicle_id, "vehicle_id")?;
    let name = required(row.name, "name")?;
    let kind = text(row.vehicle_type).unwrap_or_else(|| "truck".to_string());

    let mut v = VehicleAvailability::new(id, name, kind);
    if let Some(status) = opt(row.status, label::<VehicleStatus>)? {
        v.status = status;
    }
    if let Some(inspection) = opt(row.inspection_status, label::<InspectionStatus>)? {
        v.inspection_status = inspection;
    }
    if let Some(due) = opt(row.next_maintenance_due, parse_flexible_date)? {
        v.next_maintenance_due = due;
    }
    if let Some(last) = opt(row.last_inspection, parse_flexible_date)? {
        v.last_inspection = last;
    }
    if let Some(fuel) = row.fuel_level {
        if fuel > 100 {
            bail!("fuel_level {fuel} is over 100");
        }
        v.fuel_level = fuel;
    }
    v.current_mileage = row.current_mileage.unwrap_or(0);
    v.assigned_driver = text(row.assigned_driver);
    v.current_location = text(row.current_location).unwrap_or_default();
    v.issue_description = text(row.issue_description);
    v.has_issues = opt(row.has_issues, parse_flag)?.unwrap_or(v.issue_description.is_some());
    Ok(v)
}

pub fn parse_vehicle_roster<R: Read>(input: R) -> Result<ImportReport<VehicleAvailability>> {
    read_rows(input, ImportKind::Vehicles, to_vehicle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_vehicles() {
        let csv = "\
vehicle_id,name,vehicle_type,status,current_mileage,next_maintenance_due,last_inspection,inspection_status,fuel_level,issue_description
TRK-010,Kenworth T680 #010,truck,In Use,210000,2025-04-01,2025-01-02,due soon,40,
VAN-020,Sprinter #020,van,available,12000,,,Current,90,Cracked mirror
TRK-011,Volvo VNL #011,truck,Parked,1,,,,50,
TRK-012,Mack Anthem #012,truck,Available,1,,,,120,
";
        let report = parse_vehicle_roster(csv.as_bytes()).unwrap();
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.skipped.len(), 2);

        let kenworth = &report.records[0];
        assert_eq!(kenworth.status, VehicleStatus::InUse);
        assert_eq!(kenworth.inspection_status, InspectionStatus::DueSoon);
        assert_eq!(kenworth.current_mileage, 210_000);
        assert!(!kenworth.has_issues);

        let sprinter = &report.records[1];
        assert!(sprinter.has_issues);
        assert_eq!(sprinter.maintenance_alerts(), vec!["Cracked mirror"]);
    }
}
