//! Driver roster CSV.
//!
//! Columns: `driver_id`, `name` (required), `status`, `current_hours`,
//! `max_hours`, `license_status`, `license_expiry`, `current_location`,
//! `assigned_vehicle`, `eld_status`.

use std::io::Read;

use anyhow::{bail, Result};
use haulplan_core::{DriverAvailability, DriverStatus, EldStatus, LicenseStatus};
use serde::Deserialize;

use super::{label, opt, parse_flexible_date, read_rows, required, text};
use crate::types::{ImportKind, ImportReport};

/// 60 hours over 7 days.
pub const DEFAULT_MAX_HOURS: f64 = 60.0;

#[derive(Debug, Deserialize)]
struct DriverRow {
    driver_id: String,
    name: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    current_hours: Option<f64>,
    #[serde(default)]
    max_hours: Option<f64>,
    #[serde(default)]
    license_status: Option<String>,
    #[serde(default)]
    license_expiry: Option<String>,
    #[serde(default)]
    current_location: Option<String>,
    #[serde(default)]
    assigned_vehicle: Option<String>,
    #[serde(default)]
    eld_status: Option<String>,
}

fn to_driver(row: DriverRow) -> Result<DriverAvailability> {
    let current = row.current_hours.unwrap_or(0.0);
    let max = row.max_hours.unwrap_or(DEFAULT_MAX_HOURS);
    if current < 0.0 || max <= 0.0 {
        bail!("hours out of range (current {current}, max {max})");
    }

    let id = required(row.driver_id, "driver_id")?;
    let name = required(row.name, "name")?;
    let mut d = DriverAvailability::new(id, name, current, max);
    if let Some(status) = opt(row.status, label::<DriverStatus>)? {
        d.status = status;
    }
    if let Some(license) = opt(row.license_status, label::<LicenseStatus>)? {
        d.license_status = license;
    }
    if let Some(expiry) = opt(row.license_expiry, parse_flexible_date)? {
        d.license_expiry = expiry;
    }
    if let Some(eld) = opt(row.eld_status, label::<EldStatus>)? {
        d.eld_status = eld;
    }
    d.current_location = text(row.current_location).unwrap_or_default();
    d.assigned_vehicle = text(row.assigned_vehicle);
    Ok(d)
}

pub fn parse_driver_roster<R: Read>(input: R) -> Result<ImportReport<DriverAvailability>> {
    read_rows(input, ImportKind::Drivers, to_driver)
}
