//! haulplan-ingest: CSV roster and schedule import into core types.

pub mod types;
pub mod parsers;

pub use types::{ImportKind, ImportReport, SkippedRow};
pub use parsers::{parse_driver_roster, parse_schedule_csv, parse_vehicle_roster};
