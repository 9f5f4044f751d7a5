//! CSV parsers. Every file has a header row; columns are matched by name
//! and may appear in any order. Rows that fail to parse are skipped and
//! reported, never fatal.

pub mod driver_roster;
pub mod schedule_csv;
pub mod vehicle_roster;

pub use driver_roster::parse_driver_roster;
pub use schedule_csv::parse_schedule_csv;
pub use vehicle_roster::parse_vehicle_roster;

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim};
use regex::Regex;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::types::{ImportKind, ImportReport};

pub fn open_csv(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("open {}", path.display()))
}

pub(crate) fn read_rows<R, Row, T>(
    input: R,
    kind: ImportKind,
    convert: impl Fn(Row) -> Result<T>,
) -> Result<ImportReport<T>>
where
    R: Read,
    Row: DeserializeOwned,
{
    let mut rdr = ReaderBuilder::new().trim(Trim::All).flexible(true).from_reader(input);
    let headers = rdr.headers().context("read CSV header")?.clone();

    let mut report = ImportReport::new(kind);
    for (i, record) in rdr.records().enumerate() {
        let fallback_line = i + 2;
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                report.skip(fallback_line, e.to_string());
                continue;
            }
        };
        let line = record.position().map(|p| p.line() as usize).unwrap_or(fallback_line);

        match record
            .deserialize::<Row>(Some(&headers))
            .map_err(anyhow::Error::from)
            .and_then(&convert)
        {
            Ok(rec) => report.records.push(rec),
            Err(e) => {
                debug!(line, error = %e, "csv row skipped");
                report.skip(line, e.to_string());
            }
        }
    }
    Ok(report)
}

static ISO_DATE: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^(?P<y>\d{4})-(?P<m>\d{1,2})-(?P<d>\d{1,2})$"));
static US_DATE: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^(?P<m>\d{1,2})/(?P<d>\d{1,2})/(?P<y>\d{4})$"));

/// `2025-01-03` or US-style `1/3/2025`.
pub fn parse_flexible_date(raw: &str) -> Result<NaiveDate> {
    let iso = ISO_DATE.as_ref().map_err(|e| anyhow!("date pattern: {e}"))?;
    let us = US_DATE.as_ref().map_err(|e| anyhow!("date pattern: {e}"))?;

    let s = raw.trim();
    let caps = iso
        .captures(s)
        .or_else(|| us.captures(s))
        .ok_or_else(|| anyhow!("unrecognized date '{s}'"))?;

    let y: i32 = caps["y"].parse()?;
    let m: u32 = caps["m"].parse()?;
    let d: u32 = caps["d"].parse()?;
    NaiveDate::from_ymd_opt(y, m, d).ok_or_else(|| anyhow!("date out of range '{s}'"))
}

/// `yes/no`, `true/false`, `y/n`, `1/0`.
pub fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" | "1" => Ok(true),
        "no" | "n" | "false" | "0" => Ok(false),
        other => bail!("unrecognized flag '{other}'"),
    }
}

/// Parse an optional column with `parse`; blank means absent.
pub(crate) fn opt<T>(raw: Option<String>, parse: impl Fn(&str) -> Result<T>) -> Result<Option<T>> {
    match raw.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => parse(s).map(Some),
        _ => Ok(None),
    }
}

/// Lenient label parse ("in progress", "IN_PROGRESS", ...).
pub(crate) fn label<T>(s: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    Ok(s.parse::<T>()?)
}

pub(crate) fn required(raw: String, column: &str) -> Result<String> {
    let s = raw.trim();
    if s.is_empty() {
        bail!("missing {column}");
    }
    Ok(s.to_string())
}

pub(crate) fn text(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
