//! Tunables for the scheduling engine.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Hours assumed for a record that carries neither hours nor a time window.
pub const DEFAULT_ESTIMATED_HOURS: f64 = 8.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingPolicy {
    /// IANA timezone deciding "today" for undated drafts and completion stamps.
    pub timezone: String,
    #[serde(with = "crate::time::hhmm")]
    pub default_start_time: NaiveTime,
    #[serde(with = "crate::time::hhmm")]
    pub default_end_time: NaiveTime,
    /// Per-driver weekly capacity used by fleet utilization.
    pub weekly_capacity_hours: f64,
    /// Warn when an assignment leaves a driver with fewer hours than this.
    pub near_limit_hours: f64,
    pub default_created_by: String,
}

impl Default for SchedulingPolicy {
    fn default() -> Self {
        Self {
            timezone: "America/Chicago".to_string(),
            default_start_time: NaiveTime::MIN + chrono::Duration::hours(9),
            default_end_time: NaiveTime::MIN + chrono::Duration::hours(17),
            weekly_capacity_hours: 40.0,
            near_limit_hours: 2.0,
            default_created_by: "Current User".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_window_is_nine_to_five() {
        let p = SchedulingPolicy::default();
        assert_eq!(crate::time::format_clock(p.default_start_time), "09:00");
        assert_eq!(crate::time::format_clock(p.default_end_time), "17:00");
    }

    #[test]
    fn partial_toml_style_input_keeps_defaults() {
        let p: SchedulingPolicy =
            serde_json::from_str(r#"{"timezone":"America/Denver","default_start_time":"07:30"}"#).unwrap();
        assert_eq!(p.timezone, "America/Denver");
        assert_eq!(crate::time::format_clock(p.default_start_time), "07:30");
        assert_eq!(p.weekly_capacity_hours, 40.0);
    }
}
