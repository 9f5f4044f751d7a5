//! Schedule model: a planned activity occupying a time window, optionally
//! holding a driver and a vehicle.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::labels::labeled_enum;
use crate::policy::DEFAULT_ESTIMATED_HOURS;
use crate::time::span_hours;

labeled_enum! {
    /// Lifecycle of a schedule. Transitions are checked by
    /// [`ScheduleStatus::can_transition_to`].
    pub enum ScheduleStatus {
        Scheduled => "Scheduled",
        InProgress => "In Progress",
        Completed => "Completed",
        Cancelled => "Cancelled",
        Delayed => "Delayed",
    }
}

labeled_enum! {
    pub enum SchedulePriority {
        High => "High",
        Medium => "Medium",
        Low => "Low",
    }
}

labeled_enum! {
    pub enum ScheduleType {
        Delivery => "Delivery",
        Pickup => "Pickup",
        Maintenance => "Maintenance",
        Training => "Training",
        Inspection => "Inspection",
        Break => "Break",
        Other => "Other",
    }
}

impl ScheduleStatus {
    /// Completed and cancelled schedules accept no further status changes.
    pub fn is_terminal(self) -> bool {
        matches!(self, ScheduleStatus::Completed | ScheduleStatus::Cancelled)
    }

    /// Transition table. Re-writing the current status is always allowed.
    ///
    /// ```text
    /// Scheduled   -> In Progress | Delayed | Cancelled | Completed
    /// Delayed     -> Scheduled | In Progress | Cancelled
    /// In Progress -> Completed | Delayed | Cancelled
    /// ```
    pub fn can_transition_to(self, next: ScheduleStatus) -> bool {
        use ScheduleStatus::*;

        if self == next {
            return true;
        }
        match self {
            Scheduled => matches!(next, InProgress | Delayed | Cancelled | Completed),
            Delayed => matches!(next, Scheduled | InProgress | Cancelled),
            InProgress => matches!(next, Completed | Delayed | Cancelled),
            Completed | Cancelled => false,
        }
    }

    pub fn allowed_transitions(self) -> Vec<ScheduleStatus> {
        ScheduleStatus::ALL
            .iter()
            .copied()
            .filter(|s| *s != self && self.can_transition_to(*s))
            .collect()
    }
}

/// A stored schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(with = "crate::time::hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "crate::time::hhmm")]
    pub end_time: NaiveTime,

    pub status: ScheduleStatus,
    pub priority: SchedulePriority,
    pub schedule_type: ScheduleType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_driver_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_vehicle_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,

    /// Hours of driver time this schedule consumes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<f64>,
    /// Miles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_distance: Option<f64>,
    /// Minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hos_compliance: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_verified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_inspection_current: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintenance_required: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Local wall-clock time the schedule entered `Completed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<NaiveDateTime>,
}

impl Schedule {
    pub fn starts_at(&self) -> NaiveDateTime {
        self.start_date.and_time(self.start_time)
    }

    pub fn ends_at(&self) -> NaiveDateTime {
        self.end_date.and_time(self.end_time)
    }

    /// Explicit `estimated_hours` when positive, otherwise the window length.
    pub fn effective_hours(&self) -> f64 {
        estimated_hours(
            self.estimated_hours,
            Some((self.start_date, self.end_date)),
            Some((self.start_time, self.end_time)),
        )
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == ScheduleStatus::Cancelled
    }

    /// Cancelled schedules hold neither driver hours nor vehicles.
    pub fn holds_resources(&self) -> bool {
        !self.is_cancelled()
    }

    pub fn is_fully_assigned(&self) -> bool {
        self.assigned_driver_id.is_some() && self.assigned_vehicle_id.is_some()
    }

    /// Every compliance flag is either unset or true.
    pub fn is_compliant(&self) -> bool {
        self.hos_compliance != Some(false)
            && self.license_verified != Some(false)
            && self.vehicle_inspection_current != Some(false)
    }

    /// Overlay every field the draft carries. `id` and `created_by` are
    /// never overwritten.
    pub fn apply(&mut self, draft: &ScheduleDraft) {
        fn set<T: Clone>(slot: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *slot = v.clone();
            }
        }
        fn set_opt<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                *slot = value.clone();
            }
        }

        set(&mut self.title, &draft.title);
        set_opt(&mut self.description, &draft.description);
        set(&mut self.start_date, &draft.start_date);
        set(&mut self.end_date, &draft.end_date);
        set(&mut self.start_time, &draft.start_time);
        set(&mut self.end_time, &draft.end_time);
        set(&mut self.status, &draft.status);
        set(&mut self.priority, &draft.priority);
        set(&mut self.schedule_type, &draft.schedule_type);

        if draft.unassign_driver {
            self.assigned_driver_id = None;
            self.driver_name = None;
        }
        if draft.assigned_driver_id.is_some() && draft.assigned_driver_id != self.assigned_driver_id {
            // A new driver invalidates the cached name unless one was given.
            self.driver_name = None;
        }
        set_opt(&mut self.assigned_driver_id, &draft.assigned_driver_id);
        set_opt(&mut self.driver_name, &draft.driver_name);

        if draft.unassign_vehicle {
            self.assigned_vehicle_id = None;
            self.vehicle_name = None;
        }
        if draft.assigned_vehicle_id.is_some() && draft.assigned_vehicle_id != self.assigned_vehicle_id {
            self.vehicle_name = None;
        }
        set_opt(&mut self.assigned_vehicle_id, &draft.assigned_vehicle_id);
        set_opt(&mut self.vehicle_name, &draft.vehicle_name);

        set_opt(&mut self.origin, &draft.origin);
        set_opt(&mut self.destination, &draft.destination);
        set_opt(&mut self.estimated_hours, &draft.estimated_hours);
        set_opt(&mut self.estimated_distance, &draft.estimated_distance);
        set_opt(&mut self.estimated_duration, &draft.estimated_duration);
        set_opt(&mut self.hos_compliance, &draft.hos_compliance);
        set_opt(&mut self.license_verified, &draft.license_verified);
        set_opt(&mut self.vehicle_inspection_current, &draft.vehicle_inspection_current);
        set_opt(&mut self.maintenance_required, &draft.maintenance_required);
        set_opt(&mut self.notes, &draft.notes);
    }
}

/// Hours a schedule-like record needs.
///
/// Order: explicit positive hours, then the date-time span (or the clock
/// difference when dates are missing), then [`DEFAULT_ESTIMATED_HOURS`].
/// Never negative.
pub fn estimated_hours(
    explicit: Option<f64>,
    dates: Option<(NaiveDate, NaiveDate)>,
    times: Option<(NaiveTime, NaiveTime)>,
) -> f64 {
    if let Some(h) = explicit.filter(|h| *h > 0.0) {
        return h;
    }
    let Some((start_time, end_time)) = times else {
        return DEFAULT_ESTIMATED_HOURS;
    };
    let hours = match dates {
        Some((start_date, end_date)) => {
            span_hours(start_date.and_time(start_time), end_date.and_time(end_time))
        }
        None => (end_time - start_time).num_minutes() as f64 / 60.0,
    };
    hours.max(0.0)
}

/// Partial schedule used by create and update. `None` means "not provided".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleDraft {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default, with = "crate::time::hhmm_opt")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, with = "crate::time::hhmm_opt")]
    pub end_time: Option<NaiveTime>,
    #[serde(default)]
    pub status: Option<ScheduleStatus>,
    #[serde(default)]
    pub priority: Option<SchedulePriority>,
    #[serde(default)]
    pub schedule_type: Option<ScheduleType>,
    #[serde(default)]
    pub assigned_driver_id: Option<String>,
    #[serde(default)]
    pub driver_name: Option<String>,
    /// Drop the current driver assignment (update only).
    #[serde(default)]
    pub unassign_driver: bool,
    #[serde(default)]
    pub assigned_vehicle_id: Option<String>,
    #[serde(default)]
    pub vehicle_name: Option<String>,
    /// Drop the current vehicle assignment (update only).
    #[serde(default)]
    pub unassign_vehicle: bool,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub estimated_hours: Option<f64>,
    #[serde(default)]
    pub estimated_distance: Option<f64>,
    #[serde(default)]
    pub estimated_duration: Option<i32>,
    #[serde(default)]
    pub hos_compliance: Option<bool>,
    #[serde(default)]
    pub license_verified: Option<bool>,
    #[serde(default)]
    pub vehicle_inspection_current: Option<bool>,
    #[serde(default)]
    pub maintenance_required: Option<bool>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Honored on create only.
    #[serde(default)]
    pub created_by: Option<String>,
}

impl ScheduleDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self.end_date = Some(date);
        self
    }

    pub fn with_dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    pub fn between(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.start_time = Some(start);
        self.end_time = Some(end);
        self
    }

    pub fn with_status(mut self, status: ScheduleStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_priority(mut self, priority: SchedulePriority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_type(mut self, schedule_type: ScheduleType) -> Self {
        self.schedule_type = Some(schedule_type);
        self
    }

    pub fn with_driver(mut self, driver_id: impl Into<String>) -> Self {
        self.assigned_driver_id = Some(driver_id.into());
        self
    }

    pub fn with_vehicle(mut self, vehicle_id: impl Into<String>) -> Self {
        self.assigned_vehicle_id = Some(vehicle_id.into());
        self
    }

    pub fn with_hours(mut self, hours: f64) -> Self {
        self.estimated_hours = Some(hours);
        self
    }

    pub fn with_distance(mut self, miles: f64) -> Self {
        self.estimated_distance = Some(miles);
        self
    }

    pub fn effective_hours(&self) -> f64 {
        estimated_hours(
            self.estimated_hours,
            self.start_date.zip(self.end_date),
            self.start_time.zip(self.end_time),
        )
    }
}

/// Narrowing criteria for listing schedules. Empty lists and `None` match all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleFilter {
    /// Inclusive lower bound on `start_date`.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound on `end_date`.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: Vec<ScheduleStatus>,
    #[serde(default)]
    pub priority: Vec<SchedulePriority>,
    #[serde(default)]
    pub schedule_type: Vec<ScheduleType>,
    #[serde(default)]
    pub assigned_driver_id: Option<String>,
    #[serde(default)]
    pub assigned_vehicle_id: Option<String>,
    /// Case-insensitive substring over title, description, driver and vehicle names.
    #[serde(default)]
    pub search_term: Option<String>,
}

impl ScheduleFilter {
    pub fn with_status(mut self, status: ScheduleStatus) -> Self {
        self.status.push(status);
        self
    }

    pub fn matches(&self, s: &Schedule) -> bool {
        if self.start_date.is_some_and(|from| s.start_date < from) {
            return false;
        }
        if self.end_date.is_some_and(|to| s.end_date > to) {
            return false;
        }
        if !self.status.is_empty() && !self.status.contains(&s.status) {
            return false;
        }
        if !self.priority.is_empty() && !self.priority.contains(&s.priority) {
            return false;
        }
        if !self.schedule_type.is_empty() && !self.schedule_type.contains(&s.schedule_type) {
            return false;
        }
        if let Some(driver) = &self.assigned_driver_id {
            if s.assigned_driver_id.as_ref() != Some(driver) {
                return false;
            }
        }
        if let Some(vehicle) = &self.assigned_vehicle_id {
            if s.assigned_vehicle_id.as_ref() != Some(vehicle) {
                return false;
            }
        }
        if let Some(term) = self.search_term.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let term = term.to_lowercase();
            let hit = |field: Option<&str>| field.is_some_and(|f| f.to_lowercase().contains(&term));
            if !(hit(Some(s.title.as_str()))
                || hit(s.description.as_deref())
                || hit(s.driver_name.as_deref())
                || hit(s.vehicle_name.as_deref()))
            {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::time::parse_clock;

    fn t(s: &str) -> NaiveTime {
        parse_clock(s).unwrap()
    }

    fn d(s: &str) -> NaiveDate {
        crate::time::parse_date(s).unwrap()
    }

    #[test]
    fn transition_table() {
        use ScheduleStatus::*;
        assert!(Scheduled.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Completed));
        assert!(Delayed.can_transition_to(Scheduled));
        assert!(!Completed.can_transition_to(InProgress));
        assert!(!Cancelled.can_transition_to(Scheduled));
        assert!(!InProgress.can_transition_to(Scheduled));
        assert!(Completed.can_transition_to(Completed));
        assert!(Cancelled.allowed_transitions().is_empty());
        assert_eq!(InProgress.allowed_transitions(), vec![Completed, Cancelled, Delayed]);
    }

    #[test]
    fn estimated_hours_prefers_explicit_then_span_then_default() {
        assert_eq!(estimated_hours(Some(3.0), None, None), 3.0);
        assert_eq!(
            estimated_hours(None, Some((d("2025-01-03"), d("2025-01-03"))), Some((t("08:00"), t("14:00")))),
            6.0
        );
        assert_eq!(
            estimated_hours(Some(0.0), Some((d("2025-01-03"), d("2025-01-04"))), Some((t("20:00"), t("02:00")))),
            6.0
        );
        assert_eq!(estimated_hours(None, None, Some((t("09:00"), t("12:30")))), 3.5);
        assert_eq!(estimated_hours(None, None, None), DEFAULT_ESTIMATED_HOURS);
        assert_eq!(
            estimated_hours(None, Some((d("2025-01-03"), d("2025-01-03"))), Some((t("14:00"), t("08:00")))),
            0.0
        );
    }

    #[test]
    fn apply_overlays_only_given_fields() {
        let mut s = fixtures::schedules().remove(0);
        let before = s.clone();

        let draft = ScheduleDraft {
            title: Some("Renamed".into()),
            estimated_hours: Some(6.0),
            ..ScheduleDraft::default()
        };
        s.apply(&draft);

        assert_eq!(s.title, "Renamed");
        assert_eq!(s.estimated_hours, Some(6.0));
        assert_eq!(s.id, before.id);
        assert_eq!(s.assigned_driver_id, before.assigned_driver_id);
        assert_eq!(s.driver_name, before.driver_name);
    }

    #[test]
    fn apply_clears_cached_name_when_driver_changes() {
        let mut s = fixtures::schedules().remove(0);
        s.apply(&ScheduleDraft::default().with_driver("DRV-002"));
        assert_eq!(s.assigned_driver_id.as_deref(), Some("DRV-002"));
        assert_eq!(s.driver_name, None);

        s.apply(&ScheduleDraft {
            unassign_vehicle: true,
            ..ScheduleDraft::default()
        });
        assert_eq!(s.assigned_vehicle_id, None);
        assert_eq!(s.vehicle_name, None);
    }

    #[test]
    fn filter_search_is_case_insensitive() {
        let all = fixtures::schedules();
        let f = ScheduleFilter {
            search_term: Some("austin".into()),
            ..ScheduleFilter::default()
        };
        let hits: Vec<_> = all.iter().filter(|s| f.matches(s)).map(|s| s.id.as_str()).collect();
        assert_eq!(hits, vec!["SCH-001"]);

        let by_vehicle_name = ScheduleFilter {
            search_term: Some("PETERBILT".into()),
            ..ScheduleFilter::default()
        };
        assert!(by_vehicle_name.matches(&all[1]));
    }

    #[test]
    fn filter_date_bounds_are_inclusive() {
        let all = fixtures::schedules();
        let f = ScheduleFilter {
            start_date: Some(d("2025-01-03")),
            end_date: Some(d("2025-01-03")),
            ..ScheduleFilter::default()
        };
        let hits: Vec<_> = all.iter().filter(|s| f.matches(s)).map(|s| s.id.as_str()).collect();
        assert_eq!(hits, vec!["SCH-001"]);
    }

    #[test]
    fn compliance_requires_no_explicit_false() {
        let mut s = fixtures::schedules().remove(1);
        assert!(s.is_compliant());
        s.license_verified = Some(false);
        assert!(!s.is_compliant());
    }
}
