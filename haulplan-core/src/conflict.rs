//! Validation findings.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    /// The window itself is broken (end not after start).
    TimeOverlap,
    HosViolation,
    LicenseExpired,
    DoubleBooking,
    MaintenanceRequired,
    /// Status change not allowed by the transition table.
    InvalidTransition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictSeverity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConflict {
    #[serde(rename = "type")]
    pub conflict_type: ConflictType,
    pub severity: ConflictSeverity,
    pub message: String,
    pub affected_schedules: Vec<String>,
    pub suggestions: Vec<String>,
}

impl ScheduleConflict {
    pub fn error(
        conflict_type: ConflictType,
        message: impl Into<String>,
        schedule_id: &str,
        suggestions: &[&str],
    ) -> Self {
        Self::build(conflict_type, ConflictSeverity::Error, message, schedule_id, suggestions)
    }

    pub fn warning(
        conflict_type: ConflictType,
        message: impl Into<String>,
        schedule_id: &str,
        suggestions: &[&str],
    ) -> Self {
        Self::build(conflict_type, ConflictSeverity::Warning, message, schedule_id, suggestions)
    }

    fn build(
        conflict_type: ConflictType,
        severity: ConflictSeverity,
        message: impl Into<String>,
        schedule_id: &str,
        suggestions: &[&str],
    ) -> Self {
        Self {
            conflict_type,
            severity,
            message: message.into(),
            affected_schedules: vec![schedule_id.to_string()],
            suggestions: suggestions.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn is_blocking(&self) -> bool {
        self.severity == ConflictSeverity::Error
    }
}

/// Result of validating one candidate schedule.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScheduleValidation {
    /// True iff no conflict has `Error` severity.
    pub is_valid: bool,
    pub conflicts: Vec<ScheduleConflict>,
    /// Non-blocking advisories (near HOS limit, reported vehicle issues).
    pub warnings: Vec<String>,
    pub recommendations: Vec<String>,
}

impl ScheduleValidation {
    pub fn from_parts(conflicts: Vec<ScheduleConflict>, warnings: Vec<String>, recommendations: Vec<String>) -> Self {
        Self {
            is_valid: !conflicts.iter().any(ScheduleConflict::is_blocking),
            conflicts,
            warnings,
            recommendations,
        }
    }

    pub fn blocking(&self) -> Vec<ScheduleConflict> {
        self.conflicts.iter().filter(|c| c.is_blocking()).cloned().collect()
    }

    pub fn has(&self, conflict_type: ConflictType) -> bool {
        self.conflicts.iter().any(|c| c.conflict_type == conflict_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_shape_uses_snake_case_type_and_lowercase_severity() {
        let c = ScheduleConflict::error(
            ConflictType::HosViolation,
            "Driver X has insufficient hours remaining",
            "SCH-1",
            &["Assign a different driver"],
        );
        let json = serde_json::to_string(&c).unwrap();
        assert!(json.contains("\"type\":\"hos_violation\""));
        assert!(json.contains("\"severity\":\"error\""));
        assert!(json.contains("\"affected_schedules\":[\"SCH-1\"]"));
    }

    #[test]
    fn warnings_do_not_invalidate() {
        let warn = ScheduleConflict::warning(ConflictType::MaintenanceRequired, "due soon", "SCH-1", &[]);
        let v = ScheduleValidation::from_parts(vec![warn.clone()], vec![], vec![]);
        assert!(v.is_valid);
        assert!(v.blocking().is_empty());

        let err = ScheduleConflict::error(ConflictType::DoubleBooking, "busy", "SCH-1", &[]);
        let v = ScheduleValidation::from_parts(vec![warn, err], vec![], vec![]);
        assert!(!v.is_valid);
        assert_eq!(v.blocking().len(), 1);
        assert!(v.has(ConflictType::DoubleBooking));
    }
}
