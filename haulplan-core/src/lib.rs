//! haulplan-core: scheduling engine for fleet drivers and vehicles

pub mod availability;
pub mod conflict;
pub mod engine;
pub mod error;
pub mod fixtures;
pub mod labels;
pub mod overlap;
pub mod policy;
pub mod reporting;
pub mod resources;
pub mod schedule;
pub mod store;
pub mod time;
pub mod validator;

pub use conflict::{ConflictSeverity, ConflictType, ScheduleConflict, ScheduleValidation};
pub use engine::{generate_schedule_id, ScheduleOutcome, SchedulingEngine};
pub use error::{SchedulingError, SchedulingResult};
pub use overlap::{is_time_overlap, TimeWindow};
pub use policy::{SchedulingPolicy, DEFAULT_ESTIMATED_HOURS};
pub use reporting::{
    DailySchedule, DriverWeeklySchedule, ScheduleStatistics, VehicleWeeklySchedule, WeeklyScheduleView,
};
pub use resources::{
    DriverAvailability, DriverStatus, EldStatus, InspectionStatus, LicenseStatus, VehicleAvailability,
    VehicleStatus,
};
pub use schedule::{Schedule, ScheduleDraft, ScheduleFilter, SchedulePriority, ScheduleStatus, ScheduleType};
pub use store::{InMemoryRepository, ScheduleRepository, Snapshot};
pub use time::{Clock, FixedClock, SystemClock};
