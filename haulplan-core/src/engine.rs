//! Scheduling engine: validated create/update/delete over a repository.
//!
//! Every validate-then-mutate sequence runs under one async mutex, so two
//! concurrent writers can never both pass validation against the same
//! driver hours or the same vehicle slot. Reads go straight to the repository.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::availability::{available_drivers, available_vehicles};
use crate::conflict::{ConflictType, ScheduleConflict, ScheduleValidation};
use crate::error::{SchedulingError, SchedulingResult};
use crate::overlap::colliding;
use crate::policy::SchedulingPolicy;
use crate::reporting::{self, ScheduleStatistics, WeeklyScheduleView};
use crate::resources::{DriverAvailability, VehicleAvailability};
use crate::schedule::{
    Schedule, ScheduleDraft, ScheduleFilter, SchedulePriority, ScheduleStatus, ScheduleType,
};
use crate::store::ScheduleRepository;
use crate::time::{local_now, local_today, Clock, SystemClock};
use crate::validator::{validate_schedule, ResourceView};

/// Result of a create or update.
///
/// On rejection `schedule` is `None` and `conflicts` holds only the blocking
/// conflicts. On success it holds the remaining non-blocking ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleOutcome {
    pub success: bool,
    pub schedule: Option<Schedule>,
    pub conflicts: Vec<ScheduleConflict>,
    pub warnings: Vec<String>,
    pub recommendations: Vec<String>,
}

impl ScheduleOutcome {
    fn accepted(schedule: Schedule, validation: ScheduleValidation) -> Self {
        Self {
            success: true,
            schedule: Some(schedule),
            conflicts: validation.conflicts,
            warnings: validation.warnings,
            recommendations: validation.recommendations,
        }
    }

    fn rejected(conflicts: Vec<ScheduleConflict>) -> Self {
        Self {
            success: false,
            schedule: None,
            conflicts,
            warnings: Vec::new(),
            recommendations: Vec::new(),
        }
    }

    fn not_found() -> Self {
        Self::rejected(Vec::new())
    }
}

/// Fresh schedule id, `SCH-` plus eight uppercase hex digits.
pub fn generate_schedule_id() -> String {
    let raw = Uuid::new_v4().simple().to_string();
    format!("SCH-{}", raw[..8].to_uppercase())
}

pub struct SchedulingEngine<R: ScheduleRepository> {
    repo: R,
    policy: SchedulingPolicy,
    clock: Arc<dyn Clock>,
    write_lock: Mutex<()>,
}

impl<R: ScheduleRepository> SchedulingEngine<R> {
    pub fn new(repo: R, policy: SchedulingPolicy) -> Self {
        Self {
            repo,
            policy,
            clock: Arc::new(SystemClock),
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn policy(&self) -> &SchedulingPolicy {
        &self.policy
    }

    pub async fn create_schedule(&self, draft: ScheduleDraft) -> SchedulingResult<ScheduleOutcome> {
        let _guard = self.write_lock.lock().await;

        let id = match draft.id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => {
                if self.repo.find_schedule(id).await?.is_some() {
                    return Err(SchedulingError::invalid_input(format!("schedule {id} already exists")));
                }
                id.to_string()
            }
            None => self.fresh_schedule_id().await?,
        };

        let now = self.clock.now();
        let today = local_today(&self.policy.timezone, now)?;
        let start_date = draft.start_date.unwrap_or(today);

        let mut schedule = Schedule {
            id,
            title: "Untitled Schedule".to_string(),
            description: None,
            start_date,
            end_date: draft.end_date.unwrap_or(start_date),
            start_time: self.policy.default_start_time,
            end_time: self.policy.default_end_time,
            status: ScheduleStatus::Scheduled,
            priority: SchedulePriority::Medium,
            schedule_type: ScheduleType::Other,
            assigned_driver_id: None,
            driver_name: None,
            assigned_vehicle_id: None,
            vehicle_name: None,
            origin: None,
            destination: None,
            estimated_hours: None,
            estimated_distance: None,
            estimated_duration: None,
            hos_compliance: None,
            license_verified: None,
            vehicle_inspection_current: None,
            maintenance_required: None,
            notes: None,
            created_by: draft
                .created_by
                .clone()
                .filter(|by| !by.trim().is_empty())
                .unwrap_or_else(|| self.policy.default_created_by.clone()),
            created_at: now,
            updated_at: now,
            completed_at: None,
        };
        schedule.apply(&draft);
        if schedule.status == ScheduleStatus::Completed {
            schedule.completed_at = Some(local_now(&self.policy.timezone, now)?);
        }

        let drivers = self.repo.list_drivers().await?;
        let vehicles = self.repo.list_vehicles().await?;
        let stored = self.repo.list_schedules().await?;
        fill_resource_names(&mut schedule, &drivers, &vehicles);

        let view = ResourceView {
            drivers: &drivers,
            vehicles: &vehicles,
            schedules: &stored,
        };
        let validation = validate_schedule(&schedule, &view, &self.policy);
        if !validation.is_valid {
            warn!(
                schedule_id = %schedule.id,
                conflicts = validation.blocking().len(),
                "schedule rejected"
            );
            return Ok(ScheduleOutcome::rejected(validation.blocking()));
        }

        let backup = self.backup_resources(&[&schedule]).await?;
        self.repo.insert_schedule(&schedule).await?;
        if let Err(err) = self.allocate(&schedule).await {
            if let Err(undo) = self.repo.remove_schedule(&schedule.id).await {
                warn!(schedule_id = %schedule.id, error = %undo, "could not remove schedule after failed allocation");
            }
            self.restore_resources(backup).await;
            return Err(err);
        }

        info!(
            schedule_id = %schedule.id,
            driver = schedule.assigned_driver_id.as_deref().unwrap_or("-"),
            vehicle = schedule.assigned_vehicle_id.as_deref().unwrap_or("-"),
            hours = schedule.effective_hours(),
            "schedule created"
        );
        Ok(ScheduleOutcome::accepted(schedule, validation))
    }

    pub async fn update_schedule(&self, id: &str, draft: ScheduleDraft) -> SchedulingResult<ScheduleOutcome> {
        let _guard = self.write_lock.lock().await;

        let Some(previous) = self.repo.find_schedule(id).await? else {
            warn!(schedule_id = id, "update of unknown schedule");
            return Ok(ScheduleOutcome::not_found());
        };

        if let Some(next) = draft.status {
            if !previous.status.can_transition_to(next) {
                warn!(schedule_id = id, from = %previous.status, to = %next, "status transition refused");
                return Ok(ScheduleOutcome::rejected(vec![transition_conflict(&previous, next)]));
            }
        }

        let now = self.clock.now();
        let mut schedule = previous.clone();
        schedule.apply(&draft);
        schedule.updated_at = now;
        if schedule.status == ScheduleStatus::Completed && previous.status != ScheduleStatus::Completed {
            schedule.completed_at = Some(local_now(&self.policy.timezone, now)?);
        }

        let drivers = self.repo.list_drivers().await?;
        let vehicles = self.repo.list_vehicles().await?;
        let stored = self.repo.list_schedules().await?;
        fill_resource_names(&mut schedule, &drivers, &vehicles);

        let view = ResourceView {
            drivers: &drivers,
            vehicles: &vehicles,
            schedules: &stored,
        };
        let validation = validate_schedule(&schedule, &view, &self.policy);
        if !validation.is_valid {
            warn!(
                schedule_id = id,
                conflicts = validation.blocking().len(),
                "schedule update rejected"
            );
            return Ok(ScheduleOutcome::rejected(validation.blocking()));
        }

        let backup = self.backup_resources(&[&previous, &schedule]).await?;
        self.repo.replace_schedule(&schedule).await?;
        let vehicle_was_held = previous.status == ScheduleStatus::InProgress;
        let moved = match self.release(&previous, &stored, vehicle_was_held).await {
            Ok(()) => self.allocate(&schedule).await,
            Err(err) => Err(err),
        };
        if let Err(err) = moved {
            if let Err(undo) = self.repo.replace_schedule(&previous).await {
                warn!(schedule_id = id, error = %undo, "could not restore schedule after failed reallocation");
            }
            self.restore_resources(backup).await;
            return Err(err);
        }

        info!(
            schedule_id = id,
            status = %schedule.status,
            hours = schedule.effective_hours(),
            "schedule updated"
        );
        Ok(ScheduleOutcome::accepted(schedule, validation))
    }

    /// Remove a schedule and hand back what it held. `false` for unknown ids.
    pub async fn delete_schedule(&self, id: &str) -> SchedulingResult<bool> {
        let _guard = self.write_lock.lock().await;

        let Some(removed) = self.repo.remove_schedule(id).await? else {
            return Ok(false);
        };
        let remaining = self.repo.list_schedules().await?;
        self.release(&removed, &remaining, true).await?;

        info!(schedule_id = id, "schedule deleted");
        Ok(true)
    }

    /// Stored schedules narrowed by `filter`, ascending by start date-time.
    pub async fn get_schedules(&self, filter: Option<&ScheduleFilter>) -> SchedulingResult<Vec<Schedule>> {
        let mut schedules = self.repo.list_schedules().await?;
        if let Some(filter) = filter {
            schedules.retain(|s| filter.matches(s));
        }
        schedules.sort_by_key(Schedule::starts_at);
        Ok(schedules)
    }

    pub async fn get_schedule_by_id(&self, id: &str) -> SchedulingResult<Option<Schedule>> {
        self.repo.find_schedule(id).await
    }

    /// Validate without storing. A stored schedule may be passed as-is.
    pub async fn validate_schedule(&self, schedule: &Schedule) -> SchedulingResult<ScheduleValidation> {
        let drivers = self.repo.list_drivers().await?;
        let vehicles = self.repo.list_vehicles().await?;
        let stored = self.repo.list_schedules().await?;
        let view = ResourceView {
            drivers: &drivers,
            vehicles: &vehicles,
            schedules: &stored,
        };
        Ok(validate_schedule(schedule, &view, &self.policy))
    }

    /// All drivers, or the one matching `driver_id`. `has_conflict` is
    /// recomputed from the stored schedules.
    pub async fn get_driver_availability(&self, driver_id: Option<&str>) -> SchedulingResult<Vec<DriverAvailability>> {
        let schedules = self.repo.list_schedules().await?;
        let mut drivers = self.repo.list_drivers().await?;
        if let Some(id) = driver_id {
            drivers.retain(|d| d.driver_id == id);
        }
        for driver in drivers.iter_mut() {
            let id = driver.driver_id.as_str();
            driver.has_conflict = schedules
                .iter()
                .filter(|s| s.assigned_driver_id.as_deref() == Some(id))
                .any(|s| colliding(s, &schedules, |o| o.assigned_driver_id.as_deref() == Some(id)).next().is_some());
        }
        Ok(drivers)
    }

    pub async fn get_vehicle_availability(&self, vehicle_id: Option<&str>) -> SchedulingResult<Vec<VehicleAvailability>> {
        let mut vehicles = self.repo.list_vehicles().await?;
        if let Some(id) = vehicle_id {
            vehicles.retain(|v| v.vehicle_id == id);
        }
        Ok(vehicles)
    }

    pub async fn get_available_drivers_for_schedule(&self, draft: &ScheduleDraft) -> SchedulingResult<Vec<DriverAvailability>> {
        let drivers = self.repo.list_drivers().await?;
        let schedules = self.repo.list_schedules().await?;
        Ok(available_drivers(&drivers, draft, draft.effective_hours(), &schedules))
    }

    pub async fn get_available_vehicles_for_schedule(&self, draft: &ScheduleDraft) -> SchedulingResult<Vec<VehicleAvailability>> {
        let vehicles = self.repo.list_vehicles().await?;
        let schedules = self.repo.list_schedules().await?;
        Ok(available_vehicles(&vehicles, draft, &schedules))
    }

    pub async fn get_weekly_schedule_view(&self, week_start: NaiveDate) -> SchedulingResult<WeeklyScheduleView> {
        let drivers = self.repo.list_drivers().await?;
        let vehicles = self.repo.list_vehicles().await?;
        let schedules = self.get_schedules(None).await?;
        Ok(reporting::weekly_view(week_start, &drivers, &vehicles, &schedules))
    }

    pub async fn get_schedule_statistics(&self) -> SchedulingResult<ScheduleStatistics> {
        let schedules = self.repo.list_schedules().await?;
        let driver_count = self.repo.list_drivers().await?.len();
        Ok(reporting::statistics(&schedules, driver_count, &self.policy))
    }

    /// Generated id not yet present in the repository.
    async fn fresh_schedule_id(&self) -> SchedulingResult<String> {
        loop {
            let id = generate_schedule_id();
            if self.repo.find_schedule(&id).await?.is_none() {
                return Ok(id);
            }
        }
    }

    /// Current records of every driver and vehicle named by `schedules`.
    async fn backup_resources(&self, schedules: &[&Schedule]) -> SchedulingResult<ResourceBackup> {
        let mut backup = ResourceBackup::default();
        for s in schedules {
            if let Some(id) = s.assigned_driver_id.as_deref() {
                if !backup.drivers.iter().any(|d| d.driver_id == id) {
                    backup.drivers.extend(self.repo.find_driver(id).await?);
                }
            }
            if let Some(id) = s.assigned_vehicle_id.as_deref() {
                if !backup.vehicles.iter().any(|v| v.vehicle_id == id) {
                    backup.vehicles.extend(self.repo.find_vehicle(id).await?);
                }
            }
        }
        Ok(backup)
    }

    /// Best effort: write the backed-up records back after a failed write.
    async fn restore_resources(&self, backup: ResourceBackup) {
        for driver in &backup.drivers {
            if let Err(err) = self.repo.save_driver(driver).await {
                warn!(driver_id = %driver.driver_id, error = %err, "could not restore driver");
            }
        }
        for vehicle in &backup.vehicles {
            if let Err(err) = self.repo.save_vehicle(vehicle).await {
                warn!(vehicle_id = %vehicle.vehicle_id, error = %err, "could not restore vehicle");
            }
        }
    }

    /// Consume driver hours; occupy the vehicle when the work is under way.
    async fn allocate(&self, schedule: &Schedule) -> SchedulingResult<()> {
        if !schedule.holds_resources() {
            return Ok(());
        }
        if let Some(id) = schedule.assigned_driver_id.as_deref() {
            if let Some(mut driver) = self.repo.find_driver(id).await? {
                driver.consume_hours(schedule.effective_hours());
                self.repo.save_driver(&driver).await?;
            }
        }
        if schedule.status == ScheduleStatus::InProgress {
            if let Some(id) = schedule.assigned_vehicle_id.as_deref() {
                if let Some(mut vehicle) = self.repo.find_vehicle(id).await? {
                    vehicle.occupy();
                    self.repo.save_vehicle(&vehicle).await?;
                }
            }
        }
        Ok(())
    }

    /// Undo [`Self::allocate`]. The vehicle stays `In Use` while any other
    /// in-progress schedule still has it.
    async fn release(&self, schedule: &Schedule, others: &[Schedule], release_vehicle: bool) -> SchedulingResult<()> {
        if !schedule.holds_resources() {
            return Ok(());
        }
        if let Some(id) = schedule.assigned_driver_id.as_deref() {
            if let Some(mut driver) = self.repo.find_driver(id).await? {
                driver.release_hours(schedule.effective_hours());
                self.repo.save_driver(&driver).await?;
            }
        }
        if !release_vehicle {
            return Ok(());
        }
        if let Some(id) = schedule.assigned_vehicle_id.as_deref() {
            let still_running = others.iter().any(|o| {
                o.id != schedule.id
                    && o.status == ScheduleStatus::InProgress
                    && o.assigned_vehicle_id.as_deref() == Some(id)
            });
            if still_running {
                return Ok(());
            }
            if let Some(mut vehicle) = self.repo.find_vehicle(id).await? {
                vehicle.release();
                self.repo.save_vehicle(&vehicle).await?;
            }
        }
        Ok(())
    }
}

#[derive(Default)]
struct ResourceBackup {
    drivers: Vec<DriverAvailability>,
    vehicles: Vec<VehicleAvailability>,
}

fn transition_conflict(previous: &Schedule, next: ScheduleStatus) -> ScheduleConflict {
    let allowed: Vec<&str> = previous
        .status
        .allowed_transitions()
        .into_iter()
        .map(|s| s.label())
        .collect();
    let hint = if allowed.is_empty() {
        format!("{} is a final status", previous.status)
    } else {
        format!("Allowed next statuses: {}", allowed.join(", "))
    };
    ScheduleConflict::error(
        ConflictType::InvalidTransition,
        format!("Cannot change status from {} to {}", previous.status, next),
        &previous.id,
        &[hint.as_str()],
    )
}

/// Copy driver and vehicle names from the resource records when missing.
fn fill_resource_names(schedule: &mut Schedule, drivers: &[DriverAvailability], vehicles: &[VehicleAvailability]) {
    if schedule.driver_name.is_none() {
        if let Some(id) = schedule.assigned_driver_id.as_deref() {
            schedule.driver_name = drivers.iter().find(|d| d.driver_id == id).map(|d| d.name.clone());
        }
    }
    if schedule.vehicle_name.is_none() {
        if let Some(id) = schedule.assigned_vehicle_id.as_deref() {
            schedule.vehicle_name = vehicles.iter().find(|v| v.vehicle_id == id).map(|v| v.name.clone());
        }
    }
}
