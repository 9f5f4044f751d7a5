//! Repository seam and the in-memory store.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{SchedulingError, SchedulingResult};
use crate::fixtures;
use crate::resources::{DriverAvailability, VehicleAvailability};
use crate::schedule::Schedule;

/// Storage for schedules and resource records.
///
/// Schedules keep insertion order; `replace_schedule` updates in place.
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    async fn list_schedules(&self) -> SchedulingResult<Vec<Schedule>>;
    async fn find_schedule(&self, id: &str) -> SchedulingResult<Option<Schedule>>;
    /// Fails with `InvalidInput` when the id is already taken.
    async fn insert_schedule(&self, schedule: &Schedule) -> SchedulingResult<()>;
    /// Returns `false` when no schedule has that id.
    async fn replace_schedule(&self, schedule: &Schedule) -> SchedulingResult<bool>;
    async fn remove_schedule(&self, id: &str) -> SchedulingResult<Option<Schedule>>;

    async fn list_drivers(&self) -> SchedulingResult<Vec<DriverAvailability>>;
    async fn find_driver(&self, id: &str) -> SchedulingResult<Option<DriverAvailability>>;
    /// Insert or overwrite by `driver_id`.
    async fn save_driver(&self, driver: &DriverAvailability) -> SchedulingResult<()>;

    async fn list_vehicles(&self) -> SchedulingResult<Vec<VehicleAvailability>>;
    async fn find_vehicle(&self, id: &str) -> SchedulingResult<Option<VehicleAvailability>>;
    /// Insert or overwrite by `vehicle_id`.
    async fn save_vehicle(&self, vehicle: &VehicleAvailability) -> SchedulingResult<()>;
}

/// Full repository contents, as persisted by the CLI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub drivers: Vec<DriverAvailability>,
    #[serde(default)]
    pub vehicles: Vec<VehicleAvailability>,
    #[serde(default)]
    pub schedules: Vec<Schedule>,
}

impl Snapshot {
    pub fn seeded() -> Self {
        Self {
            drivers: fixtures::drivers(),
            vehicles: fixtures::vehicles(),
            schedules: fixtures::schedules(),
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemoryRepository {
    state: RwLock<Snapshot>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with the seed fleet.
    pub fn seeded() -> Self {
        Self::from_snapshot(Snapshot::seeded())
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            state: RwLock::new(snapshot),
        }
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.state.read().await.clone()
    }
}

fn upsert<T: Clone>(items: &mut Vec<T>, item: &T, same: impl Fn(&T) -> bool) {
    match items.iter_mut().find(|existing| same(existing)) {
        Some(slot) => *slot = item.clone(),
        None => items.push(item.clone()),
    }
}

#[async_trait]
impl ScheduleRepository for InMemoryRepository {
    async fn list_schedules(&self) -> SchedulingResult<Vec<Schedule>> {
        Ok(self.state.read().await.schedules.clone())
    }

    async fn find_schedule(&self, id: &str) -> SchedulingResult<Option<Schedule>> {
        Ok(self.state.read().await.schedules.iter().find(|s| s.id == id).cloned())
    }

    async fn insert_schedule(&self, schedule: &Schedule) -> SchedulingResult<()> {
        let mut state = self.state.write().await;
        if state.schedules.iter().any(|s| s.id == schedule.id) {
            return Err(SchedulingError::invalid_input(format!(
                "schedule {} already exists",
                schedule.id
            )));
        }
        state.schedules.push(schedule.clone());
        Ok(())
    }

    async fn replace_schedule(&self, schedule: &Schedule) -> SchedulingResult<bool> {
        let mut state = self.state.write().await;
        match state.schedules.iter_mut().find(|s| s.id == schedule.id) {
            Some(slot) => {
                *slot = schedule.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove_schedule(&self, id: &str) -> SchedulingResult<Option<Schedule>> {
        let mut state = self.state.write().await;
        let pos = state.schedules.iter().position(|s| s.id == id);
        Ok(pos.map(|i| state.schedules.remove(i)))
    }

    async fn list_drivers(&self) -> SchedulingResult<Vec<DriverAvailability>> {
        Ok(self.state.read().await.drivers.clone())
    }

    async fn find_driver(&self, id: &str) -> SchedulingResult<Option<DriverAvailability>> {
        Ok(self.state.read().await.drivers.iter().find(|d| d.driver_id == id).cloned())
    }

    async fn save_driver(&self, driver: &DriverAvailability) -> SchedulingResult<()> {
        let mut state = self.state.write().await;
        upsert(&mut state.drivers, driver, |d| d.driver_id == driver.driver_id);
        Ok(())
    }

    async fn list_vehicles(&self) -> SchedulingResult<Vec<VehicleAvailability>> {
        Ok(self.state.read().await.vehicles.clone())
    }

    async fn find_vehicle(&self, id: &str) -> SchedulingResult<Option<VehicleAvailability>> {
        Ok(self.state.read().await.vehicles.iter().find(|v| v.vehicle_id == id).cloned())
    }

    async fn save_vehicle(&self, vehicle: &VehicleAvailability) -> SchedulingResult<()> {
        let mut state = self.state.write().await;
        upsert(&mut state.vehicles, vehicle, |v| v.vehicle_id == vehicle.vehicle_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_rejects_duplicate_ids() {
        let repo = InMemoryRepository::seeded();
        let dup = fixtures::schedules().remove(0);
        let err = repo.insert_schedule(&dup).await.unwrap_err();
        assert!(matches!(err, SchedulingError::InvalidInput(_)));
        assert_eq!(repo.list_schedules().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn replace_keeps_position() {
        let repo = InMemoryRepository::seeded();
        let mut first = repo.find_schedule("SCH-001").await.unwrap().unwrap();
        first.title = "Renamed".into();
        assert!(repo.replace_schedule(&first).await.unwrap());

        let all = repo.list_schedules().await.unwrap();
        assert_eq!(all[0].title, "Renamed");

        first.id = "SCH-404".into();
        assert!(!repo.replace_schedule(&first).await.unwrap());
    }

    #[tokio::test]
    async fn save_driver_upserts() {
        let repo = InMemoryRepository::new();
        let mut d = DriverAvailability::new("DRV-1", "Ann", 10.0, 60.0);
        repo.save_driver(&d).await.unwrap();
        d.consume_hours(5.0);
        repo.save_driver(&d).await.unwrap();

        let drivers = repo.list_drivers().await.unwrap();
        assert_eq!(drivers.len(), 1);
        assert_eq!(drivers[0].hours_remaining, 45.0);
    }

    #[tokio::test]
    async fn snapshot_round_trips_through_json() {
        let repo = InMemoryRepository::seeded();
        let json = serde_json::to_string(&repo.snapshot().await).unwrap();
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Snapshot::seeded());
    }

    #[tokio::test]
    async fn remove_returns_the_schedule() {
        let repo = InMemoryRepository::seeded();
        let removed = repo.remove_schedule("SCH-002").await.unwrap();
        assert_eq!(removed.map(|s| s.id), Some("SCH-002".to_string()));
        assert!(repo.remove_schedule("SCH-002").await.unwrap().is_none());
    }
}
