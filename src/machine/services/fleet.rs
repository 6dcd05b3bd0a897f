//! Service layer for machine fleet access, generation and refresh.
//!
//! Provides [`MachineFleetService`] which coordinates reads, deletes, demo
//! data generation and reconciliation against a [`MachineRepository`].

use super::reconcile::{RefreshPlan, plan_refresh};
use crate::machine::{
    domain::{
        ChangeCountRange, HistoryWindow, Machine, MachineDomainError, MachineId, generate_machine,
    },
    ports::{MachineRepository, MachineRepositoryError},
};
use mockable::Clock;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tracing::{debug, info, instrument};

/// Fleet size used when a caller does not ask for one.
pub const DEFAULT_FLEET_SIZE: usize = 100;

/// Largest fleet the id space can hold.
pub const MAX_FLEET_SIZE: usize = MachineId::MAX_SEQUENCE as usize;

/// Service-level errors for machine fleet operations.
#[derive(Debug, Error)]
pub enum MachineFleetServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] MachineDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] MachineRepositoryError),
    /// The request was rejected before touching persistence.
    #[error("invalid fleet size {requested}, expected {min}..={max}")]
    InvalidFleetSize {
        /// Requested machine count.
        requested: usize,
        /// Smallest accepted count.
        min: usize,
        /// Largest accepted count.
        max: usize,
    },
}

/// Result type for machine fleet service operations.
pub type MachineFleetServiceResult<T> = Result<T, MachineFleetServiceError>;

/// Machine fleet orchestration service.
#[derive(Clone)]
pub struct MachineFleetService<R, C>
where
    R: MachineRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    rng: Arc<Mutex<StdRng>>,
    counts: ChangeCountRange,
}

impl<R, C> MachineFleetService<R, C>
where
    R: MachineRepository,
    C: Clock + Send + Sync,
{
    /// Creates a service drawing randomness from OS entropy.
    #[must_use]
    pub fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self {
            repository,
            clock,
            rng: Arc::new(Mutex::new(StdRng::from_entropy())),
            counts: ChangeCountRange::default(),
        }
    }

    /// Replaces the random source with one seeded from `seed`.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Arc::new(Mutex::new(StdRng::seed_from_u64(seed)));
        self
    }

    /// Sets how many status changes generated machines receive.
    #[must_use]
    pub const fn with_change_counts(mut self, counts: ChangeCountRange) -> Self {
        self.counts = counts;
        self
    }

    /// Returns every machine with its history, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`MachineFleetServiceError::Repository`] when persistence
    /// lookup fails.
    pub async fn list_machines(&self) -> MachineFleetServiceResult<Vec<Machine>> {
        Ok(self.repository.list_all().await?)
    }

    /// Finds a machine by its external identifier.
    ///
    /// Returns `Ok(None)` for unknown and malformed identifiers alike.
    ///
    /// # Errors
    ///
    /// Returns [`MachineFleetServiceError::Repository`] when persistence
    /// lookup fails.
    pub async fn get_machine(&self, id: &str) -> MachineFleetServiceResult<Option<Machine>> {
        let Some(machine_id) = parse_lookup_id(id) else {
            return Ok(None);
        };
        Ok(self.repository.find_by_id(&machine_id).await?)
    }

    /// Deletes a machine and its status history.
    ///
    /// Returns `false` when no machine has the identifier, including
    /// malformed identifiers; repeated deletes keep returning `false`.
    ///
    /// # Errors
    ///
    /// Returns [`MachineFleetServiceError::Repository`] when persistence
    /// fails.
    #[instrument(skip(self))]
    pub async fn delete_machine(&self, id: &str) -> MachineFleetServiceResult<bool> {
        let Some(machine_id) = parse_lookup_id(id) else {
            return Ok(false);
        };
        let deleted = self.repository.delete(&machine_id).await?;
        if deleted {
            info!(machine_id = %machine_id, "deleted machine");
        }
        Ok(deleted)
    }

    /// Generates `count` machines with ids `0001` up to `count` and a random
    /// history for the current day, storing them in one batch.
    ///
    /// # Errors
    ///
    /// Returns [`MachineFleetServiceError::InvalidFleetSize`] when `count` is
    /// outside `1..=9999`, or [`MachineFleetServiceError::Repository`] when
    /// any id is already taken or persistence fails. Nothing is stored on
    /// error.
    #[instrument(skip(self))]
    pub async fn generate_machines(&self, count: usize) -> MachineFleetServiceResult<Vec<Machine>> {
        let sequence_count = validate_fleet_size(count, 1)?;
        let window = HistoryWindow::for_day(self.clock.local().naive_local());
        let counts = self.counts;

        let machines = self.with_rng(|rng| {
            (1..=sequence_count)
                .map(|sequence| generate_machine(rng, sequence, window, counts))
                .collect::<Result<Vec<_>, _>>()
        })?;

        self.repository.store_all(&machines).await?;
        info!(count = machines.len(), day_start = %window.start(), "generated machines");
        Ok(machines)
    }

    /// Appends one random status change to every machine, re-derives their
    /// current statuses and generates new machines until the fleet holds at
    /// least `target_total_count` machines.
    ///
    /// Returns the whole fleet ordered by id. The refresh applies atomically.
    ///
    /// # Errors
    ///
    /// Returns [`MachineFleetServiceError::InvalidFleetSize`] when the target
    /// exceeds 9999, or [`MachineFleetServiceError::Repository`] when the
    /// id space is exhausted or persistence fails.
    #[instrument(skip(self))]
    pub async fn refresh(
        &self,
        target_total_count: usize,
    ) -> MachineFleetServiceResult<Vec<Machine>> {
        validate_fleet_size(target_total_count, 0)?;
        let plan = RefreshPlan {
            now: self.clock.local().naive_local(),
            target_total_count,
            counts: self.counts,
        };
        let seed = self.with_rng(RngCore::next_u64);

        let fleet = self
            .repository
            .reconcile(Box::new(move |existing| {
                let mut rng = StdRng::seed_from_u64(seed);
                plan_refresh(existing, plan, &mut rng)
            }))
            .await?;

        debug!(now = %plan.now, "reconciled status history");
        info!(total = fleet.len(), "refreshed machines");
        Ok(fleet)
    }

    /// Runs `f` with exclusive access to the random source.
    ///
    /// The guard never outlives `f`, so it is not held across awaits.
    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }
}

fn parse_lookup_id(raw: &str) -> Option<MachineId> {
    match MachineId::new(raw) {
        Ok(id) => Some(id),
        Err(err) => {
            debug!(error = %err, "treating malformed machine id as unknown");
            None
        }
    }
}

/// Checks `count` against `min..=MAX_FLEET_SIZE` and narrows it to a
/// sequence number.
fn validate_fleet_size(count: usize, min: usize) -> MachineFleetServiceResult<u32> {
    let invalid = || MachineFleetServiceError::InvalidFleetSize {
        requested: count,
        min,
        max: MAX_FLEET_SIZE,
    };
    if count < min || count > MAX_FLEET_SIZE {
        return Err(invalid());
    }
    u32::try_from(count).map_err(|_| invalid())
}
