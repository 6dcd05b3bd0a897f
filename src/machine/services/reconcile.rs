//! Fleet reconciliation planning.
//!
//! Appends one random status change per existing machine, re-derives each
//! current status over the full history and tops the fleet up with newly
//! generated machines. Planning is pure; the repository applies the result
//! in one unit of work.

use crate::machine::{
    domain::{
        ChangeCountRange, HistoryWindow, Machine, MachineDomainError, MachineStatus,
        StatusChange, generate_machine,
    },
    ports::{AppendedStatusChange, FleetChanges},
};
use chrono::NaiveDateTime;
use rand::Rng;
use rand::distributions::Standard;

/// Inputs for a refresh run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPlan {
    /// Reconciliation time; appended changes start here.
    pub now: NaiveDateTime,
    /// Minimum fleet size after the refresh.
    pub target_total_count: usize,
    /// Change counts for newly generated machines.
    pub counts: ChangeCountRange,
}

/// Plans the writes for refreshing `fleet`.
///
/// New machines continue the id sequence after the highest existing
/// sequence number, so ids freed by deletes are not reused.
///
/// # Errors
///
/// Returns [`MachineDomainError::SequenceOutOfRange`] when the fleet cannot
/// be topped up without exceeding the id space.
pub fn plan_refresh<R>(
    fleet: Vec<Machine>,
    plan: RefreshPlan,
    rng: &mut R,
) -> Result<FleetChanges, MachineDomainError>
where
    R: Rng + ?Sized,
{
    let existing = fleet.len();
    let next_sequence = fleet
        .iter()
        .map(|machine| machine.id().sequence())
        .max()
        .unwrap_or(0)
        .saturating_add(1);

    let appended = fleet
        .into_iter()
        .map(|mut machine| {
            let status: MachineStatus = rng.sample(Standard);
            let change = StatusChange::new(status, plan.now);
            let current_status = machine.record_status_change(change);
            AppendedStatusChange {
                machine_id: machine.id().clone(),
                change,
                current_status,
            }
        })
        .collect();

    let window = HistoryWindow::for_day(plan.now);
    let missing = plan.target_total_count.saturating_sub(existing);
    let created = (0..missing)
        .map(|offset| {
            let sequence = u32::try_from(offset)
                .ok()
                .and_then(|step| next_sequence.checked_add(step))
                .unwrap_or(u32::MAX);
            generate_machine(rng, sequence, window, plan.counts)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FleetChanges { appended, created })
}
