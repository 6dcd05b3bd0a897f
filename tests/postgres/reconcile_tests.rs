//! Atomic refresh against `PostgreSQL`.

use crate::postgres::helpers::{PgContext, count_status_change_rows, machine, pg_context};
use crate::test_helpers::at;
use machine_status::machine::{
    domain::{Machine, MachineDomainError, MachineId, MachineStatus, StatusChange},
    ports::{AppendedStatusChange, FleetChanges, MachineRepository, MachineRepositoryError},
};
use rstest::rstest;

fn seed_fleet(context: &PgContext) {
    let fleet = vec![
        machine(1, &[(MachineStatus::Idle, 0, 0), (MachineStatus::Down, 7, 0)]),
        machine(2, &[(MachineStatus::Production, 0, 0)]),
    ];
    context
        .rt
        .block_on(context.repo.store_all(&fleet))
        .expect("store should succeed");
}

#[rstest]
fn appended_changes_and_new_machines_commit_together(pg_context: PgContext) {
    let context = pg_context;
    seed_fleet(&context);

    let fleet = context
        .rt
        .block_on(context.repo.reconcile(Box::new(|mut existing: Vec<Machine>| {
            let mut appended = Vec::new();
            for current in &mut existing {
                let change = StatusChange::new(MachineStatus::Installing, at(15, 0, 0));
                let current_status = current.record_status_change(change);
                appended.push(AppendedStatusChange {
                    machine_id: current.id().clone(),
                    change,
                    current_status,
                });
            }
            let created = vec![machine(3, &[(MachineStatus::Other, 0, 0)])];
            Ok(FleetChanges { appended, created })
        })))
        .expect("reconcile should succeed");

    let ids: Vec<&str> = fleet.iter().map(|m| m.id().as_str()).collect();
    assert_eq!(ids, ["0001", "0002", "0003"]);
    for refreshed in fleet.iter().take(2) {
        assert_eq!(refreshed.current_status(), MachineStatus::Installing);
        assert_eq!(
            refreshed.history().last().map(StatusChange::start_time),
            Some(at(15, 0, 0))
        );
    }
    assert_eq!(count_status_change_rows(&context, "0001"), 3);
    let listed = context
        .rt
        .block_on(context.repo.list_all())
        .expect("list should succeed");
    assert_eq!(listed, fleet);
}

#[rstest]
fn rejected_reconciliation_leaves_store_unchanged(pg_context: PgContext) {
    let context = pg_context;
    seed_fleet(&context);
    let before = context
        .rt
        .block_on(context.repo.list_all())
        .expect("list should succeed");

    let result = context.rt.block_on(
        context
            .repo
            .reconcile(Box::new(|_: Vec<Machine>| Err(MachineDomainError::SequenceOutOfRange(10_000)))),
    );

    assert!(matches!(result, Err(MachineRepositoryError::Rejected(_))));
    let after = context
        .rt
        .block_on(context.repo.list_all())
        .expect("list should succeed");
    assert_eq!(after, before);
}

#[rstest]
fn failing_write_rolls_back_earlier_appends(pg_context: PgContext) {
    let context = pg_context;
    seed_fleet(&context);
    let before = context
        .rt
        .block_on(context.repo.list_all())
        .expect("list should succeed");

    let result = context.rt.block_on(context.repo.reconcile(Box::new(|existing: Vec<Machine>| {
        let appended = existing
            .iter()
            .map(|current| AppendedStatusChange {
                machine_id: current.id().clone(),
                change: StatusChange::new(MachineStatus::Down, at(16, 0, 0)),
                current_status: MachineStatus::Down,
            })
            .collect();
        // Reusing an existing id makes the insert step fail after the appends.
        let created = vec![machine(2, &[(MachineStatus::Idle, 0, 0)])];
        Ok(FleetChanges { appended, created })
    })));

    assert!(matches!(
        result,
        Err(MachineRepositoryError::DuplicateMachine(ref dup))
            if *dup == MachineId::new("0002").expect("valid id")
    ));
    let after = context
        .rt
        .block_on(context.repo.list_all())
        .expect("list should succeed");
    assert_eq!(after, before);
}
