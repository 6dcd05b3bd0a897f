//! Reconciliation and fleet top-up over the in-memory repository.

use crate::test_helpers::{FixedClock, at, memory_service};
use machine_status::machine::{
    adapters::memory::InMemoryMachineRepository,
    domain::{Machine, MachineId, MachineStatus, StatusChange},
    ports::{MachineRepository, MachineRepositoryError},
    services::{MachineFleetService, MachineFleetServiceError},
};
use rstest::rstest;
use std::sync::Arc;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn repeated_refreshes_accumulate_history() {
    let repository = Arc::new(InMemoryMachineRepository::new());
    let morning = MachineFleetService::new(
        Arc::clone(&repository),
        Arc::new(FixedClock::at(at(8, 0, 0))),
    )
    .with_seed(1);
    let evening = MachineFleetService::new(
        Arc::clone(&repository),
        Arc::new(FixedClock::at(at(20, 0, 0))),
    )
    .with_seed(2);
    let initial = morning
        .generate_machines(2)
        .await
        .expect("generation should succeed");

    morning.refresh(2).await.expect("morning refresh should succeed");
    let fleet = evening.refresh(2).await.expect("evening refresh should succeed");

    for (before, after) in initial.iter().zip(&fleet) {
        assert_eq!(after.history().len(), before.history().len() + 2);
        let tail: Vec<_> = after
            .history()
            .iter()
            .rev()
            .take(2)
            .map(StatusChange::start_time)
            .collect();
        assert_eq!(tail, [at(20, 0, 0), at(8, 0, 0)]);
        assert_eq!(
            Some(after.current_status()),
            after.history().last().map(StatusChange::status)
        );
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn refresh_result_matches_stored_fleet() {
    let service = memory_service(at(12, 0, 0), 5);
    service
        .generate_machines(4)
        .await
        .expect("generation should succeed");

    let refreshed = service.refresh(6).await.expect("refresh should succeed");
    let stored = service.list_machines().await.expect("listing should succeed");

    assert_eq!(refreshed, stored);
    assert_eq!(refreshed.len(), 6);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn topped_up_machines_get_a_fresh_day_history() {
    let service = memory_service(at(12, 0, 0), 5);
    service
        .generate_machines(1)
        .await
        .expect("generation should succeed");

    let fleet = service.refresh(3).await.expect("refresh should succeed");

    for machine in fleet.iter().skip(1) {
        assert_eq!(
            machine.history().first().map(StatusChange::start_time),
            Some(at(0, 0, 0))
        );
        assert!(
            machine
                .history()
                .iter()
                .all(|change| change.start_time() <= at(12, 0, 0))
        );
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn exhausted_id_space_rejects_refresh_without_changes() {
    let repository = Arc::new(InMemoryMachineRepository::new());
    let service = MachineFleetService::new(
        Arc::clone(&repository),
        Arc::new(FixedClock::at(at(12, 0, 0))),
    )
    .with_seed(5);
    let last = Machine::new(
        MachineId::from_sequence(9999).expect("valid sequence"),
        vec![StatusChange::new(MachineStatus::Idle, at(0, 0, 0))],
    )
    .expect("valid machine");
    repository
        .store_all(std::slice::from_ref(&last))
        .await
        .expect("store should succeed");

    let result = service.refresh(2).await;

    assert!(matches!(
        result,
        Err(MachineFleetServiceError::Repository(
            MachineRepositoryError::Rejected(_)
        ))
    ));
    let stored = service.list_machines().await.expect("listing should succeed");
    assert_eq!(stored, vec![last]);
}
