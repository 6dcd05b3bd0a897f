//! Batch generation invariants over the in-memory repository.

use crate::test_helpers::{MemoryFleetService, at, memory_service};
use machine_status::machine::domain::{MachineStatus, StatusChange};
use rstest::{fixture, rstest};

#[fixture]
fn service() -> MemoryFleetService {
    memory_service(at(18, 5, 44), 7)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn every_generated_machine_satisfies_history_invariants(service: MemoryFleetService) {
    let machines = service
        .generate_machines(250)
        .await
        .expect("generation should succeed");

    assert_eq!(machines.len(), 250);
    for machine in &machines {
        let history = machine.history();
        assert!((1..=7).contains(&history.len()));
        assert_eq!(history.first().map(StatusChange::start_time), Some(at(0, 0, 0)));
        assert!(
            history
                .windows(2)
                .all(|pair| matches!(pair, [a, b] if a.start_time() <= b.start_time()))
        );
        let latest = history
            .iter()
            .max_by_key(|change| change.start_time())
            .expect("non-empty history");
        assert_eq!(machine.current_status(), latest.status());
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn generated_ids_are_sorted_and_zero_padded(service: MemoryFleetService) {
    let machines = service
        .generate_machines(12)
        .await
        .expect("generation should succeed");

    let ids: Vec<String> = machines.iter().map(|m| m.id().to_string()).collect();
    let expected: Vec<String> = (1..=12).map(|n| format!("{n:04}")).collect();
    assert_eq!(ids, expected);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn large_fleet_draws_every_status(service: MemoryFleetService) {
    let machines = service
        .generate_machines(300)
        .await
        .expect("generation should succeed");

    for status in MachineStatus::ALL {
        assert!(
            machines
                .iter()
                .flat_map(|machine| machine.history())
                .any(|change| change.status() == status),
            "status {status} never drawn"
        );
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn same_seed_generates_same_fleet() {
    let first = memory_service(at(9, 0, 0), 99)
        .generate_machines(20)
        .await
        .expect("generation should succeed");
    let second = memory_service(at(9, 0, 0), 99)
        .generate_machines(20)
        .await
        .expect("generation should succeed");

    assert_eq!(first, second);
}
