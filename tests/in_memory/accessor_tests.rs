//! Listing, lookup and delete semantics over the in-memory repository.

use crate::test_helpers::{MemoryFleetService, at, memory_service};
use rstest::{fixture, rstest};

#[fixture]
async fn seeded_service() -> MemoryFleetService {
    let service = memory_service(at(10, 0, 0), 3);
    service
        .generate_machines(3)
        .await
        .expect("generation should succeed");
    service
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn list_returns_fleet_ordered_by_id(#[future] seeded_service: MemoryFleetService) {
    let service = seeded_service.await;

    let machines = service.list_machines().await.expect("listing should succeed");

    let ids: Vec<&str> = machines.iter().map(|m| m.id().as_str()).collect();
    assert_eq!(ids, ["0001", "0002", "0003"]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn list_of_empty_store_is_empty() {
    let service = memory_service(at(10, 0, 0), 3);

    let machines = service.list_machines().await.expect("listing should succeed");

    assert!(machines.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn lookup_matches_listing(#[future] seeded_service: MemoryFleetService) {
    let service = seeded_service.await;
    let listed = service.list_machines().await.expect("listing should succeed");

    for machine in &listed {
        let found = service
            .get_machine(machine.id().as_str())
            .await
            .expect("lookup should succeed");
        assert_eq!(found.as_ref(), Some(machine));
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_one_machine_leaves_the_rest(#[future] seeded_service: MemoryFleetService) {
    let service = seeded_service.await;
    let before = service.list_machines().await.expect("listing should succeed");

    assert!(
        service
            .delete_machine("0002")
            .await
            .expect("delete should succeed")
    );

    let after = service.list_machines().await.expect("listing should succeed");
    assert_eq!(after.len(), 2);
    let kept: Vec<_> = before
        .into_iter()
        .filter(|machine| machine.id().as_str() != "0002")
        .collect();
    assert_eq!(after, kept);
}

#[rstest]
#[case("0004")]
#[case("2")]
#[case("00002")]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_unknown_id_reports_false(
    #[future] seeded_service: MemoryFleetService,
    #[case] id: &str,
) {
    let service = seeded_service.await;

    let deleted = service.delete_machine(id).await.expect("delete should succeed");

    assert!(!deleted);
    let machines = service.list_machines().await.expect("listing should succeed");
    assert_eq!(machines.len(), 3);
}
