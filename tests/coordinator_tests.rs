//! Polling coordinator wired to a real client and mock controller

use luxtronik_ws::{
    services::describe_snapshot, LuxtronikError, SnapshotCoordinator, UpdateStatus,
};
use std::sync::Arc;
use std::time::Duration;

mod common;
use common::{fixtures::*, MockBehavior, MockLuxServer};

async fn start_server() -> MockLuxServer {
    MockLuxServer::start(
        MockBehavior::new(TWO_MENU_NAVIGATION)
            .page("0x1", TEMPERATURES_PAGE)
            .page("0x2", INPUTS_PAGE),
    )
    .await
}

#[tokio::test]
async fn test_concurrent_callers_share_one_connection() {
    let server = start_server().await;
    let coordinator = Arc::new(SnapshotCoordinator::new(
        Arc::new(server.client()),
        Duration::from_secs(60),
    ));

    let tasks: Vec<_> = (0..4)
        .map(|_| {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.get_snapshot().await })
        })
        .collect();

    for task in tasks {
        assert_eq!(task.await.unwrap().unwrap().len(), 4);
    }
    assert_eq!(server.connection_count(), 1);
    assert_eq!(coordinator.stats().fetches, 1);
}

#[tokio::test]
async fn test_unreachable_device_reports_update_failure() {
    let server = MockLuxServer::start(MockBehavior::new(TWO_MENU_NAVIGATION).silent()).await;
    let coordinator = SnapshotCoordinator::new(Arc::new(server.client()), Duration::from_secs(60));
    let status = coordinator.subscribe();

    let err = coordinator.get_snapshot().await.unwrap_err();

    assert!(matches!(err, LuxtronikError::UpdateFailed(_)), "{err}");
    assert!(status.borrow().is_failure());
    assert!(coordinator.last_snapshot().await.is_none());
}

#[tokio::test]
async fn test_polling_publishes_updates() {
    let server = start_server().await;
    let coordinator = Arc::new(SnapshotCoordinator::new(
        Arc::new(server.client()),
        Duration::from_millis(50),
    ));
    let mut status = coordinator.subscribe();

    let handle = coordinator.spawn_polling();
    tokio::time::timeout(Duration::from_secs(5), status.changed())
        .await
        .expect("no update published")
        .unwrap();
    handle.abort();

    assert!(matches!(
        *status.borrow(),
        UpdateStatus::Updated { readings: 4, .. }
    ));

    let snapshot = coordinator.last_snapshot().await.unwrap();
    let names: Vec<_> = describe_snapshot(&snapshot)
        .into_iter()
        .map(|d| d.name)
        .collect();
    assert_eq!(names, vec!["Eingänge", "Durchfluss", "Temperaturen", "Vorlauf"]);
}
