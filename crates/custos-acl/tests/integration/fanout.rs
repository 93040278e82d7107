//! Fan-out/gather across identities: completeness, failure, and deadlines.

use custos_acl::{AclService, PolicyStore};
use custos_core::{Error, ObjectKey, Permission};
use std::sync::Arc;
use std::time::Duration;

use crate::common::{FailingStore, SlowStore, TestHarness, report_42, sid};

#[tokio::test]
async fn test_fan_out_gathers_every_identity() {
    let harness = TestHarness::new();
    let alice = sid("USER:alice");
    let staff = sid("ROLE:staff");

    harness
        .service
        .insert_ace(&alice, &report_42(), &Permission::VIEWER)
        .await
        .unwrap();
    harness
        .service
        .insert_ace(&staff, &report_42(), &Permission::VIEWER)
        .await
        .unwrap();

    let acl = harness
        .service
        .read_acl_by_id(&report_42(), &[alice.clone(), staff.clone()])
        .await
        .unwrap();

    assert_eq!(acl.len(), 2);
    assert!(acl.contains(Permission::VIEWER.mask, &alice));
    assert!(acl.contains(Permission::VIEWER.mask, &staff));
}

#[tokio::test]
async fn test_fan_out_keeps_identity_order() {
    let harness = TestHarness::new();
    for who in ["USER:c", "USER:a", "USER:b"] {
        harness
            .service
            .insert_ace(&sid(who), &report_42(), &Permission::VIEWER)
            .await
            .unwrap();
    }

    let acl = harness
        .service
        .read_acl_by_id(&report_42(), &[sid("USER:b"), sid("USER:c"), sid("USER:a")])
        .await
        .unwrap();
    let order: Vec<String> = acl
        .entries()
        .iter()
        .map(|e| e.identity().to_string())
        .collect();
    assert_eq!(order, vec!["USER:b", "USER:c", "USER:a"]);
}

#[tokio::test]
async fn test_identities_without_grants_contribute_nothing() {
    let harness = TestHarness::new();
    let alice = sid("USER:alice");
    harness
        .service
        .insert_ace(&alice, &report_42(), &Permission::VIEWER)
        .await
        .unwrap();

    let acl = harness
        .service
        .read_acl_by_id(
            &report_42(),
            &[sid("USER:nobody"), alice.clone(), sid("ROLE:ghosts")],
        )
        .await
        .unwrap();
    assert_eq!(acl.len(), 1);
}

#[tokio::test]
async fn test_one_failing_partition_fails_the_read() {
    let broken = sid("ROLE:staff");
    let store = Arc::new(FailingStore {
        inner: Default::default(),
        broken: broken.clone(),
    });
    let service = AclService::new(store.clone());
    let alice = sid("USER:alice");

    service
        .insert_ace(&alice, &report_42(), &Permission::VIEWER)
        .await
        .unwrap();

    let err = service
        .read_acl_by_id(&report_42(), &[alice, broken])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Storage { .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_failing_partition_fails_the_grant() {
    let broken = sid("USER:mallory");
    let store = Arc::new(FailingStore {
        inner: Default::default(),
        broken: broken.clone(),
    });
    let service = AclService::new(store.clone());

    let err = service
        .insert_ace(&broken, &report_42(), &Permission::VIEWER)
        .await
        .unwrap_err();
    assert!(err.is_retryable());
    assert!(store.inner.is_empty().await);
}

#[tokio::test]
async fn test_timeout_cancels_in_flight_lookups() {
    let slow = sid("ROLE:archive");
    let store = Arc::new(SlowStore::new(slow.clone(), Duration::from_millis(300)));
    let service =
        AclService::new(store.clone()).with_fanout_timeout(Some(Duration::from_millis(20)));
    let alice = sid("USER:alice");

    service
        .insert_ace(&alice, &report_42(), &Permission::VIEWER)
        .await
        .unwrap();

    let err = service
        .read_acl_by_id(&report_42(), &[alice, slow])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Timeout { millis: 20 }));

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(store.finished(), 0, "slow lookup should have been dropped");
}

#[tokio::test]
async fn test_no_deadline_waits_for_slow_partition() {
    let slow = sid("ROLE:archive");
    let store = Arc::new(SlowStore::new(slow.clone(), Duration::from_millis(30)));
    let service = AclService::new(store.clone()).with_fanout_timeout(None);

    service
        .insert_ace(&slow, &report_42(), &Permission::VIEWER)
        .await
        .unwrap();
    let acl = service
        .read_acl_by_id(&report_42(), std::slice::from_ref(&slow))
        .await
        .unwrap();
    assert_eq!(acl.len(), 1);
    assert!(store.finished() >= 1);
}

#[tokio::test]
async fn test_store_level_fan_out_empty_set() {
    let harness = TestHarness::new();
    harness
        .service
        .insert_ace(&sid("USER:alice"), &report_42(), &Permission::VIEWER)
        .await
        .unwrap();
    let policies = harness
        .store
        .get_for_identities(&[], &report_42())
        .await
        .unwrap();
    assert!(policies.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_grants_to_distinct_identities() {
    let harness = TestHarness::new();
    let object = ObjectKey::new("Report", 7);

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let service = harness.service.clone();
            let object = object.clone();
            tokio::spawn(async move {
                service
                    .insert_ace(&sid(&format!("USER:u{i}")), &object, &Permission::VIEWER)
                    .await
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let everyone: Vec<_> = (0..16).map(|i| sid(&format!("USER:u{i}"))).collect();
    let acl = harness
        .service
        .read_acl_by_id(&object, &everyone)
        .await
        .unwrap();
    assert_eq!(acl.len(), 16);
}
