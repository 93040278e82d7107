//! Grant and read paths over the memory store.

use custos_core::{Error, ObjectKey, Permission};

use crate::common::{TestHarness, report_42, sid};

#[tokio::test]
async fn test_report_scenario() {
    let harness = TestHarness::new();
    let service = &harness.service;
    let alice = sid("USER:alice");
    let bob = sid("USER:bob");

    let id = service
        .insert_ace(&alice, &report_42(), &Permission::VIEWER)
        .await
        .expect("first grant succeeds");
    assert_eq!(id.get(), 1);

    let err = service
        .insert_ace(&alice, &report_42(), &Permission::VIEWER)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateGrant { .. }));

    let acl = service
        .read_acl_by_id(&report_42(), std::slice::from_ref(&alice))
        .await
        .expect("alice has an ACL");
    assert_eq!(acl.len(), 1);
    assert_eq!(acl.entries()[0].identity(), &alice);
    assert_eq!(acl.entries()[0].permission(), Permission::VIEWER);

    assert!(service.is_granted(&[Permission::VIEWER], std::slice::from_ref(&alice), &acl));
    assert!(!service.is_granted(&[Permission::VIEWER], std::slice::from_ref(&bob), &acl));

    let err = service.read_acl_by_id(&report_42(), &[bob]).await.unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}

#[tokio::test]
async fn test_read_after_grant_is_consistent() {
    let harness = TestHarness::new();
    for i in 0..20 {
        let who = sid(&format!("USER:u{i}"));
        let object = ObjectKey::new("Report", i);
        harness
            .service
            .insert_ace(&who, &object, &Permission::VIEWER)
            .await
            .unwrap();

        let acl = harness
            .service
            .read_acl_by_id(&object, std::slice::from_ref(&who))
            .await
            .unwrap();
        assert!(acl.contains(Permission::VIEWER.mask, &who));
    }
}

#[tokio::test]
async fn test_duplicate_grant_persists_once() {
    let harness = TestHarness::new();
    let alice = sid("USER:alice");

    harness
        .service
        .insert_ace(&alice, &report_42(), &Permission::VIEWER)
        .await
        .unwrap();
    for _ in 0..3 {
        assert!(
            harness
                .service
                .insert_ace(&alice, &report_42(), &Permission::VIEWER)
                .await
                .is_err()
        );
    }

    assert_eq!(harness.store.partition(&alice).await.len(), 1);
}

#[tokio::test]
async fn test_user_and_role_grants_are_distinct() {
    let harness = TestHarness::new();
    harness
        .service
        .insert_ace(&sid("USER:admin"), &report_42(), &Permission::VIEWER)
        .await
        .unwrap();
    harness
        .service
        .insert_ace(&sid("ROLE:admin"), &report_42(), &Permission::VIEWER)
        .await
        .expect("role grant is not a duplicate of the user grant");
    assert_eq!(harness.store.len().await, 2);
}

#[tokio::test]
async fn test_objects_are_isolated() {
    let harness = TestHarness::new();
    let alice = sid("USER:alice");
    let first = ObjectKey::new("Report", 1);
    let second = ObjectKey::new("Report", 2);
    let other_type = ObjectKey::new("Project", 1);

    harness
        .service
        .insert_ace(&alice, &first, &Permission::VIEWER)
        .await
        .unwrap();
    harness
        .service
        .insert_ace(&sid("USER:bob"), &second, &Permission::VIEWER)
        .await
        .unwrap();

    let acl = harness
        .service
        .read_acl_by_id(&second, &[alice.clone(), sid("USER:bob")])
        .await
        .unwrap();
    assert_eq!(acl.object(), &second);
    assert!(acl.entries().iter().all(|e| e.identity() != &alice));

    let err = harness
        .service
        .read_acl_by_id(&other_type, std::slice::from_ref(&alice))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}

#[tokio::test]
async fn test_empty_identity_set_is_not_found() {
    let harness = TestHarness::new();
    let err = harness
        .service
        .read_acl_by_id(&report_42(), &[])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_batch_read_aborts_on_missing_object() {
    let harness = TestHarness::new();
    let alice = sid("USER:alice");
    let granted = ObjectKey::new("Report", 1);
    harness
        .service
        .insert_ace(&alice, &granted, &Permission::VIEWER)
        .await
        .unwrap();

    let ok = harness
        .service
        .read_acls_by_id(std::slice::from_ref(&granted), std::slice::from_ref(&alice))
        .await
        .unwrap();
    assert_eq!(ok.len(), 1);

    let err = harness
        .service
        .read_acls_by_id(&[granted, ObjectKey::new("Report", 99)], &[alice])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}
