//! The service over the JSON file store, across process restarts.

use custos_acl::{AclService, FilePolicyStore, create_policy_store};
use custos_core::{AclConfig, Error, Permission};
use std::sync::Arc;

use crate::common::{report_42, sid};

#[tokio::test]
async fn test_grants_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("policies.json");
    let alice = sid("USER:alice");

    {
        let service = AclService::new(Arc::new(FilePolicyStore::open(&path).await.unwrap()));
        service
            .insert_ace(&alice, &report_42(), &Permission::VIEWER)
            .await
            .unwrap();
    }

    let service = AclService::new(Arc::new(FilePolicyStore::open(&path).await.unwrap()));
    let acl = service
        .read_acl_by_id(&report_42(), std::slice::from_ref(&alice))
        .await
        .unwrap();
    assert!(service.is_granted(&[Permission::VIEWER], &[alice.clone()], &acl));

    let err = service
        .insert_ace(&alice, &report_42(), &Permission::VIEWER)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateGrant { .. }));
}

#[tokio::test]
async fn test_service_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let toml = format!(
        "fanout_timeout_ms = 1000\n[store]\nbackend = \"file\"\npath = \"{}\"\n",
        dir.path().join("acl.json").display()
    );
    let config = AclConfig::from_toml_str(&toml).unwrap();
    let store = create_policy_store(&config.store).await.unwrap();
    let service = AclService::with_config(store, &config);

    service
        .insert_ace(&sid("ROLE:staff"), &report_42(), &Permission::VIEWER)
        .await
        .unwrap();
    assert!(dir.path().join("acl.json").exists());
}
