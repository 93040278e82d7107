//! Fail-closed enforcement around a guarded "load project" operation.

use custos_acl::{AccessGuard, Principal};
use custos_core::{Error, ObjectKey, Permission, Result, SecurityIdentity};

use crate::common::TestHarness;

struct Project {
    id: i64,
    owner: String,
}

/// Creating requires ROLE_USER; reading requires VIEWER or ownership.
struct ProjectsService {
    guard: AccessGuard,
    projects: Vec<Project>,
}

impl ProjectsService {
    fn add_project(&mut self, principal: &Principal) -> Result<i64> {
        self.guard.require_role(principal, "ROLE_USER")?;
        let id = self.projects.len() as i64 + 1;
        self.projects.push(Project {
            id,
            owner: principal.username.clone(),
        });
        Ok(id)
    }

    async fn get_by_id(&self, principal: &Principal, id: i64) -> Result<&Project> {
        let project = self
            .projects
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| Error::invalid_argument(format!("no project {id}")))?;
        self.guard
            .require_permission_or_owner(
                principal,
                &ObjectKey::new("Project", project.id),
                &[Permission::VIEWER],
                Some(project.owner.as_str()),
            )
            .await?;
        Ok(project)
    }
}

fn setup() -> (TestHarness, ProjectsService) {
    let harness = TestHarness::new();
    let projects = ProjectsService {
        guard: AccessGuard::new(harness.service.clone()),
        projects: Vec::new(),
    };
    (harness, projects)
}

fn employee(name: &str) -> Principal {
    Principal::new(name).with_role("ROLE_USER")
}

#[tokio::test]
async fn test_add_project_requires_role() {
    let (_, mut projects) = setup();
    projects.add_project(&employee("empl1")).unwrap();

    let err = projects.add_project(&Principal::new("empl2")).unwrap_err();
    assert!(matches!(err, Error::AccessDenied { .. }));
}

#[tokio::test]
async fn test_owner_can_read_own_project() {
    let (_, mut projects) = setup();
    let owner = employee("empl1");
    let id = projects.add_project(&owner).unwrap();
    assert_eq!(projects.get_by_id(&owner, id).await.unwrap().owner, "empl1");
}

#[tokio::test]
async fn test_other_user_denied_without_grant() {
    let (_, mut projects) = setup();
    let id = projects.add_project(&employee("empl1")).unwrap();

    let err = projects
        .get_by_id(&employee("empl2"), id)
        .await
        .err()
        .unwrap();
    assert!(matches!(err, Error::AccessDenied { .. }));
}

#[tokio::test]
async fn test_other_user_allowed_after_viewer_grant() {
    let (harness, mut projects) = setup();
    let id = projects.add_project(&employee("empl1")).unwrap();

    harness
        .service
        .insert_ace(
            &SecurityIdentity::user("empl2").unwrap(),
            &ObjectKey::new("Project", id),
            &Permission::VIEWER,
        )
        .await
        .unwrap();

    let project = projects.get_by_id(&employee("empl2"), id).await.unwrap();
    assert_eq!(project.id, id);
}

#[tokio::test]
async fn test_grant_on_other_project_does_not_leak() {
    let (harness, mut projects) = setup();
    let first = projects.add_project(&employee("empl1")).unwrap();
    let second = projects.add_project(&employee("empl1")).unwrap();

    harness
        .service
        .insert_ace(
            &SecurityIdentity::user("empl2").unwrap(),
            &ObjectKey::new("Project", first),
            &Permission::VIEWER,
        )
        .await
        .unwrap();

    assert!(projects.get_by_id(&employee("empl2"), first).await.is_ok());
    assert!(projects.get_by_id(&employee("empl2"), second).await.is_err());
}
