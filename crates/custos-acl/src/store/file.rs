//! JSON-file policy store.
//!
//! Same partitioned model as [`MemoryPolicyStore`](super::MemoryPolicyStore),
//! but every save rewrites the whole file. The new snapshot is written to a
//! sibling temp file and renamed into place, and in-memory state only changes
//! after the rename succeeds, so a failed save has no effect.

use async_trait::async_trait;
use custos_core::{Error, ObjectKey, Result, SecurityIdentity};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use super::PolicyStore;
use crate::policy::{AccessPolicy, PolicyId};

/// On-disk layout.
#[derive(Debug, Default, Serialize, Deserialize)]
struct PolicyFile {
    #[serde(default)]
    last_id: i64,
    #[serde(default)]
    policies: Vec<AccessPolicy>,
}

#[derive(Debug, Default)]
struct State {
    last_id: i64,
    partitions: HashMap<SecurityIdentity, Vec<AccessPolicy>>,
}

impl State {
    fn from_file(file: PolicyFile) -> Result<Self> {
        let mut state = State {
            last_id: file.last_id,
            partitions: HashMap::new(),
        };
        for policy in file.policies {
            let id = policy.id.ok_or_else(|| {
                Error::invariant(format!(
                    "stored policy for {} on {} has no id",
                    policy.identity,
                    policy.object_key()
                ))
            })?;
            state.last_id = state.last_id.max(id.get());
            state
                .partitions
                .entry(policy.identity.clone())
                .or_default()
                .push(policy);
        }
        Ok(state)
    }

    fn snapshot(&self, pending: Option<&AccessPolicy>) -> PolicyFile {
        let mut policies: Vec<AccessPolicy> = self
            .partitions
            .values()
            .flatten()
            .chain(pending)
            .cloned()
            .collect();
        policies.sort_by_key(|p| p.id);
        PolicyFile {
            last_id: pending.and_then(|p| p.id).map_or(self.last_id, |id| id.get()),
            policies,
        }
    }
}

/// Identity-partitioned policy store persisted as pretty-printed JSON.
#[derive(Debug)]
pub struct FilePolicyStore {
    path: PathBuf,
    state: RwLock<State>,
}

impl FilePolicyStore {
    /// Opens the store at `path`, loading existing policies if the file
    /// exists. A missing file is an empty store; it is created on first save.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = match tokio::fs::read_to_string(&path).await {
            Ok(content) => State::from_file(serde_json::from_str(&content)?)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => State::default(),
            Err(e) => {
                return Err(Error::storage_with_source(
                    format!("failed to read policy file {}", path.display()),
                    e,
                ));
            }
        };

        tracing::debug!(
            path = %path.display(),
            partitions = state.partitions.len(),
            "Opened policy file"
        );

        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Total number of stored policies.
    pub async fn len(&self) -> usize {
        self.state
            .read()
            .await
            .partitions
            .values()
            .map(Vec::len)
            .sum()
    }

    /// Returns `true` if nothing has been saved.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn persist(&self, file: &PolicyFile) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                Error::storage_with_source(format!("failed to create {}", parent.display()), e)
            })?;
        }

        let json = serde_json::to_string_pretty(file)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await.map_err(|e| {
            Error::storage_with_source(format!("failed to write {}", tmp.display()), e)
        })?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            Error::storage_with_source(format!("failed to replace {}", self.path.display()), e)
        })?;
        Ok(())
    }
}

#[async_trait]
impl PolicyStore for FilePolicyStore {
    async fn get_for_object(
        &self,
        identity: &SecurityIdentity,
        object: &ObjectKey,
    ) -> Result<Vec<AccessPolicy>> {
        let state = self.state.read().await;
        Ok(state
            .partitions
            .get(identity)
            .map(|policies| {
                policies
                    .iter()
                    .filter(|p| p.applies_to(object))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn save(&self, policy: AccessPolicy) -> Result<PolicyId> {
        if let Some(id) = policy.id {
            return Err(Error::invalid_argument(format!(
                "policy {id} is already persisted"
            )));
        }

        let mut state = self.state.write().await;
        let id = PolicyId::new(state.last_id + 1);
        let policy = policy.with_id(id);

        self.persist(&state.snapshot(Some(&policy))).await?;

        state.last_id = id.get();
        state
            .partitions
            .entry(policy.identity.clone())
            .or_default()
            .push(policy);
        Ok(id)
    }

    fn name(&self) -> &str {
        "file"
    }
}
