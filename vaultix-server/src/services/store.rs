use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::{AccessRequest, FileRecord, User};

/// The entire persisted state, read and rewritten wholesale on every
/// mutation.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreDocument {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub files: Vec<FileRecord>,
    #[serde(default)]
    pub access_requests: Vec<AccessRequest>,
    /// Per-user settings objects, keyed by user id.
    #[serde(default)]
    pub settings: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed store document: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Flat-file JSON store.
///
/// All mutations funnel through [`FlatFileStore::update`], which holds the
/// write lock across the file rewrite. That makes each read-modify-write
/// sequence atomic with respect to concurrent requests.
pub struct FlatFileStore {
    path: PathBuf,
    doc: RwLock<StoreDocument>,
}

impl FlatFileStore {
    /// Load the document at `path`, creating an empty one (and its parent
    /// directories) if the file does not exist yet.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let doc = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if let Some(parent) = path.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                let doc = StoreDocument::default();
                tokio::fs::write(&path, serde_json::to_vec_pretty(&doc)?).await?;
                doc
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            doc: RwLock::new(doc),
        })
    }

    /// Run a closure against a read snapshot of the document.
    pub async fn read<T>(&self, f: impl FnOnce(&StoreDocument) -> T) -> T {
        let doc = self.doc.read().await;
        f(&doc)
    }

    /// Apply a mutation and rewrite the backing file. Nothing is persisted
    /// when the closure fails.
    pub async fn update<T, E>(
        &self,
        f: impl FnOnce(&mut StoreDocument) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let mut doc = self.doc.write().await;
        // Mutate a scratch copy so a failed closure leaves memory and disk
        // consistent.
        let mut scratch = doc.clone();
        let out = f(&mut scratch)?;
        let bytes = serde_json::to_vec_pretty(&scratch)
            .map_err(StoreError::from)
            .map_err(E::from)?;
        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(StoreError::from)
            .map_err(E::from)?;
        *doc = scratch;
        Ok(out)
    }

    /// Case-insensitive email lookup.
    pub async fn find_user_by_email(&self, email: &str) -> Option<User> {
        let needle = email.to_lowercase();
        self.read(|doc| {
            doc.users
                .iter()
                .find(|u| u.email.to_lowercase() == needle)
                .cloned()
        })
        .await
    }

    pub async fn find_user_by_id(&self, id: &str) -> Option<User> {
        self.read(|doc| doc.users.iter().find(|u| u.id == id).cloned())
            .await
    }

    pub async fn health_check(&self) -> Result<(), StoreError> {
        tokio::fs::metadata(&self.path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn sample_user(email: &str) -> User {
        User::new(
            "Sample".to_string(),
            email.to_string(),
            Role::DataOwner,
            None,
            "$argon2id$stub".to_string(),
        )
    }

    #[tokio::test]
    async fn open_creates_missing_file_and_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data/store.json");

        let store = FlatFileStore::open(&path).await.unwrap();
        assert!(path.exists());
        assert!(store.read(|doc| doc.users.is_empty()).await);
    }

    #[tokio::test]
    async fn mutations_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = FlatFileStore::open(&path).await.unwrap();
        let user = sample_user("owner@example.com");
        let id = user.id.clone();
        store
            .update(|doc| {
                doc.users.push(user);
                Ok::<_, StoreError>(())
            })
            .await
            .unwrap();
        drop(store);

        let reopened = FlatFileStore::open(&path).await.unwrap();
        let found = reopened.find_user_by_id(&id).await.unwrap();
        assert_eq!(found.email, "owner@example.com");
    }

    #[tokio::test]
    async fn email_lookup_ignores_case() {
        let dir = tempfile::tempdir().unwrap();
        let store = FlatFileStore::open(dir.path().join("store.json"))
            .await
            .unwrap();
        store
            .update(|doc| {
                doc.users.push(sample_user("Owner@Example.COM"));
                Ok::<_, StoreError>(())
            })
            .await
            .unwrap();

        assert!(store.find_user_by_email("owner@example.com").await.is_some());
        assert!(store.find_user_by_email("OWNER@EXAMPLE.COM").await.is_some());
        assert!(store.find_user_by_email("other@example.com").await.is_none());
    }

    #[tokio::test]
    async fn failed_update_persists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = FlatFileStore::open(&path).await.unwrap();

        let result: Result<(), StoreError> = store
            .update(|doc| {
                doc.users.push(sample_user("ghost@example.com"));
                Err(StoreError::Io(std::io::Error::other("boom")))
            })
            .await;
        assert!(result.is_err());
        assert!(store.find_user_by_email("ghost@example.com").await.is_none());

        let reopened = FlatFileStore::open(&path).await.unwrap();
        assert!(reopened.find_user_by_email("ghost@example.com").await.is_none());
    }
}
