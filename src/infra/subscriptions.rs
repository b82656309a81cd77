//! Push subscriptions persisted as one pretty-printed JSON array.

use std::{
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::{sync::Mutex, task};
use tracing::warn;

use crate::application::repos::{RepoError, SubscriptionsRepo};
use crate::domain::subscriptions::Subscription;

/// Whole-file JSON store. Every mutation re-reads the file, applies the change and
/// replaces the file through a temporary sibling, so readers never see a partial
/// write. Mutations within this process are serialised; other processes writing
/// the same file race with last-writer-wins.
pub struct JsonSubscriptionStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonSubscriptionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn read(&self) -> Vec<Subscription> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Vec::new(),
            Err(err) => {
                warn!(
                    target = "weekly_trends::store",
                    path = %self.path.display(),
                    error = %err,
                    "failed to read subscriptions, treating as empty"
                );
                return Vec::new();
            }
        };

        match serde_json::from_slice(&raw) {
            Ok(subscriptions) => subscriptions,
            Err(err) => {
                warn!(
                    target = "weekly_trends::store",
                    path = %self.path.display(),
                    error = %err,
                    "subscriptions file is corrupt, treating as empty"
                );
                Vec::new()
            }
        }
    }

    async fn write(&self, subscriptions: &[Subscription]) -> Result<(), RepoError> {
        let mut encoded =
            serde_json::to_vec_pretty(subscriptions).map_err(RepoError::from_persistence)?;
        encoded.push(b'\n');
        let path = self.path.clone();

        task::spawn_blocking(move || replace_file(&path, &encoded))
            .await
            .map_err(RepoError::from_persistence)?
            .map_err(RepoError::from_persistence)
    }
}

fn replace_file(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut file = NamedTempFile::new_in(parent)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|err| err.error)?;
    Ok(())
}

#[async_trait]
impl SubscriptionsRepo for JsonSubscriptionStore {
    async fn list_subscriptions(&self) -> Vec<Subscription> {
        self.read().await
    }

    async fn add_subscription(&self, subscription: Subscription) -> Result<bool, RepoError> {
        let _guard = self.write_lock.lock().await;
        let mut subscriptions = self.read().await;

        if subscriptions
            .iter()
            .any(|existing| existing.endpoint == subscription.endpoint)
        {
            return Ok(false);
        }

        subscriptions.push(subscription);
        self.write(&subscriptions).await?;
        Ok(true)
    }

    async fn remove_subscription(&self, endpoint: &str) -> Result<bool, RepoError> {
        let _guard = self.write_lock.lock().await;
        let mut subscriptions = self.read().await;

        let before = subscriptions.len();
        subscriptions.retain(|existing| existing.endpoint != endpoint);
        if subscriptions.len() == before {
            return Ok(false);
        }

        self.write(&subscriptions).await?;
        Ok(true)
    }

    async fn remove_subscriptions(&self, endpoints: &[String]) -> Result<usize, RepoError> {
        if endpoints.is_empty() {
            return Ok(0);
        }

        let _guard = self.write_lock.lock().await;
        let mut subscriptions = self.read().await;

        let before = subscriptions.len();
        subscriptions.retain(|existing| !endpoints.contains(&existing.endpoint));
        let removed = before - subscriptions.len();
        if removed > 0 {
            self.write(&subscriptions).await?;
        }
        Ok(removed)
    }
}
