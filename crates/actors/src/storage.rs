//! Local persistence for actor runs.
//!
//! Layout under the storage root:
//!
//! - `datasets/default/items.jsonl`: one JSON item per line, appended
//! - `key_value_stores/default/<KEY>.json`: pretty-printed JSON, overwritten

use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::ActorError;

/// Key under which every actor stores its full response.
pub const OUTPUT_KEY: &str = "OUTPUT";

const DATASET_DIR: &str = "datasets/default";
const DATASET_FILE: &str = "items.jsonl";
const KV_STORE_DIR: &str = "key_value_stores/default";

/// Dataset and key-value store for a single run.
#[derive(Debug, Clone)]
pub struct RunStorage {
    root: PathBuf,
}

impl RunStorage {
    /// Open (and create if needed) storage rooted at `root`.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, ActorError> {
        let root = root.into();
        fs::create_dir_all(root.join(DATASET_DIR)).await?;
        fs::create_dir_all(root.join(KV_STORE_DIR)).await?;
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn dataset_path(&self) -> PathBuf {
        self.root.join(DATASET_DIR).join(DATASET_FILE)
    }

    fn value_path(&self, key: &str) -> PathBuf {
        self.root.join(KV_STORE_DIR).join(format!("{key}.json"))
    }

    /// Append items to the dataset.
    pub async fn push_items(&self, items: &[Value]) -> Result<(), ActorError> {
        if items.is_empty() {
            return Ok(());
        }

        let mut buf = Vec::new();
        for item in items {
            serde_json::to_writer(&mut buf, item)?;
            buf.push(b'\n');
        }

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.dataset_path())
            .await?;
        file.write_all(&buf).await?;
        file.flush().await?;

        debug!(count = items.len(), "Pushed dataset items");
        Ok(())
    }

    /// Store `value` under `key`, replacing any previous value.
    pub async fn set_value(&self, key: &str, value: &Value) -> Result<(), ActorError> {
        let body = serde_json::to_vec_pretty(value)?;
        fs::write(self.value_path(key), body).await?;
        debug!(key, "Stored key-value record");
        Ok(())
    }

    /// Read back every dataset item.
    pub async fn dataset_items(&self) -> Result<Vec<Value>, ActorError> {
        let content = match fs::read_to_string(self.dataset_path()).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(ActorError::from))
            .collect()
    }

    /// Read a stored value, `None` if the key was never written.
    pub async fn get_value(&self, key: &str) -> Result<Option<Value>, ActorError> {
        match fs::read(self.value_path(key)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_push_items_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let storage = RunStorage::open(dir.path()).await.unwrap();

        storage.push_items(&[json!({ "a": 1 })]).await.unwrap();
        storage
            .push_items(&[json!({ "a": 2 }), json!({ "a": 3 })])
            .await
            .unwrap();

        let items = storage.dataset_items().await.unwrap();
        assert_eq!(items, vec![json!({ "a": 1 }), json!({ "a": 2 }), json!({ "a": 3 })]);
    }

    #[tokio::test]
    async fn test_empty_dataset_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = RunStorage::open(dir.path()).await.unwrap();

        storage.push_items(&[]).await.unwrap();
        assert!(storage.dataset_items().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_value_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let storage = RunStorage::open(dir.path()).await.unwrap();

        assert_eq!(storage.get_value(OUTPUT_KEY).await.unwrap(), None);

        storage.set_value(OUTPUT_KEY, &json!({ "v": 1 })).await.unwrap();
        storage.set_value(OUTPUT_KEY, &json!({ "v": 2 })).await.unwrap();

        assert_eq!(
            storage.get_value(OUTPUT_KEY).await.unwrap(),
            Some(json!({ "v": 2 }))
        );
    }
}
