//! JSON directory store using tokio::fs for async file operations.
//!
//! One pretty-printed `<id>.json` file per character. Writes go to a
//! temporary sibling first and are renamed into place.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use gamebook_domain::{Character, CharacterId, RawRecord};
use serde_json::Value;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::{hydrate_all, hydrate_stored, to_record, ENTITY};
use crate::infrastructure::ports::{CharacterRepo, RecordStore, RepoError, StoredRecord};

const EXTENSION: &str = "json";

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open (and create if needed) the record directory.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, RepoError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| RepoError::storage("open", format!("{}: {}", dir.display(), e)))?;
        tracing::debug!(dir = %dir.display(), "Opened character directory");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding `key`. Keys that could escape the directory are refused.
    fn path_for(&self, key: &str) -> Result<PathBuf, RepoError> {
        let unsafe_key = key.is_empty()
            || key.starts_with('.')
            || key.contains(['/', '\\', '\0'])
            || key.contains("..");
        if unsafe_key {
            return Err(RepoError::constraint(format!(
                "'{}' cannot be used as a record key",
                key
            )));
        }
        Ok(self.dir.join(format!("{}.{}", key, EXTENSION)))
    }

    async fn write_record(&self, key: &str, record: RawRecord) -> Result<(), RepoError> {
        let path = self.path_for(key)?;
        let body = serde_json::to_string_pretty(&Value::Object(record))
            .map_err(RepoError::serialization)?;
        let tmp = path.with_extension(format!("{}.tmp", EXTENSION));

        let mut file = fs::File::create(&tmp)
            .await
            .map_err(|e| RepoError::storage("write", e))?;
        file.write_all(body.as_bytes())
            .await
            .map_err(|e| RepoError::storage("write", e))?;
        file.flush().await.map_err(|e| RepoError::storage("write", e))?;
        drop(file);

        fs::rename(&tmp, &path)
            .await
            .map_err(|e| RepoError::storage("write", e))
    }

    /// Read the file for `key`; `None` if there is no such file.
    async fn read_record(&self, key: &str) -> Result<Option<RawRecord>, RepoError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path).await {
            Ok(body) => parse_object(&body)
                .map(Some)
                .map_err(|e| RepoError::serialization(format!("record '{}': {}", key, e))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(RepoError::storage("read", e)),
        }
    }

    /// Every `*.json` file in the directory, contents parsed or not.
    async fn scan(&self) -> Result<Vec<StoredRecord>, RepoError> {
        let mut entries = fs::read_dir(&self.dir)
            .await
            .map_err(|e| RepoError::storage("list", e))?;
        let mut records = Vec::new();

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| RepoError::storage("list", e))?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Some(key) = path.file_stem().and_then(|stem| stem.to_str()) else {
                tracing::warn!(path = %path.display(), "Skipping file with a non UTF-8 name");
                continue;
            };
            let contents = match fs::read_to_string(&path).await {
                Ok(body) => parse_object(&body),
                Err(e) => Err(e.to_string()),
            };
            records.push(StoredRecord {
                key: key.to_string(),
                contents,
            });
        }

        records.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(records)
    }
}

fn parse_object(body: &str) -> Result<RawRecord, String> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(record)) => Ok(record),
        Ok(_) => Err("not a JSON object".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

#[async_trait]
impl CharacterRepo for JsonFileStore {
    async fn save(&self, character: &Character) -> Result<(), RepoError> {
        self.write_record(character.id().as_str(), to_record(character)?)
            .await
    }

    async fn find_by_id(&self, id: &CharacterId) -> Result<Option<Character>, RepoError> {
        self.read_record(id.as_str())
            .await?
            .map(|raw| hydrate_stored(id, raw))
            .transpose()
    }

    async fn find_all(&self) -> Result<Vec<Character>, RepoError> {
        let readable = self
            .scan()
            .await?
            .into_iter()
            .filter_map(|stored| match stored.contents {
                Ok(raw) => Some((stored.key, raw)),
                Err(e) => {
                    tracing::warn!(key = %stored.key, error = %e, "Skipping unparseable record file");
                    None
                }
            });
        Ok(hydrate_all(readable))
    }

    async fn delete(&self, id: &CharacterId) -> Result<(), RepoError> {
        let path = self.path_for(id.as_str())?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(RepoError::not_found(ENTITY, id)),
            Err(e) => Err(RepoError::storage("delete", e)),
        }
    }

    async fn exists(&self, id: &CharacterId) -> Result<bool, RepoError> {
        let path = self.path_for(id.as_str())?;
        match fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(RepoError::storage("exists", e)),
        }
    }
}

#[async_trait]
impl RecordStore for JsonFileStore {
    async fn list_raw(&self) -> Result<Vec<StoredRecord>, RepoError> {
        self.scan().await
    }

    async fn put_raw(&self, key: &str, record: RawRecord) -> Result<(), RepoError> {
        self.write_record(key, record).await
    }
}
