/*
All the storage related functions are implemented here.
This makes it easier to change them in the future
*/

use std::{
    collections::HashMap,
    future::Future,
    io,
    path::{Path, PathBuf},
    process,
    sync::atomic::{AtomicU64, Ordering},
};

use simplelog::debug;
use tokio::{fs, sync::RwLock};

use crate::error::{StorageOperation, VersionError};

/* Logs */
const LOGS_DIRECTORY: &str = "logs";
const LATEST_LOG_FILE: &str = "latest.log";

/* Configs */
const CONFIG_DIRECTORY: &str = "configs";
const PRIMARY_CONFIG_FILE: &str = "config.toml";

/* Versions */
const DATA_DIRECTORY: &str = "data";
const TEMPORARY_SUFFIX: &str = ".tmp";

pub struct Storage;

impl Storage {
    /* Logs */
    pub fn latest_log_file() -> PathBuf {
        PathBuf::from(LOGS_DIRECTORY).join(LATEST_LOG_FILE)
    }

    /* Configs */
    pub fn configs_directory() -> PathBuf {
        PathBuf::from(CONFIG_DIRECTORY)
    }
    pub fn primary_config_file() -> PathBuf {
        Storage::configs_directory().join(PRIMARY_CONFIG_FILE)
    }

    /* Versions */
    pub fn data_directory() -> PathBuf {
        PathBuf::from(DATA_DIRECTORY)
    }
}

/// Raw access to the text persisted for each project.
///
/// Nothing stored yet is reported as an empty string, errors are reserved for actual I/O
/// failures.
pub trait VersionStorage: Send + Sync {
    fn read_version(
        &self,
        project: &str,
    ) -> impl Future<Output = Result<String, VersionError>> + Send;

    fn store_version(
        &self,
        project: &str,
        version: &str,
    ) -> impl Future<Output = Result<(), VersionError>> + Send;
}

/// Keeps one flat file per project inside a data directory that must already exist.
pub struct FileStorage {
    base: PathBuf,
    writes: AtomicU64,
}

impl FileStorage {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            writes: AtomicU64::new(0),
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    fn project_file(&self, project: &str) -> PathBuf {
        self.base.join(project)
    }

    /// Every write gets its own file so concurrent stores never share one.
    fn temporary_file(&self, project: &str) -> PathBuf {
        let write = self.writes.fetch_add(1, Ordering::Relaxed);
        self.base.join(format!(
            ".{project}.{}.{write}{TEMPORARY_SUFFIX}",
            process::id()
        ))
    }

    async fn ensure_base(&self) -> io::Result<()> {
        let metadata = fs::metadata(&self.base).await?;
        if metadata.is_dir() {
            Ok(())
        } else {
            Err(io::Error::other(format!(
                "{} is not a directory",
                self.base.display()
            )))
        }
    }
}

impl VersionStorage for FileStorage {
    async fn read_version(&self, project: &str) -> Result<String, VersionError> {
        let path = self.project_file(project);
        match fs::read_to_string(&path).await {
            Ok(data) => Ok(data.trim_end().to_string()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                self.ensure_base().await.map_err(|error| {
                    VersionError::storage(StorageOperation::Read, project, error)
                })?;
                debug!("No version stored for project {} yet", project);
                Ok(String::new())
            }
            Err(error) => Err(VersionError::storage(StorageOperation::Read, project, error)),
        }
    }

    async fn store_version(&self, project: &str, version: &str) -> Result<(), VersionError> {
        let temporary = self.temporary_file(project);
        let result = async {
            fs::write(&temporary, version).await?;
            fs::rename(&temporary, self.project_file(project)).await
        }
        .await;

        if let Err(error) = result {
            let _ = fs::remove_file(&temporary).await;
            return Err(VersionError::storage(StorageOperation::Store, project, error));
        }
        Ok(())
    }
}

/// Keeps versions in memory only. Useful for tests and for embedding the manager.
#[derive(Default)]
pub struct MemoryStorage {
    versions: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn with_version(project: &str, version: &str) -> Self {
        Self {
            versions: RwLock::new(HashMap::from([(project.to_string(), version.to_string())])),
        }
    }

    pub async fn stored(&self, project: &str) -> Option<String> {
        self.versions.read().await.get(project).cloned()
    }
}

impl VersionStorage for MemoryStorage {
    async fn read_version(&self, project: &str) -> Result<String, VersionError> {
        Ok(self.stored(project).await.unwrap_or_default())
    }

    async fn store_version(&self, project: &str, version: &str) -> Result<(), VersionError> {
        self.versions
            .write()
            .await
            .insert(project.to_string(), version.to_string());
        Ok(())
    }
}
