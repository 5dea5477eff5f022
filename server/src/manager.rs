use std::io;

use getset::Getters;
use simplelog::{debug, info};

use crate::{
    error::{StorageOperation, VersionError},
    metrics::BumpCounter,
    storage::VersionStorage,
    version::{Element, Version},
};

/// Reads, sets and bumps the versions of projects kept in a [`VersionStorage`].
///
/// Bumps are an unsynchronized read followed by a write. Two concurrent bumps of the same
/// project may therefore lose one of the updates.
#[derive(Getters)]
pub struct VersionManager<S, C> {
    #[getset(get = "pub")]
    storage: S,
    #[getset(get = "pub")]
    counter: C,
}

impl<S: VersionStorage, C: BumpCounter> VersionManager<S, C> {
    pub fn new(storage: S, counter: C) -> Self {
        Self { storage, counter }
    }

    pub async fn bump(&self, project: &str, element: Element) -> Result<Version, VersionError> {
        let current = self.read_current(project).await?;
        let version = current.bump(element);

        self.storage
            .store_version(project, &version.to_string())
            .await?;
        self.counter.record_bump(project, element);

        info!(
            "Bumped {} version of project {} to {}",
            element, project, version
        );
        Ok(version)
    }

    pub async fn bump_major(&self, project: &str) -> Result<Version, VersionError> {
        self.bump(project, Element::Major).await
    }

    pub async fn bump_minor(&self, project: &str) -> Result<Version, VersionError> {
        self.bump(project, Element::Minor).await
    }

    pub async fn bump_patch(&self, project: &str) -> Result<Version, VersionError> {
        self.bump(project, Element::Patch).await
    }

    pub async fn set_version(&self, project: &str, text: &str) -> Result<Version, VersionError> {
        check_project(project)?;
        let version = parse_untrusted(text)?;

        self.storage
            .store_version(project, &version.to_string())
            .await?;

        info!("Set version of project {} explicitly to {}", project, version);
        Ok(version)
    }

    pub async fn get_version(&self, project: &str) -> Result<Version, VersionError> {
        let version = self.read_current(project).await?;
        debug!("Read version {:?} of project {}", version.to_string(), project);
        Ok(version)
    }

    /// Bumps a caller supplied version without touching any project.
    pub fn bump_transient(&self, text: &str, element: Element) -> Result<Version, VersionError> {
        let version = parse_untrusted(text)?.bump(element);
        info!("Bumped transient {} version {} to {}", element, text, version);
        Ok(version)
    }

    pub fn bump_transient_major(&self, text: &str) -> Result<Version, VersionError> {
        self.bump_transient(text, Element::Major)
    }

    pub fn bump_transient_minor(&self, text: &str) -> Result<Version, VersionError> {
        self.bump_transient(text, Element::Minor)
    }

    pub fn bump_transient_patch(&self, text: &str) -> Result<Version, VersionError> {
        self.bump_transient(text, Element::Patch)
    }

    async fn read_current(&self, project: &str) -> Result<Version, VersionError> {
        check_project(project)?;
        let text = self.storage.read_version(project).await?;

        // Stored text is trusted, so a parse failure means the store itself is damaged
        Version::parse(&text).map_err(|error| {
            VersionError::storage(
                StorageOperation::Read,
                project,
                io::Error::new(io::ErrorKind::InvalidData, error),
            )
        })
    }
}

fn parse_untrusted(text: &str) -> Result<Version, VersionError> {
    if !Version::validate(text) {
        return Err(VersionError::invalid_version(text));
    }
    Ok(Version::parse(text)?)
}

/// Project names become file names inside the data directory.
pub fn check_project(project: &str) -> Result<(), VersionError> {
    let valid = !project.is_empty()
        && !project.starts_with('.')
        && !project
            .chars()
            .any(|character| character == '/' || character == '\\' || character.is_control());

    if valid {
        Ok(())
    } else {
        Err(VersionError::invalid_project(project))
    }
}
