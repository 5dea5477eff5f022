use std::io;

use hyper::StatusCode;
use thiserror::Error;

use crate::version::ParseVersionError;

#[derive(Debug, Error)]
pub enum VersionError {
    #[error(transparent)]
    Parse(#[from] ParseVersionError),
    #[error("{0}")]
    Validation(String),
    #[error("Failed to {operation} version of project {project}")]
    Storage {
        operation: StorageOperation,
        project: String,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageOperation {
    Read,
    Store,
}

impl std::fmt::Display for StorageOperation {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageOperation::Read => write!(formatter, "read"),
            StorageOperation::Store => write!(formatter, "store"),
        }
    }
}

impl VersionError {
    pub fn invalid_version(text: &str) -> Self {
        Self::Validation(format!("{text} is not a valid version"))
    }

    pub fn invalid_project(project: &str) -> Self {
        Self::Validation(format!("{project:?} is not a valid project name"))
    }

    pub fn storage(operation: StorageOperation, project: &str, source: io::Error) -> Self {
        Self::Storage {
            operation,
            project: project.to_string(),
            source,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            VersionError::Parse(_) | VersionError::Validation(_) => StatusCode::BAD_REQUEST,
            VersionError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Server side failures are logged but never echoed to the client.
    pub fn is_server_error(&self) -> bool {
        self.status().is_server_error()
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use hyper::StatusCode;

    use crate::version::Version;

    use super::{StorageOperation, VersionError};

    #[test]
    fn client_errors_map_to_bad_request() {
        let parse = VersionError::from(Version::parse("a.b").unwrap_err());
        assert_eq!(parse.status(), StatusCode::BAD_REQUEST);

        let validation = VersionError::invalid_version("3.1.2.");
        assert_eq!(validation.status(), StatusCode::BAD_REQUEST);
        assert_eq!(validation.to_string(), "3.1.2. is not a valid version");
    }

    #[test]
    fn storage_errors_carry_context() {
        let error = VersionError::storage(
            StorageOperation::Read,
            "p1",
            io::Error::new(io::ErrorKind::NotFound, "no such directory"),
        );

        assert!(error.is_server_error());
        assert_eq!(error.to_string(), "Failed to read version of project p1");
        assert_eq!(
            std::error::Error::source(&error).map(ToString::to_string),
            Some("no such directory".to_string())
        );
    }
}
