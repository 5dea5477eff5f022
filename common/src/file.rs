use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};

pub trait SaveToTomlFile: Serialize {
    fn save(&self, path: &Path, create_parent: bool) -> Result<()> {
        if create_parent {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create directory {}", parent.display())
                })?;
            }
        }
        fs::write(path, toml::to_string(self)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

pub trait LoadFromTomlFile: DeserializeOwned {
    fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let value = toml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::{LoadFromTomlFile, SaveToTomlFile};

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Sample {
        name: String,
        port: u16,
    }

    impl SaveToTomlFile for Sample {}
    impl LoadFromTomlFile for Sample {}

    #[test]
    fn save_creates_parent_and_loads_back() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("nested").join("sample.toml");
        let sample = Sample {
            name: "vbump".to_string(),
            port: 8080,
        };

        sample.save(&path, true).unwrap();

        assert_eq!(Sample::from_file(&path).unwrap(), sample);
    }

    #[test]
    fn save_without_parent_fails() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("missing").join("sample.toml");
        let sample = Sample {
            name: "vbump".to_string(),
            port: 8080,
        };

        assert!(sample.save(&path, false).is_err());
    }

    #[test]
    fn malformed_file_reports_path() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("broken.toml");
        std::fs::write(&path, "port = \"not a number\"").unwrap();

        let error = Sample::from_file(&path).unwrap_err();
        assert!(error.to_string().contains("broken.toml"));
    }
}
