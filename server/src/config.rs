use std::{
    env,
    net::{Ipv4Addr, SocketAddr},
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use anyhow::{bail, Result};
use common::file::{LoadFromTomlFile, SaveToTomlFile};
use getset::Getters;
use serde::{Deserialize, Serialize};
use simplelog::{error, info, warn};

use crate::{args::Args, storage::Storage};

const DEFAULT_BIND_PORT: u16 = 8080;
const DEFAULT_HEADER_READ_TIMEOUT: u64 = 5;

const LISTENER_VARIABLE: &str = "VBUMP_LISTENER";
const DATA_DIRECTORY_VARIABLE: &str = "VBUMP_DATA_DIRECTORY";

#[derive(Deserialize, Serialize, Getters, Debug, PartialEq)]
#[serde(default)]
pub struct Config {
    /* Network */
    #[getset(get = "pub")]
    listener: SocketAddr,
    header_read_timeout: u64,

    /* Versions */
    #[getset(get = "pub")]
    data_directory: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listener: SocketAddr::new(Ipv4Addr::UNSPECIFIED.into(), DEFAULT_BIND_PORT),
            header_read_timeout: DEFAULT_HEADER_READ_TIMEOUT,
            data_directory: Storage::data_directory(),
        }
    }
}

impl Config {
    /// Resolves the configuration in the order file, environment, command line.
    pub fn parse(args: &Args) -> Result<Self> {
        let path = args
            .config
            .clone()
            .unwrap_or_else(Storage::primary_config_file);

        let mut config = Self::load_or_create(&path)?;
        config.override_with(env_value(LISTENER_VARIABLE), env_value(DATA_DIRECTORY_VARIABLE));
        config.override_with(args.listen, args.data_directory.clone());
        Ok(config)
    }

    fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            info!("Loading configuration from {}", path.display());
            return Self::from_file(path);
        }

        let config = Self::default();
        if let Err(error) = config.save(path, true) {
            error!("Failed to save generated configuration to file: {}", &error);
        } else {
            info!("Created default configuration at {}", path.display());
        }
        Ok(config)
    }

    pub fn override_with(&mut self, listener: Option<SocketAddr>, data_directory: Option<PathBuf>) {
        if let Some(listener) = listener {
            self.listener = listener;
        }
        if let Some(data_directory) = data_directory {
            self.data_directory = data_directory;
        }
    }

    pub fn header_read_timeout(&self) -> Duration {
        Duration::from_secs(self.header_read_timeout)
    }

    /// The data directory is never created implicitly.
    pub fn check_data_directory(&self) -> Result<()> {
        if !self.data_directory.is_dir() {
            bail!(
                "Data directory {} does not exist. Create it or pass another one with --datadir",
                self.data_directory.display()
            );
        }
        Ok(())
    }
}

impl SaveToTomlFile for Config {}
impl LoadFromTomlFile for Config {}

fn env_value<T: FromStr>(name: &str) -> Option<T> {
    let value = env::var(name).ok()?;
    match value.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Failed to parse {} environment variable: {:?}", name, value);
            None
        }
    }
}
