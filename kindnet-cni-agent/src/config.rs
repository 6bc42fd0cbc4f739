use std::{env::var, env::VarError, num::ParseIntError, path::PathBuf};

use thiserror::Error;

pub const NODE_NAME_ENV: &str = "NODE_NAME";
pub const CNI_CONFIG_PATH_ENV: &str = "CNI_CONFIG_PATH";
pub const CNI_MTU_ENV: &str = "CNI_MTU";
pub const CNI_IPAM_DATA_DIR_ENV: &str = "CNI_IPAM_DATA_DIR";

pub const DEFAULT_CNI_CONFIG_PATH: &str = "/etc/cni/net.d/10-kindnet.conflist";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    pub node_name: String,
    pub cni_config_path: PathBuf,
    /// 0 leaves the MTU up to the plugin
    pub mtu: u32,
    pub ipam_data_dir: Option<String>,
}

#[derive(Debug, Error)]
pub enum FromEnvError {
    #[error("Env var {} unavailable: {}", .0, .1)]
    VarUnset(&'static str, VarError),
    #[error("Env var {} is not a valid number: {}", .0, .1)]
    InvalidNumber(&'static str, ParseIntError),
}

impl AgentConfig {
    pub fn from_env() -> Result<Self, FromEnvError> {
        Self::from_source(|key| var(key))
    }

    pub fn from_source<F>(source: F) -> Result<Self, FromEnvError>
    where
        F: Fn(&'static str) -> Result<String, VarError>,
    {
        Ok(Self {
            node_name: source(NODE_NAME_ENV)
                .map_err(|err| FromEnvError::VarUnset(NODE_NAME_ENV, err))?,
            cni_config_path: source(CNI_CONFIG_PATH_ENV)
                .unwrap_or_else(|_| DEFAULT_CNI_CONFIG_PATH.to_owned())
                .into(),
            mtu: match source(CNI_MTU_ENV) {
                Ok(mtu) => mtu
                    .trim()
                    .parse()
                    .map_err(|err| FromEnvError::InvalidNumber(CNI_MTU_ENV, err))?,
                Err(_) => 0,
            },
            ipam_data_dir: source(CNI_IPAM_DATA_DIR_ENV).ok(),
        })
    }
}
