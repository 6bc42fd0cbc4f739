use derive_builder::Builder;
use serde::Serialize;
use thiserror::Error;

use crate::inputs::ConfigInputs;

pub const DEFAULT_NETWORK_NAME: &str = "kindnet";
pub const DEFAULT_CNI_VERSION: &str = "0.3.1";
pub const DEFAULT_IPAM_DATA_DIR: &str = "/run/cni-ipam-state";

#[derive(Debug, Error)]
pub enum CniConfigError {
    #[error("Couldn't serialize the CNI configuration! {}", .0)]
    Serialization(serde_json::Error),
}

/// A ptp + host-local conflist with portmap chained on top.
#[derive(Debug, Clone, Builder)]
pub struct CniConfig {
    #[builder(default = "DEFAULT_NETWORK_NAME.to_owned()", setter(into))]
    pub name: String,
    #[builder(default = "DEFAULT_CNI_VERSION.to_owned()", setter(into))]
    pub cni_version: String,
    #[builder(default = "DEFAULT_IPAM_DATA_DIR.to_owned()", setter(into))]
    pub ipam_data_dir: String,
    pub inputs: ConfigInputs,
}

impl CniConfig {
    pub fn render(&self) -> Result<String, CniConfigError> {
        serde_json::to_string_pretty(&self.conflist()).map_err(CniConfigError::Serialization)
    }

    fn conflist(&self) -> Conflist<'_> {
        let ipam = HostLocalIpam {
            ipam_type: "host-local",
            data_dir: &self.ipam_data_dir,
            routes: self
                .inputs
                .ranges()
                .iter()
                .map(|range| Route {
                    dst: range.default_route(),
                })
                .collect(),
            ranges: self
                .inputs
                .ranges()
                .iter()
                .map(|range| {
                    vec![IpamRange {
                        subnet: range.block().to_string(),
                        range_start: range.range_start().map(|start| start.to_string()),
                    }]
                })
                .collect(),
        };

        Conflist {
            cni_version: &self.cni_version,
            name: &self.name,
            plugins: (
                PtpPlugin {
                    plugin_type: "ptp",
                    ip_masq: false,
                    ipam,
                    mtu: Some(self.inputs.mtu()).filter(|mtu| *mtu > 0),
                },
                PortmapPlugin {
                    plugin_type: "portmap",
                    capabilities: Capabilities {
                        port_mappings: true,
                    },
                },
            ),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Conflist<'a> {
    cni_version: &'a str,
    name: &'a str,
    plugins: (PtpPlugin<'a>, PortmapPlugin),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PtpPlugin<'a> {
    #[serde(rename = "type")]
    plugin_type: &'static str,
    ip_masq: bool,
    ipam: HostLocalIpam<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mtu: Option<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HostLocalIpam<'a> {
    #[serde(rename = "type")]
    ipam_type: &'static str,
    data_dir: &'a str,
    routes: Vec<Route>,
    ranges: Vec<Vec<IpamRange>>,
}

#[derive(Serialize)]
struct Route {
    dst: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IpamRange {
    subnet: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    range_start: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PortmapPlugin {
    #[serde(rename = "type")]
    plugin_type: &'static str,
    capabilities: Capabilities,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Capabilities {
    port_mappings: bool,
}
