use std::{pin::pin, time::Duration};

use anyhow::anyhow;
use futures::StreamExt;
use k8s_openapi::api::core::v1::Node;
use kindnet_cni_core::node::NodeRanges;
use kube::{
    runtime::{
        watcher::{watcher, Config},
        WatchStreamExt,
    },
    Api, Client, ResourceExt,
};
use log::{debug, error, info, warn};

use crate::{config::AgentConfig, writer::CniConfigWriter};

const WATCH_ERROR_BACKOFF_SECS: u64 = 5;

pub struct NodeSynchronizer {
    mtu: u32,
    writer: CniConfigWriter,
}

impl NodeSynchronizer {
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            mtu: config.mtu,
            writer: CniConfigWriter::new(
                config.cni_config_path.clone(),
                config.ipam_data_dir.clone(),
            ),
        }
    }

    pub async fn synchronize(&mut self, node: &Node) {
        let name = node.name_any();
        let (ranges, rejected) = NodeRanges::from_node(node).validated();

        for cidr in rejected {
            warn!("Node '{name}' has an invalid pod CIDR '{cidr}', it won't be configured!");
        }

        if ranges.pod_capacity.is_none() {
            debug!("Node '{name}' doesn't report its pod capacity, using the default one");
        }

        let inputs = ranges.compute_inputs(self.mtu);

        if inputs.is_empty() {
            info!("Node '{name}' has no pod CIDRs assigned yet, waiting...");
            return;
        }

        match self.writer.write(inputs).await {
            Ok(true) => info!(
                "CNI configuration for '{name}' written to {}!",
                self.writer.path().display()
            ),
            Ok(false) => (),
            Err(err) => error!("Couldn't write the CNI configuration for '{name}'! {err}"),
        }
    }
}

pub async fn start_node_watcher(
    client: &Client,
    node_name: &str,
    mut synchronizer: NodeSynchronizer,
) -> anyhow::Result<()> {
    info!("Watching node '{node_name}'...");

    let watcher_config = Config::default().fields(&format!("metadata.name={node_name}"));
    let mut nodes = pin!(watcher(Api::<Node>::all(client.clone()), watcher_config).applied_objects());

    while let Some(node) = nodes.next().await {
        match node {
            Ok(node) => synchronizer.synchronize(&node).await,
            Err(err) => {
                error!("Node watcher has failed! {err:?}");
                tokio::time::sleep(Duration::from_secs(WATCH_ERROR_BACKOFF_SECS)).await;
            }
        }
    }

    Err(anyhow!("Node watcher for '{node_name}' has stopped unexpectedly!"))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use k8s_openapi::api::core::v1::{Node, NodeSpec};
    use kube::core::ObjectMeta;

    use crate::config::AgentConfig;

    use super::NodeSynchronizer;

    fn config(path: PathBuf) -> AgentConfig {
        AgentConfig {
            node_name: "kind-worker".to_owned(),
            cni_config_path: path,
            mtu: 0,
            ipam_data_dir: None,
        }
    }

    fn node(pod_cidrs: Vec<&str>) -> Node {
        Node {
            metadata: ObjectMeta {
                name: Some("kind-worker".to_owned()),
                ..Default::default()
            },
            spec: Some(NodeSpec {
                pod_cidrs: Some(pod_cidrs.into_iter().map(str::to_owned).collect()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn skips_nodes_without_valid_pod_cidrs() {
        let dir = std::env::temp_dir().join(format!("kindnet-cni-node-{}-empty", std::process::id()));
        let path = dir.join("10-kindnet.conflist");
        let mut synchronizer = NodeSynchronizer::new(&config(path.clone()));

        synchronizer.synchronize(&node(vec!["garbage"])).await;

        assert!(tokio::fs::metadata(&path).await.is_err());
    }

    #[tokio::test]
    async fn writes_config_for_valid_pod_cidrs() {
        let dir = std::env::temp_dir().join(format!("kindnet-cni-node-{}-valid", std::process::id()));
        let path = dir.join("10-kindnet.conflist");
        let mut synchronizer = NodeSynchronizer::new(&config(path.clone()));

        synchronizer
            .synchronize(&node(vec!["10.244.1.0/24", "garbage", "fd00:10:244:1::/64"]))
            .await;

        let written = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(written.contains("\"subnet\": \"10.244.1.0/24\""));
        assert!(written.contains("\"subnet\": \"fd00:10:244:1::/64\""));
        assert!(!written.contains("garbage"));

        let _ = tokio::fs::remove_dir_all(dir).await;
    }
}
