use kube::Client;

use crate::config::AgentConfig;

use self::node::{start_node_watcher, NodeSynchronizer};

pub mod node;

pub async fn main_controller(client: Client, config: AgentConfig) -> anyhow::Result<()> {
    let synchronizer = NodeSynchronizer::new(&config);

    start_node_watcher(&client, &config.node_name, synchronizer).await
}
