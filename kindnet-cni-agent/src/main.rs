use std::process::exit;

use kube::Client;

use crate::{config::AgentConfig, controller::main_controller};

mod config;
mod controller;
mod error;
mod writer;

#[tokio::main()]
async fn main() -> anyhow::Result<()> {
    configure_logger();

    let config = get_agent_config();
    let client = create_client().await;

    main_controller(client, config).await
}

async fn create_client() -> Client {
    match Client::try_default().await {
        Ok(client) => client,
        Err(error) => {
            log::error!("Couldn't create client! {error:?}");
            exit(6)
        }
    }
}

fn get_agent_config() -> AgentConfig {
    match AgentConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            log::error!("Couldn't read the agent configuration! {error}");
            exit(7)
        }
    }
}

fn configure_logger() {
    env_logger::builder()
        .default_format()
        .format_module_path(false)
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init()
}
