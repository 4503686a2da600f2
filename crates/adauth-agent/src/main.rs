//! Daemon entry point for the AD authentication bridge.

use std::process;
use std::time::Duration;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use adauth_ad::{AdDirectoryService, AdRepository, DirectoryConfig, DistinguishedName};
use adauth_agent::AuthAgent;
use adauth_core::config::AppConfig;
use adauth_core::services::DirectoryCredentials;
use adauth_gateway::GatewayClient;

#[tokio::main]
async fn main() {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,adauth_agent=debug,adauth_ad=debug")),
        )
        .init();

    let config = AppConfig::from_env().unwrap_or_else(|err| {
        eprintln!("Configuration error: {err}");
        process::exit(1);
    });

    let base_dn = DistinguishedName::parse(&config.base_dn).unwrap_or_else(|err| {
        eprintln!("Configuration error: invalid AD_BASE_DN: {err}");
        process::exit(1);
    });

    let credentials =
        DirectoryCredentials::new(config.bind_username.clone(), config.bind_password.clone());
    let directory_config = DirectoryConfig::new(
        &config.directory_server,
        config.directory_port,
        &config.directory_domain,
        credentials,
        base_dn,
    )
    .unwrap_or_else(|err| {
        eprintln!("Configuration error: {err}");
        process::exit(1);
    });

    info!(
        server = %config.directory_server,
        port = config.directory_port,
        domain = %config.directory_domain,
        "connecting to directory"
    );

    let repository = AdRepository::connect(directory_config).await.unwrap_or_else(|err| {
        eprintln!("Directory connection error: {err}");
        process::exit(1);
    });
    let directory = AdDirectoryService::new(Box::new(repository));

    let gateway = GatewayClient::builder(&config.gateway_url)
        .and_then(|builder| builder.with_token(config.gateway_token.clone()).build())
        .unwrap_or_else(|err| {
            eprintln!("Gateway configuration error: {err}");
            process::exit(1);
        });

    info!(
        gateway = %config.gateway_url,
        poll_interval_secs = config.poll_interval_secs,
        "starting authentication loop"
    );

    let mut agent = AuthAgent::new(Box::new(directory), Box::new(gateway))
        .with_poll_interval(Duration::from_secs(config.poll_interval_secs));

    if let Err(err) = agent.run().await {
        error!("authentication loop terminated: {err}");
        if let Err(close_err) = agent.shutdown().await {
            error!("failed to close directory connection: {close_err}");
        }
        process::exit(1);
    }
}
