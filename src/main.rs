/// Aksup - AKS agent pool scaling
///
/// A Rust-based tool that scales up the agent pool owning a named node:
/// it enumerates the managed Kubernetes clusters under a subscription,
/// locates the node through each cluster's API server, and submits an
/// agent pool update adding one node.
mod azure;
mod config;
mod credentials;
mod k8s;
mod scaleup;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::azure::{AzureArmClient, ClusterManager};
use crate::config::AppConfig;
use crate::k8s::nodes::NodeQuery;
use crate::k8s::KubeNodeSource;
use crate::scaleup::{ClusterOutcome, ScaleUpError};

#[derive(Parser)]
#[command(name = "aksup")]
#[command(about = "Scale up AKS agent pools from a node name", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "aksup.yaml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scale up the agent pool owning the named node
    ScaleUp {
        /// Name of the node to locate across all clusters
        node_name: String,

        /// Treat the node name as an anchored regular expression
        #[arg(long)]
        pattern: bool,
    },

    /// List managed clusters under the subscription
    Clusters,

    /// Generate example configuration file
    Init,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("aksup={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Execute command
    let result = match cli.command {
        Commands::ScaleUp {
            ref node_name,
            pattern,
        } => scale_up(&cli, node_name, pattern).await,
        Commands::Clusters => list_clusters(&cli).await,
        Commands::Init => init_config(&cli).await,
    };

    if let Err(e) = result {
        error!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Build the cluster manager from configuration and a bearer token
fn cluster_manager(config: &AppConfig) -> Result<ClusterManager> {
    let token = config
        .get_arm_token()
        .map_err(ScaleUpError::Authentication)?;
    let client = AzureArmClient::new(&token, &config.azure.management_endpoint)?;
    Ok(ClusterManager::new(
        client,
        config.subscription_id.clone(),
    ))
}

/// Scale up the pool owning the named node
async fn scale_up(cli: &Cli, node_name: &str, pattern: bool) -> Result<()> {
    let config = AppConfig::from_file(&cli.config).context("Failed to load configuration")?;

    info!("Selected subscription: {}", config.subscription_id);

    let manager = cluster_manager(&config)?;

    let query = if pattern {
        NodeQuery::pattern(node_name)?
    } else {
        NodeQuery::exact(node_name)
    };

    let summary = scaleup::run(&manager, &KubeNodeSource, &query).await?;

    info!("");
    info!("Scale-up run summary:");
    for outcome in &summary.outcomes {
        match outcome {
            ClusterOutcome::Scaled {
                cluster,
                pool,
                previous_count,
                requested_count,
            } => info!(
                "  ✓ {}: pool {} scaling from {} to {} nodes",
                cluster, pool, previous_count, requested_count
            ),
            ClusterOutcome::NodeNotFound { cluster } => {
                info!("  - {}: no matching node", cluster)
            }
            ClusterOutcome::Skipped { cluster, error } => {
                warn!("  ! {}: skipped ({})", cluster, error)
            }
        }
    }
    if summary.is_noop() {
        info!("No agent pool was scaled");
    }
    info!(
        "Run finished in {}s",
        (Utc::now() - summary.started_at).num_seconds()
    );

    // Per-cluster failures were logged and recorded above; the run itself
    // reports success so one bad cluster does not fail the whole batch.
    Ok(())
}

/// List managed clusters with their pools
async fn list_clusters(cli: &Cli) -> Result<()> {
    let config = AppConfig::from_file(&cli.config).context("Failed to load configuration")?;

    info!("Selected subscription: {}", config.subscription_id);

    let manager = cluster_manager(&config)?;
    let clusters = manager.list_clusters().await?;

    if clusters.is_empty() {
        info!("No managed clusters found");
        return Ok(());
    }

    for cluster in &clusters {
        info!(
            "Found managed cluster: {} (resource group: {}, location: {}, version: {})",
            cluster.name,
            cluster.resource_group().unwrap_or("unknown"),
            cluster.location,
            cluster
                .properties
                .kubernetes_version
                .as_deref()
                .unwrap_or("unknown")
        );
        if let Some(fqdn) = &cluster.properties.fqdn {
            info!("  API server: {}", fqdn);
        }
        for pool in &cluster.properties.agent_pool_profiles {
            info!(
                "  Pool {}: {} nodes ({})",
                pool.name,
                pool.count,
                pool.vm_size.as_deref().unwrap_or("unknown size")
            );
        }
    }

    Ok(())
}

/// Initialize example configuration file
async fn init_config(cli: &Cli) -> Result<()> {
    if cli.config.exists() {
        anyhow::bail!(
            "Configuration file already exists: {}",
            cli.config.display()
        );
    }

    let example_config = AppConfig::example();
    let yaml = serde_yaml::to_string(&example_config)?;

    tokio::fs::write(&cli.config, yaml)
        .await
        .context("Failed to write configuration file")?;

    info!("Example configuration created: {}", cli.config.display());
    info!("");
    info!("Next steps:");
    info!("  1. Edit the configuration file and set your subscription id");
    info!("  2. Acquire an ARM bearer token:");
    info!("     export AZURE_ARM_TOKEN=$(az account get-access-token --query accessToken -o tsv)");
    info!("  3. Scale up the pool owning a node:");
    info!("     aksup scale-up aks-nodepool1-12345678-vmss000000");

    Ok(())
}
