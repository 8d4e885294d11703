/// One-shot agent pool scale-up orchestration
pub mod error;

pub use error::ScaleUpError;

use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::azure::models::{AgentPoolProfile, ManagedCluster};
use crate::credentials::KubeconfigFile;
use crate::k8s::nodes::{NodeQuery, NodeRecord};

/// Directory of managed clusters plus the agent pool update operation
///
/// The real implementation talks to the ARM management plane; tests supply
/// an in-memory fake.
pub trait ClusterDirectory {
    async fn list_clusters(&self) -> Result<Vec<ManagedCluster>, ScaleUpError>;

    async fn admin_kubeconfig(&self, cluster: &ManagedCluster) -> Result<Vec<u8>, ScaleUpError>;

    async fn scale_agent_pool(
        &self,
        cluster: &ManagedCluster,
        pool: &AgentPoolProfile,
        count: i32,
    ) -> Result<(), ScaleUpError>;
}

/// Node listing bootstrapped from a materialized kubeconfig file
pub trait NodeSource {
    async fn list_nodes(&self, kubeconfig: &Path) -> Result<Vec<NodeRecord>, ScaleUpError>;
}

/// Outcome of processing a single cluster
#[derive(Debug)]
pub enum ClusterOutcome {
    /// A scale request for exactly one additional node was accepted
    Scaled {
        cluster: String,
        pool: String,
        previous_count: i32,
        requested_count: i32,
    },
    /// The cluster holds no node matching the query
    NodeNotFound { cluster: String },
    /// The cluster failed and was skipped; the scan continued
    Skipped {
        cluster: String,
        error: ScaleUpError,
    },
}

/// Aggregated result of one scale-up run
#[derive(Debug)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub outcomes: Vec<ClusterOutcome>,
}

impl RunSummary {
    fn new() -> Self {
        Self {
            started_at: Utc::now(),
            outcomes: Vec::new(),
        }
    }

    /// Clusters where a scale request was accepted
    pub fn scaled(&self) -> impl Iterator<Item = &ClusterOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, ClusterOutcome::Scaled { .. }))
    }

    /// Clusters that failed and were skipped
    pub fn skipped(&self) -> impl Iterator<Item = &ClusterOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, ClusterOutcome::Skipped { .. }))
    }

    /// True when the run neither scaled nor skipped anything
    pub fn is_noop(&self) -> bool {
        self.scaled().count() == 0 && self.skipped().count() == 0
    }
}

/// Scan every cluster in the directory and scale up the pool owning the
/// node matched by `query`
///
/// Clusters are independent units of work: a failure inside one is logged,
/// recorded as a skip, and the scan moves on. Only a failure of the
/// top-level listing call aborts the run. An empty directory is a benign
/// no-op.
pub async fn run<D, N>(
    directory: &D,
    nodes: &N,
    query: &NodeQuery,
) -> Result<RunSummary, ScaleUpError>
where
    D: ClusterDirectory,
    N: NodeSource,
{
    let mut summary = RunSummary::new();

    let clusters = directory.list_clusters().await?;
    if clusters.is_empty() {
        info!("No managed clusters found; nothing to scale");
        return Ok(summary);
    }

    for cluster in &clusters {
        info!("Found managed cluster: {}", cluster.name);

        let outcome = match scale_cluster(directory, nodes, cluster, query).await {
            Ok(outcome) => outcome,
            Err(error) => {
                warn!("Skipping cluster {}: {}", cluster.name, error);
                let mut source = std::error::Error::source(&error);
                while let Some(cause) = source {
                    warn!("  caused by: {}", cause);
                    source = cause.source();
                }
                ClusterOutcome::Skipped {
                    cluster: cluster.name.clone(),
                    error,
                }
            }
        };
        summary.outcomes.push(outcome);
    }

    Ok(summary)
}

/// Process one cluster: materialize credentials, locate the node, resolve
/// its pool, and submit the update
async fn scale_cluster<D, N>(
    directory: &D,
    nodes: &N,
    cluster: &ManagedCluster,
    query: &NodeQuery,
) -> Result<ClusterOutcome, ScaleUpError>
where
    D: ClusterDirectory,
    N: NodeSource,
{
    if let Some(fqdn) = &cluster.properties.fqdn {
        info!("Cluster {} API server at: {}", cluster.name, fqdn);
    }

    let kubeconfig_bytes = directory.admin_kubeconfig(cluster).await?;
    let credential = KubeconfigFile::materialize(&cluster.name, &kubeconfig_bytes)
        .map_err(ScaleUpError::CredentialMaterialization)?;

    let node_list = nodes.list_nodes(credential.path()).await?;
    debug!("Cluster {} reports {} nodes", cluster.name, node_list.len());

    let Some(node) = query.find_unique(&node_list)? else {
        info!(
            "No node matching \"{}\" in cluster {}",
            query.expr(),
            cluster.name
        );
        return Ok(ClusterOutcome::NodeNotFound {
            cluster: cluster.name.clone(),
        });
    };

    info!("Matched node {} in cluster {}", node.name, cluster.name);

    let pool_name = node.agent_pool().ok_or_else(|| ScaleUpError::MissingLabel {
        node: node.name.clone(),
    })?;

    let pool = cluster
        .agent_pool(pool_name)
        .ok_or_else(|| ScaleUpError::PoolNotFound {
            cluster: cluster.name.clone(),
            pool: pool_name.to_string(),
        })?;

    let requested_count = pool.count + 1;
    directory
        .scale_agent_pool(cluster, pool, requested_count)
        .await?;

    info!(
        "Scale request accepted: pool {} of cluster {} from {} to {} nodes",
        pool.name, cluster.name, pool.count, requested_count
    );

    Ok(ClusterOutcome::Scaled {
        cluster: cluster.name.clone(),
        pool: pool.name.clone(),
        previous_count: pool.count,
        requested_count,
    })
}
