/// Failure kinds for a scale-up run
use thiserror::Error;

/// Errors raised while scaling the agent pool owning a node
///
/// Only `Authentication` and `Enumeration` abort a run; every other kind is
/// fatal for a single cluster and recorded in the run summary.
#[derive(Debug, Error)]
pub enum ScaleUpError {
    /// Bearer token acquisition failed; nothing was attempted
    #[error("authentication failed")]
    Authentication(#[source] anyhow::Error),

    /// The top-level cluster listing call failed
    #[error("failed to enumerate managed clusters")]
    Enumeration(#[source] anyhow::Error),

    /// Admin kubeconfig could not be fetched or written to a transient file
    #[error("failed to materialize cluster credentials")]
    CredentialMaterialization(#[source] anyhow::Error),

    /// The cluster API server was unreachable or rejected the credentials
    #[error("failed to reach the cluster API server")]
    ClusterConnection(#[source] anyhow::Error),

    /// The matched node carries no agent pool label
    #[error("node {node} has no \"agentpool\" label")]
    MissingLabel { node: String },

    /// The labeled pool is absent from the cluster's loaded pool collection
    #[error("cluster {cluster} has no agent pool named {pool}")]
    PoolNotFound { cluster: String, pool: String },

    /// A pattern query matched more than one node
    #[error("node name \"{expr}\" matches multiple nodes: {matches:?}")]
    AmbiguousNode { expr: String, matches: Vec<String> },

    /// The node name pattern did not compile
    #[error("invalid node name pattern \"{expr}\"")]
    InvalidPattern {
        expr: String,
        #[source]
        source: regex::Error,
    },

    /// The cloud control plane rejected the scale update
    #[error("scale request for pool {pool} of cluster {cluster} failed")]
    ScaleRequest {
        cluster: String,
        pool: String,
        #[source]
        source: anyhow::Error,
    },
}
