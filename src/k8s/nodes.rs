/// Kubernetes node listing and matching
use std::collections::BTreeMap;
use std::path::Path;

use k8s_openapi::api::core::v1::Node;
use kube::api::ListParams;
use kube::Api;
use regex::Regex;
use tracing::debug;

use crate::scaleup::{NodeSource, ScaleUpError};

/// Label carrying the owning agent pool name on managed cluster nodes
pub const AGENT_POOL_LABEL: &str = "agentpool";

/// Snapshot of a cluster node as returned by a live query
#[derive(Debug, Clone)]
pub struct NodeRecord {
    pub name: String,
    pub labels: BTreeMap<String, String>,
}

impl NodeRecord {
    /// Owning agent pool read from the node's labels
    pub fn agent_pool(&self) -> Option<&str> {
        self.labels.get(AGENT_POOL_LABEL).map(String::as_str)
    }
}

/// Node name matcher: exact comparison by default, anchored pattern on request
#[derive(Debug, Clone)]
pub enum NodeQuery {
    Exact(String),
    Pattern(Regex),
}

impl NodeQuery {
    /// Match a node by its exact name
    pub fn exact(name: impl Into<String>) -> Self {
        Self::Exact(name.into())
    }

    /// Compile a pattern query; the expression must match the whole node name
    pub fn pattern(expr: &str) -> Result<Self, ScaleUpError> {
        let regex =
            Regex::new(&format!("^(?:{})$", expr)).map_err(|source| ScaleUpError::InvalidPattern {
                expr: expr.to_string(),
                source,
            })?;
        Ok(Self::Pattern(regex))
    }

    /// The original expression, for diagnostics
    pub fn expr(&self) -> &str {
        match self {
            NodeQuery::Exact(name) => name,
            NodeQuery::Pattern(regex) => regex.as_str(),
        }
    }

    fn matches(&self, name: &str) -> bool {
        match self {
            NodeQuery::Exact(expected) => name == expected,
            NodeQuery::Pattern(regex) => regex.is_match(name),
        }
    }

    /// Find the single node matching this query, or `None`
    ///
    /// More than one match is an error: listing order is not stable, so
    /// acting on the first hit would scale an arbitrary pool.
    pub fn find_unique<'a>(
        &self,
        nodes: &'a [NodeRecord],
    ) -> Result<Option<&'a NodeRecord>, ScaleUpError> {
        let mut candidates = nodes.iter().filter(|n| self.matches(&n.name));

        let Some(first) = candidates.next() else {
            return Ok(None);
        };

        let rest: Vec<String> = candidates.map(|n| n.name.clone()).collect();
        if !rest.is_empty() {
            let mut matches = vec![first.name.clone()];
            matches.extend(rest);
            return Err(ScaleUpError::AmbiguousNode {
                expr: self.expr().to_string(),
                matches,
            });
        }

        Ok(Some(first))
    }
}

/// Node listing backed by a live API server connection
pub struct KubeNodeSource;

impl NodeSource for KubeNodeSource {
    async fn list_nodes(&self, kubeconfig: &Path) -> Result<Vec<NodeRecord>, ScaleUpError> {
        let client = super::client::client_from_kubeconfig(kubeconfig)
            .await
            .map_err(ScaleUpError::ClusterConnection)?;

        let api: Api<Node> = Api::all(client);
        let nodes = api
            .list(&ListParams::default())
            .await
            .map_err(|e| ScaleUpError::ClusterConnection(e.into()))?;

        debug!("Node list query returned {} items", nodes.items.len());

        let records = nodes
            .items
            .into_iter()
            .filter_map(|node| {
                let name = node.metadata.name?;
                Some(NodeRecord {
                    name,
                    labels: node.metadata.labels.unwrap_or_default(),
                })
            })
            .collect();

        Ok(records)
    }
}
