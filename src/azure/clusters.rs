/// Managed cluster directory and agent pool operations
use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tracing::{debug, info};

use super::client::{AzureArmClient, CONTAINER_SERVICE_API_VERSION};
use super::models::{
    AgentPool, AgentPoolProfile, AgentPoolProperties, CredentialResults, ManagedCluster,
    ManagedClusterPage,
};
use crate::scaleup::{ClusterDirectory, ScaleUpError};

/// Manager for managed Kubernetes clusters under one subscription
pub struct ClusterManager {
    client: AzureArmClient,
    subscription_id: String,
}

impl ClusterManager {
    /// Create a new cluster manager
    pub fn new(client: AzureArmClient, subscription_id: String) -> Self {
        Self {
            client,
            subscription_id,
        }
    }

    /// List all managed clusters visible under the subscription
    ///
    /// Follows nextLink pages until the listing is exhausted. The result is
    /// a snapshot at call time with no filtering applied.
    pub async fn list_clusters(&self) -> Result<Vec<ManagedCluster>> {
        let path = format!(
            "subscriptions/{}/providers/Microsoft.ContainerService/managedClusters",
            self.subscription_id
        );

        let mut page: ManagedClusterPage = self
            .client
            .get(&path, CONTAINER_SERVICE_API_VERSION)
            .await
            .context("Failed to list managed clusters")?;

        let mut clusters = page.value;
        while let Some(next) = page.next_link {
            debug!("Following cluster listing page: {}", next);
            page = self
                .client
                .get_url(&next)
                .await
                .context("Failed to fetch cluster listing page")?;
            clusters.append(&mut page.value);
        }

        debug!("Cluster listing returned {} clusters", clusters.len());

        Ok(clusters)
    }

    /// Fetch a cluster's admin kubeconfig bytes
    ///
    /// The credential payload arrives base64-encoded; the first entry is the
    /// cluster admin credential.
    pub async fn admin_kubeconfig(&self, cluster: &ManagedCluster) -> Result<Vec<u8>> {
        let path = format!("{}/listClusterAdminCredential", cluster.id);

        let results: CredentialResults = self
            .client
            .post(&path, CONTAINER_SERVICE_API_VERSION, &serde_json::json!({}))
            .await
            .with_context(|| {
                format!("Failed to fetch admin credentials of cluster {}", cluster.name)
            })?;

        let credential = results.kubeconfigs.first().with_context(|| {
            format!("Cluster {} returned no admin credentials", cluster.name)
        })?;

        BASE64
            .decode(&credential.value)
            .context("Failed to decode kubeconfig payload")
    }

    /// Submit an update setting the named pool's node count
    ///
    /// Completion only means the request was accepted by the control plane;
    /// provisioning of the new node happens asynchronously server-side.
    pub async fn scale_agent_pool(
        &self,
        cluster: &ManagedCluster,
        pool: &AgentPoolProfile,
        count: i32,
    ) -> Result<AgentPool> {
        info!(
            "Requesting scale of pool {} on cluster {} to {} nodes",
            pool.name, cluster.name, count
        );

        let path = format!("{}/agentPools/{}", cluster.id, pool.name);
        let request = AgentPool {
            id: None,
            name: None,
            properties: AgentPoolProperties {
                count,
                vm_size: pool.vm_size.clone(),
                mode: pool.mode.clone(),
                provisioning_state: None,
            },
        };

        let updated: AgentPool = self
            .client
            .put(&path, CONTAINER_SERVICE_API_VERSION, &request)
            .await
            .with_context(|| {
                format!(
                    "Failed to update agent pool {} of cluster {}",
                    pool.name, cluster.name
                )
            })?;

        if let Some(state) = &updated.properties.provisioning_state {
            info!(
                "Agent pool {} of cluster {} is now {}",
                pool.name, cluster.name, state
            );
        }

        Ok(updated)
    }
}

impl ClusterDirectory for ClusterManager {
    async fn list_clusters(&self) -> Result<Vec<ManagedCluster>, ScaleUpError> {
        ClusterManager::list_clusters(self)
            .await
            .map_err(ScaleUpError::Enumeration)
    }

    async fn admin_kubeconfig(&self, cluster: &ManagedCluster) -> Result<Vec<u8>, ScaleUpError> {
        ClusterManager::admin_kubeconfig(self, cluster)
            .await
            .map_err(ScaleUpError::CredentialMaterialization)
    }

    async fn scale_agent_pool(
        &self,
        cluster: &ManagedCluster,
        pool: &AgentPoolProfile,
        count: i32,
    ) -> Result<(), ScaleUpError> {
        ClusterManager::scale_agent_pool(self, cluster, pool, count)
            .await
            .map(drop)
            .map_err(|source| ScaleUpError::ScaleRequest {
                cluster: cluster.name.clone(),
                pool: pool.name.clone(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::azure::client::DEFAULT_MANAGEMENT_ENDPOINT;

    #[test]
    fn test_kubeconfig_payload_decoding() {
        // "apiVersion: v1" base64-encoded, as the credential endpoint returns it
        let decoded = BASE64.decode("YXBpVmVyc2lvbjogdjE=").expect("valid base64");
        assert_eq!(decoded, b"apiVersion: v1");
    }

    #[test]
    fn test_manager_creation() {
        let client =
            AzureArmClient::new("test-token", DEFAULT_MANAGEMENT_ENDPOINT).expect("client");
        let manager = ClusterManager::new(client, "sub-id".to_string());
        assert_eq!(manager.subscription_id, "sub-id");
    }
}
