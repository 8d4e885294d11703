/// Azure Resource Manager wire models for managed Kubernetes clusters
use serde::{Deserialize, Serialize};

/// Managed AKS cluster resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagedCluster {
    pub id: String,
    pub name: String,
    pub location: String,
    pub properties: ManagedClusterProperties,
}

/// Cluster properties as returned by the managedClusters listing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedClusterProperties {
    pub fqdn: Option<String>,
    pub kubernetes_version: Option<String>,
    pub provisioning_state: Option<String>,
    #[serde(default)]
    pub agent_pool_profiles: Vec<AgentPoolProfile>,
}

/// Agent pool entry embedded in a cluster's properties
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentPoolProfile {
    pub name: String,
    pub count: i32,
    pub vm_size: Option<String>,
    pub mode: Option<String>,
}

impl ManagedCluster {
    /// Resource group parsed from the ARM resource id
    pub fn resource_group(&self) -> Option<&str> {
        let mut segments = self.id.split('/');
        while let Some(segment) = segments.next() {
            if segment.eq_ignore_ascii_case("resourceGroups") {
                return segments.next();
            }
        }
        None
    }

    /// Look up an agent pool by name in the loaded profile snapshot
    pub fn agent_pool(&self, name: &str) -> Option<&AgentPoolProfile> {
        self.properties
            .agent_pool_profiles
            .iter()
            .find(|p| p.name == name)
    }
}

/// One page of the paginated cluster listing
#[derive(Debug, Serialize, Deserialize)]
pub struct ManagedClusterPage {
    pub value: Vec<ManagedCluster>,
    #[serde(rename = "nextLink")]
    pub next_link: Option<String>,
}

/// Result of the listClusterAdminCredential call
#[derive(Debug, Serialize, Deserialize)]
pub struct CredentialResults {
    pub kubeconfigs: Vec<CredentialResult>,
}

/// A single named credential; `value` holds base64-encoded kubeconfig bytes
#[derive(Debug, Serialize, Deserialize)]
pub struct CredentialResult {
    pub name: String,
    pub value: String,
}

/// Standalone agent pool resource used for scale updates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentPool {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub properties: AgentPoolProperties,
}

/// Agent pool properties for update requests and responses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentPoolProperties {
    pub count: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vm_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

/// Error envelope returned by the ARM API
#[derive(Debug, Serialize, Deserialize)]
pub struct CloudErrorResponse {
    pub error: CloudError,
}

/// ARM error details
#[derive(Debug, Serialize, Deserialize)]
pub struct CloudError {
    pub code: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_cluster() -> ManagedCluster {
        serde_json::from_value(serde_json::json!({
            "id": "/subscriptions/00000000-0000-0000-0000-000000000000/resourceGroups/rg-aks/providers/Microsoft.ContainerService/managedClusters/demo",
            "name": "demo",
            "location": "westeurope",
            "properties": {
                "fqdn": "demo-dns-12345678.hcp.westeurope.azmk8s.io",
                "kubernetesVersion": "1.29.2",
                "provisioningState": "Succeeded",
                "agentPoolProfiles": [
                    { "name": "nodepool1", "count": 3, "vmSize": "Standard_D2s_v3", "mode": "System" },
                    { "name": "nodepool2", "count": 1, "vmSize": "Standard_D4s_v3", "mode": "User" }
                ]
            }
        }))
        .expect("sample cluster should deserialize")
    }

    #[test]
    fn test_cluster_deserialization() {
        let cluster = sample_cluster();
        assert_eq!(cluster.name, "demo");
        assert_eq!(cluster.properties.agent_pool_profiles.len(), 2);
        assert_eq!(
            cluster.properties.kubernetes_version.as_deref(),
            Some("1.29.2")
        );
    }

    #[test]
    fn test_resource_group_parsing() {
        let cluster = sample_cluster();
        assert_eq!(cluster.resource_group(), Some("rg-aks"));
    }

    #[test]
    fn test_agent_pool_lookup() {
        let cluster = sample_cluster();
        let pool = cluster.agent_pool("nodepool2").expect("pool should exist");
        assert_eq!(pool.count, 1);
        assert_eq!(pool.vm_size.as_deref(), Some("Standard_D4s_v3"));
        assert!(cluster.agent_pool("nodepool3").is_none());
    }

    #[test]
    fn test_paged_listing_deserialization() {
        let page: ManagedClusterPage = serde_json::from_value(serde_json::json!({
            "value": [],
            "nextLink": "https://management.azure.com/subscriptions/xxx/providers/Microsoft.ContainerService/managedClusters?api-version=2024-05-01&$skipToken=abc"
        }))
        .expect("page should deserialize");
        assert!(page.value.is_empty());
        assert!(page.next_link.is_some());
    }

    #[test]
    fn test_credential_results_deserialization() {
        let results: CredentialResults = serde_json::from_value(serde_json::json!({
            "kubeconfigs": [
                { "name": "clusterAdmin", "value": "YXBpVmVyc2lvbjogdjE=" }
            ]
        }))
        .expect("credentials should deserialize");
        assert_eq!(results.kubeconfigs[0].name, "clusterAdmin");
    }
}
