/// Kubernetes client bootstrap
use std::path::Path;

use anyhow::{Context, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};

/// Build a Kubernetes client from an explicit kubeconfig file
///
/// The path is passed in rather than read from process-global state, so
/// each cluster's credentials stay scoped to its own orchestration pass.
pub async fn client_from_kubeconfig(path: &Path) -> Result<Client> {
    let kubeconfig = Kubeconfig::read_from(path)
        .with_context(|| format!("Failed to read kubeconfig file: {}", path.display()))?;

    let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .context("Failed to build client configuration from kubeconfig")?;

    Client::try_from(config).context("Failed to create Kubernetes client")
}
