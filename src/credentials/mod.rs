/// Transient kubeconfig materialization
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tempfile::NamedTempFile;
use tracing::debug;

/// A cluster's admin kubeconfig written to a uniquely named temporary file
///
/// The Kubernetes client bootstraps from a file path, so the credential blob
/// has to touch disk for the duration of one cluster's processing. The file
/// is removed when the value is dropped; removal is best-effort and does not
/// survive a hard kill.
pub struct KubeconfigFile {
    file: NamedTempFile,
}

impl KubeconfigFile {
    /// Write kubeconfig bytes to a transient file readable at `path()`
    ///
    /// The blob is decoded as UTF-8 text before writing; invalid sequences
    /// are replaced. Round-tripping is therefore lossy for non-UTF-8 input.
    pub fn materialize(cluster_name: &str, content: &[u8]) -> Result<Self> {
        if content.is_empty() {
            anyhow::bail!("Cluster {} returned an empty kubeconfig", cluster_name);
        }

        let mut file = tempfile::Builder::new()
            .prefix("kube-")
            .suffix(".config")
            .tempfile()
            .context("Failed to create temporary kubeconfig file")?;

        let text = String::from_utf8_lossy(content);
        file.write_all(text.as_bytes())
            .context("Failed to write kubeconfig content")?;
        file.flush().context("Failed to flush kubeconfig content")?;

        debug!(
            "Materialized kubeconfig for cluster {} at {}",
            cluster_name,
            file.path().display()
        );

        Ok(Self { file })
    }

    /// Path of the materialized file, readable until this value drops
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let content = b"apiVersion: v1\nkind: Config\nclusters: []\n";
        let kubeconfig =
            KubeconfigFile::materialize("demo", content).expect("materialization should succeed");

        let read_back = std::fs::read(kubeconfig.path()).expect("file should be readable");
        assert_eq!(read_back, content);
    }

    #[test]
    fn test_lossy_for_invalid_utf8() {
        let content = b"apiVersion: v1\xff\nkind: Config\n";
        let kubeconfig =
            KubeconfigFile::materialize("demo", content).expect("materialization should succeed");

        let read_back =
            std::fs::read_to_string(kubeconfig.path()).expect("file should be valid UTF-8");
        assert!(read_back.contains('\u{FFFD}'));
    }

    #[test]
    fn test_removed_on_drop() {
        let kubeconfig = KubeconfigFile::materialize("demo", b"apiVersion: v1\n")
            .expect("materialization should succeed");
        let path = kubeconfig.path().to_path_buf();
        assert!(path.exists());

        drop(kubeconfig);
        assert!(!path.exists());
    }

    #[test]
    fn test_empty_blob_is_rejected() {
        let result = KubeconfigFile::materialize("demo", b"");
        assert!(result.is_err());
    }

    #[test]
    fn test_unique_paths() {
        let a = KubeconfigFile::materialize("demo", b"apiVersion: v1\n").expect("first file");
        let b = KubeconfigFile::materialize("demo", b"apiVersion: v1\n").expect("second file");
        assert_ne!(a.path(), b.path());
    }
}
