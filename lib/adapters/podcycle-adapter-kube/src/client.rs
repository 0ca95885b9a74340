use std::path::Path;

use anyhow::{Context, Result, bail};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use tracing::{info, warn};

/// Build a client from the first kubeconfig in `paths` that loads.
///
/// With no configured paths the ambient configuration is used (`$KUBECONFIG`,
/// `~/.kube/config`, in-cluster). Configured paths never fall back to it.
pub async fn connect(paths: &[String]) -> Result<Client> {
    if paths.is_empty() {
        return Client::try_default()
            .await
            .context("failed to create Kubernetes client from the default kubeconfig");
    }

    for path in paths {
        match client_from_kubeconfig(Path::new(path)).await {
            Ok(client) => {
                info!(path = %path, "loaded kubeconfig");
                return Ok(client);
            }
            Err(err) => warn!(path = %path, error = %format!("{err:#}"), "kubeconfig rejected"),
        }
    }

    bail!(
        "failed to load kubeconfig from any configured path:\n{}",
        tried_paths(paths)
    )
}

async fn client_from_kubeconfig(path: &Path) -> Result<Client> {
    let kubeconfig = Kubeconfig::read_from(path)
        .with_context(|| format!("failed to read kubeconfig {}", path.display()))?;
    let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .with_context(|| format!("invalid kubeconfig {}", path.display()))?;
    Client::try_from(config).context("failed to create Kubernetes client")
}

fn tried_paths(paths: &[String]) -> String {
    paths
        .iter()
        .map(|path| {
            let state = if Path::new(path).exists() {
                "exists"
            } else {
                "not found"
            };
            format!("  {path} ({state})")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tried_paths_marks_missing_files() {
        let listing = tried_paths(&["/nonexistent/vke.yaml".to_string()]);
        assert_eq!(listing, "  /nonexistent/vke.yaml (not found)");
    }

    #[tokio::test]
    async fn test_configured_paths_do_not_fall_back() {
        let err = connect(&["/nonexistent/vke.yaml".to_string()])
            .await
            .err().unwrap();
        let message = err.to_string();
        assert!(message.contains("any configured path"));
        assert!(message.contains("/nonexistent/vke.yaml (not found)"));
    }

    #[test]
    fn test_tried_paths_empty() {
        assert!(tried_paths(&[]).is_empty());
    }
}
