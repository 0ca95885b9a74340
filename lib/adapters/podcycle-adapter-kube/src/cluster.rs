use anyhow::{Context, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::Client;
use kube::api::{Api, DeleteParams, ListParams};
use tracing::debug;

use podcycle_domain::{ClusterSnapshot, Instance};
use podcycle_ports::ClusterPort;

use crate::mapping::instance_from_pod;

/// `ClusterPort` backed by the Kubernetes API server.
#[derive(Clone)]
pub struct KubeClusterPort {
    client: Client,
}

impl KubeClusterPort {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn pods(&self, namespace: &str) -> Api<Pod> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl ClusterPort for KubeClusterPort {
    async fn list_instances(&self) -> Result<ClusterSnapshot> {
        let pods: Api<Pod> = Api::all(self.client.clone());
        let list = pods
            .list(&ListParams::default())
            .await
            .context("failed to list pods across all namespaces")?;
        debug!(count = list.items.len(), "listed pods");
        Ok(list.items.iter().map(instance_from_pod).collect::<Vec<_>>().into())
    }

    async fn get_instance(&self, namespace: &str, name: &str) -> Result<Option<Instance>> {
        let pod = self
            .pods(namespace)
            .get_opt(name)
            .await
            .with_context(|| format!("failed to read pod {namespace}/{name}"))?;
        Ok(pod.as_ref().map(instance_from_pod))
    }

    async fn delete_instance(&self, namespace: &str, name: &str) -> Result<()> {
        // Either side of the response means the API server accepted the delete.
        self.pods(namespace)
            .delete(name, &DeleteParams::default())
            .await
            .with_context(|| format!("failed to delete pod {namespace}/{name}"))?;
        Ok(())
    }

    async fn list_namespace(&self, namespace: &str) -> Result<Vec<Instance>> {
        let list = self
            .pods(namespace)
            .list(&ListParams::default())
            .await
            .with_context(|| format!("failed to list pods in namespace {namespace}"))?;
        Ok(list.items.iter().map(instance_from_pod).collect())
    }
}
