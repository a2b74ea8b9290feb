//! Read-only queries against the backend inventory API

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{E2eError, E2eResult};

const KUBERNETES_PATH: &str = "/v1/kubernetes";

/// A Kubernetes cluster registered in the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KubernetesCluster {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    /// Fields the harness does not look at
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// HTTP client for the backend
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
    namespace: String,
}

impl BackendClient {
    pub fn new(base_url: &str, namespace: &str, timeout: Duration) -> E2eResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            namespace: namespace.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `path` and return the body as untyped JSON.
    pub async fn get_json(&self, path: &str) -> E2eResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(E2eError::Backend {
                url,
                status: status.as_u16(),
            });
        }
        Ok(resp.json().await?)
    }

    /// Registered Kubernetes clusters
    pub async fn list_kubernetes(&self) -> E2eResult<Vec<KubernetesCluster>> {
        let body = self.get_json(KUBERNETES_PATH).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Id of the first registered cluster
    pub async fn first_kubernetes_id(&self) -> E2eResult<String> {
        self.list_kubernetes()
            .await?
            .into_iter()
            .map(|cluster| cluster.id)
            .find(|id| !id.is_empty())
            .ok_or_else(|| E2eError::UnexpectedState {
                check: "kubernetes id",
                detail: "no Kubernetes cluster is registered".to_string(),
            })
    }

    /// Exactly one cluster is registered and it is `cluster_name` in the
    /// platform namespace.
    pub async fn verify_cluster_registered(&self, cluster_name: &str) -> E2eResult<()> {
        let clusters = self.list_kubernetes().await?;
        info!(
            "Registered clusters: {}",
            serde_json::to_string_pretty(&clusters)?
        );

        match clusters.as_slice() {
            [cluster] if cluster.name == cluster_name && cluster.namespace == self.namespace => {
                Ok(())
            }
            _ => Err(E2eError::UnexpectedState {
                check: "cluster registration",
                detail: format!(
                    "expected exactly cluster {:?} in namespace {:?}, backend has {:?}",
                    cluster_name,
                    self.namespace,
                    clusters
                        .iter()
                        .map(|c| format!("{}/{}", c.namespace, c.name))
                        .collect::<Vec<_>>()
                ),
            }),
        }
    }

    /// No cluster is registered.
    pub async fn verify_no_clusters(&self) -> E2eResult<()> {
        let clusters = self.list_kubernetes().await?;
        if clusters.is_empty() {
            Ok(())
        } else {
            Err(E2eError::UnexpectedState {
                check: "cluster removal",
                detail: format!("expected no registered clusters, backend has {}", clusters.len()),
            })
        }
    }
}
