//! Per-scenario state threaded through steps

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::backend::BackendClient;
use crate::cli::CliHelper;
use crate::config::HarnessConfig;
use crate::error::E2eResult;
use crate::exec::{CommandRunner, ShellRunner};

/// State owned by one scenario: collaborators plus the values earlier steps
/// discovered for later ones.
#[derive(Debug, Clone)]
pub struct ScenarioContext {
    pub config: HarnessConfig,
    pub cli: CliHelper,
    pub backend: BackendClient,
    kubernetes_id: Option<String>,
    cluster_name: Option<String>,
}

impl ScenarioContext {
    pub fn new(config: HarnessConfig, runner: Arc<dyn CommandRunner>) -> E2eResult<Self> {
        let cli = CliHelper::new(runner, config.cli_binary.clone());
        let backend = BackendClient::new(
            &config.backend_url,
            &config.backend_namespace,
            config.http_timeout(),
        )?;
        Ok(Self {
            config,
            cli,
            backend,
            kubernetes_id: None,
            cluster_name: None,
        })
    }

    /// Context running commands through `sh -c` with the configured timeout
    pub fn from_config(config: HarnessConfig) -> E2eResult<Self> {
        let runner = ShellRunner {
            timeout: config.command_timeout(),
        };
        Self::new(config, Arc::new(runner))
    }

    /// Id of the registered Kubernetes cluster, queried from the backend on
    /// first use.
    pub async fn kubernetes_id(&mut self) -> E2eResult<&str> {
        if self.kubernetes_id.is_none() {
            let id = self.backend.first_kubernetes_id().await?;
            info!("Using Kubernetes cluster {}", id);
            self.kubernetes_id = Some(id);
        }
        Ok(self.kubernetes_id.as_deref().unwrap_or_default())
    }

    pub fn set_kubernetes_id(&mut self, id: impl Into<String>) {
        self.kubernetes_id = Some(id.into());
    }

    /// Cluster name unique to this scenario, generated on first use.
    pub fn cluster_name(&mut self) -> &str {
        self.cluster_name
            .get_or_insert_with(|| format!("test-{}", Uuid::new_v4().simple()))
    }

    /// Replace `{kubernetes_id}` and `{cluster_name}` placeholders.
    pub async fn render(&mut self, template: &str) -> E2eResult<String> {
        let mut rendered = template.to_string();
        if rendered.contains("{kubernetes_id}") {
            let id = self.kubernetes_id().await?.to_string();
            rendered = rendered.replace("{kubernetes_id}", &id);
        }
        if rendered.contains("{cluster_name}") {
            let name = self.cluster_name().to_string();
            rendered = rendered.replace("{cluster_name}", &name);
        }
        Ok(rendered)
    }
}
