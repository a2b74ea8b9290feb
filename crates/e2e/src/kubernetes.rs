//! Convergence checks against cluster state observed through `kubectl`

use serde::Deserialize;

use crate::cli::CliHelper;
use crate::poll::PollOutcome;

/// Database engine types the platform installs by default
pub const DEFAULT_DB_ENGINES: [&str; 3] = ["pxc", "psmdb", "postgresql"];

#[derive(Debug, Deserialize)]
struct DbEngineList {
    #[serde(default)]
    items: Vec<DbEngine>,
}

#[derive(Debug, Deserialize)]
struct DbEngine {
    spec: DbEngineSpec,
    #[serde(default)]
    status: Option<DbEngineStatus>,
}

#[derive(Debug, Deserialize)]
struct DbEngineSpec {
    #[serde(rename = "type")]
    engine_type: String,
}

#[derive(Debug, Deserialize)]
struct DbEngineStatus {
    #[serde(default)]
    status: String,
}

impl DbEngine {
    fn is_installed(&self) -> bool {
        self.status.as_ref().is_some_and(|s| s.status == "installed")
    }
}

/// Evaluate `kubectl get dbengine` output: every engine in `engines` must be
/// present and every listed engine installed.
pub fn check_db_engines(json: &str, engines: &[&str]) -> PollOutcome {
    let list: DbEngineList = match serde_json::from_str(json) {
        Ok(list) => list,
        Err(e) => return PollOutcome::Fatal(e.into()),
    };

    for engine in engines {
        if !list.items.iter().any(|item| item.spec.engine_type == *engine) {
            return PollOutcome::not_ready(format!("dbengine {engine} not yet available"));
        }
    }

    let installed = list.items.iter().filter(|item| item.is_installed()).count();
    if installed != list.items.len() {
        return PollOutcome::not_ready(format!(
            "{} of {} dbengines installed",
            installed,
            list.items.len()
        ));
    }

    PollOutcome::Success
}

/// Poll predicate: all database engines in `namespace` are installed.
pub async fn db_engines_ready(cli: &CliHelper, namespace: &str, engines: &[&str]) -> PollOutcome {
    let command = format!("kubectl -n {namespace} get dbengine -o json");
    let out = match cli.exec_silent(&command).await {
        Ok(out) => out,
        Err(e) => return PollOutcome::Fatal(e),
    };

    // The CRD may not be registered yet right after installation
    if let Err(e) = out.assert_success() {
        return PollOutcome::not_ready(e.to_string());
    }

    check_db_engines(out.stdout(), engines)
}

/// Poll predicate: pods in `namespace` include every name in `expected` and
/// none in `absent`.
pub async fn pods_present(
    cli: &CliHelper,
    namespace: &str,
    expected: &[&str],
    absent: &[&str],
) -> PollOutcome {
    let command = format!("kubectl get pods --namespace={namespace}");
    let out = match cli.exec_silent(&command).await {
        Ok(out) => out,
        Err(e) => return PollOutcome::Fatal(e),
    };

    PollOutcome::from_check(
        out.assert_success()
            .and_then(|()| out.out_contains_normalized_many(expected))
            .and_then(|()| out.out_not_contains(absent)),
    )
}
