// driftwatch-core/src/infrastructure/config/project.rs

use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

use crate::domain::drift::DriftConfig;
use crate::domain::project::configuration::{ProjectConfig, TransportConfig};
use crate::infrastructure::error::InfrastructureError;

pub const CONFIG_CANDIDATES: [&str; 2] = ["driftwatch_project_conf.yaml", "driftwatch.yaml"];

/// Optional satellite overriding the whole `drift` section.
pub const DRIFT_FRAGMENT: &str = "config/drift.yml";

pub const ENV_STORAGE_ROOT: &str = "DRIFTWATCH_STORAGE_ROOT";
pub const ENV_RECIPIENT: &str = "DRIFTWATCH_RECIPIENT";
pub const ENV_SHARE_THRESHOLD: &str = "DRIFTWATCH_SHARE_THRESHOLD";

/// Loads, layers and validates the project configuration.
///
/// Relative storage and outbox paths are resolved against `project_dir`.
#[instrument(skip(project_dir))]
pub fn load_project_config(project_dir: &Path) -> Result<ProjectConfig, InfrastructureError> {
    load_project_config_with(project_dir, |key| std::env::var(key).ok())
}

/// Same as [`load_project_config`] with an explicit environment lookup.
pub fn load_project_config_with<F>(
    project_dir: &Path,
    env: F,
) -> Result<ProjectConfig, InfrastructureError>
where
    F: Fn(&str) -> Option<String>,
{
    let config_path = find_main_config(project_dir)?;
    info!(path = ?config_path, "Loading project configuration");

    let mut config: ProjectConfig = load_fragment(&config_path)?;

    let drift_path = project_dir.join(DRIFT_FRAGMENT);
    if drift_path.exists() {
        let drift: DriftConfig = load_fragment(&drift_path)?;
        config.drift = drift;
        info!(path = ?drift_path, "Drift settings loaded from satellite file");
    }

    apply_env_overrides(&mut config, env)?;
    resolve_paths(&mut config, project_dir);

    config
        .check()
        .map_err(|e| InfrastructureError::ConfigError(e.to_string()))?;
    Ok(config)
}

pub fn find_main_config(root: &Path) -> Result<PathBuf, InfrastructureError> {
    CONFIG_CANDIDATES
        .iter()
        .map(|name| root.join(name))
        .find(|p| p.exists())
        .ok_or_else(|| {
            InfrastructureError::ConfigNotFound(format!(
                "{} (checked {:?})",
                root.display(),
                CONFIG_CANDIDATES
            ))
        })
}

/// Reads a typed YAML document.
fn load_fragment<T: DeserializeOwned>(path: &Path) -> Result<T, InfrastructureError> {
    let content = fs::read_to_string(path)?;
    serde_yaml::from_str(&content).map_err(|e| {
        InfrastructureError::ConfigError(format!("invalid YAML in {}: {}", path.display(), e))
    })
}

fn apply_env_overrides<F>(config: &mut ProjectConfig, env: F) -> Result<(), InfrastructureError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = env(ENV_STORAGE_ROOT) {
        info!(old = %config.storage.root, new = %val, "Overriding storage root via ENV");
        config.storage.root = val;
    }
    if let Some(val) = env(ENV_RECIPIENT) {
        info!(new = %val, "Overriding notification recipient via ENV");
        config.notification.recipient = val;
    }
    if let Some(val) = env(ENV_SHARE_THRESHOLD) {
        let parsed: f64 = val.trim().parse().map_err(|_| {
            InfrastructureError::ConfigError(format!(
                "{} must be a number, got '{}'",
                ENV_SHARE_THRESHOLD, val
            ))
        })?;
        info!(old = config.drift.share_threshold, new = parsed, "Overriding share threshold via ENV");
        config.drift.share_threshold = parsed;
    }
    Ok(())
}

fn resolve_paths(config: &mut ProjectConfig, project_dir: &Path) {
    let anchor = |raw: &str| -> String {
        let p = Path::new(raw);
        if p.is_absolute() {
            raw.to_string()
        } else {
            project_dir.join(p).display().to_string()
        }
    };

    config.storage.root = anchor(&config.storage.root);
    match &mut config.notification.transport {
        TransportConfig::Outbox { path } => {
            let anchored = anchor(path.as_str());
            *path = anchored;
        }
        TransportConfig::Webhook { url, .. } if url.starts_with("http://") => {
            warn!(url = %url, "Webhook relay is not using TLS");
        }
        TransportConfig::Webhook { .. } => {}
    }
}
