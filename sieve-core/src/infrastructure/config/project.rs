// sieve-core/src/infrastructure/config/project.rs

use serde::{Deserialize, de::DeserializeOwned};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};
use validator::Validate;

use crate::domain::enrichment::CategoryRule;
use crate::domain::project::configuration::ProjectConfig;
use crate::infrastructure::error::InfrastructureError;

const CONFIG_CANDIDATES: [&str; 2] = ["sieve_project.yaml", "sieve.yaml"];

#[instrument(skip(project_dir))]
pub fn load_project_config(project_dir: &Path) -> Result<ProjectConfig, InfrastructureError> {
    let config_path = find_main_config(project_dir)?;
    info!(path = ?config_path, "Loading project configuration");

    let mut config: ProjectConfig = load_fragment(&config_path)?;

    let folders = config.config_paths.clone();
    for folder in &folders {
        let config_dir = project_dir.join(folder);
        if config_dir.exists() {
            load_satellite_configs(&mut config, &config_dir)?;
        }
    }

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    config.validate()?;
    Ok(config)
}

pub fn find_main_config(root: &Path) -> Result<PathBuf, InfrastructureError> {
    CONFIG_CANDIDATES
        .iter()
        .map(|name| root.join(name))
        .find(|p| p.exists())
        .ok_or_else(|| {
            InfrastructureError::ConfigNotFound(format!(
                "{} (checked: {:?})",
                root.display(),
                CONFIG_CANDIDATES
            ))
        })
}

/// Reads one YAML document into `T`.
#[instrument]
fn load_fragment<T: DeserializeOwned>(path: &Path) -> Result<T, InfrastructureError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&content)?)
}

fn load_satellite_configs(
    config: &mut ProjectConfig,
    config_dir: &Path,
) -> Result<(), InfrastructureError> {
    let categories_path = config_dir.join("categories.yml");
    if categories_path.exists() {
        #[derive(Deserialize)]
        struct CategoriesWrapper {
            categories: Vec<CategoryRule>,
        }

        let wrapper: CategoriesWrapper = load_fragment(&categories_path)?;
        info!(rules = wrapper.categories.len(), "Category rules loaded");
        config.categories = wrapper.categories;
    }
    Ok(())
}

/// `SIEVE_TARGET_PATH` and `SIEVE_OUTPUT` win over the file.
fn apply_env_overrides(config: &mut ProjectConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(val) = lookup("SIEVE_TARGET_PATH") {
        info!(old = ?config.target_path, new = ?val, "Overriding target path via ENV");
        config.target_path = val;
    }
    if let Some(val) = lookup("SIEVE_OUTPUT") {
        info!(old = ?config.output, new = ?val, "Overriding output via ENV");
        config.output = val;
    }
}
