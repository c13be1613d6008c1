//! Repository-list configuration.

use camino::Utf8Path;
use ohno::{IntoAppError, app_err};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;

/// The default configuration YAML content, embedded from `default_repos.yaml`.
pub const DEFAULT_REPOS_YAML: &str = include_str!("../default_repos.yaml");

/// One repository the tool may aggregate.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RepoEntry {
    /// `owner/name` of the repository.
    pub name: String,

    /// Whether pull requests of this repository are aggregated.
    #[serde(default)]
    pub track_pulls: bool,
}

/// The repository list plus the internal-author set.
#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RepoConfig {
    /// Repositories, in report order.
    #[serde(default)]
    pub repos: Vec<RepoEntry>,

    /// Logins whose pull requests count as internal; everyone else is external.
    #[serde(default)]
    pub internal_users: Vec<String>,
}

impl RepoConfig {
    /// Load the repository list from a YAML file.
    ///
    /// Unlike an optional policy file, a run without a repository list is
    /// meaningless, so a missing file is an error.
    pub fn load(path: &Utf8Path) -> crate::Result<Self> {
        let text = fs::read_to_string(path).into_app_err_with(|| format!("reading repository list '{path}'"))?;
        let config: Self = serde_yaml::from_str(&text).into_app_err_with(|| format!("parsing repository list '{path}'"))?;
        config.validate()?;
        Ok(config)
    }

    /// Save the default configuration to a YAML file.
    pub fn save_default(output_path: &Utf8Path) -> crate::Result<()> {
        fs::write(output_path, DEFAULT_REPOS_YAML).into_app_err_with(|| format!("writing default repository list to {output_path}"))?;
        Ok(())
    }

    /// The tracked repositories, in file order.
    pub fn tracked(&self) -> impl Iterator<Item = &RepoEntry> {
        self.repos.iter().filter(|repo| repo.track_pulls)
    }

    /// The internal-author set, for tagging records.
    #[must_use]
    pub fn internal_users(&self) -> HashSet<String> {
        self.internal_users.iter().cloned().collect()
    }

    fn validate(&self) -> crate::Result<()> {
        for repo in &self.repos {
            let mut parts = repo.name.splitn(2, '/');
            let owner = parts.next().unwrap_or_default();
            let name = parts.next().unwrap_or_default();
            if owner.is_empty() || name.is_empty() {
                return Err(app_err!("repository name '{}' must be of the form owner/name", repo.name));
            }
        }
        Ok(())
    }
}
