use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration file structure for CISteps.
///
/// Lets users keep the API endpoint, sampling budget and output preferences
/// out of the command line. Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// GitHub API settings
    #[serde(default)]
    pub github: GitHubConfig,

    /// Early-termination thresholds for sampling runs
    #[serde(default)]
    pub budget: BudgetConfig,

    /// Output format preferences
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GitHubConfig {
    /// GitHub API base URL
    #[serde(default = "default_github_base_url")]
    pub base_url: String,

    /// Items requested per list page (GitHub caps this at 100)
    #[serde(default = "default_per_page")]
    pub per_page: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BudgetConfig {
    /// Stop the walk once any limit below is exceeded
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_max_workflows")]
    pub max_workflows: usize,

    #[serde(default = "default_max_jobs")]
    pub max_jobs: usize,

    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Pretty-print JSON output
    #[serde(default)]
    pub pretty: bool,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            base_url: default_github_base_url(),
            per_page: default_per_page(),
        }
    }
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_workflows: default_max_workflows(),
            max_jobs: default_max_jobs(),
            max_steps: default_max_steps(),
        }
    }
}

fn default_github_base_url() -> String {
    "https://api.github.com".to_string()
}

fn default_per_page() -> u8 {
    100
}

fn default_max_workflows() -> usize {
    10
}

fn default_max_jobs() -> usize {
    10
}

fn default_max_steps() -> usize {
    100
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./cisteps.toml, ./cisteps.json, ./cisteps.yaml, ./cisteps.yml
    /// 3. `<config dir>/cisteps/config.toml`
    ///
    /// Returns default configuration if no file is found. A specified path
    /// that does not exist is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        let candidates = ["cisteps.toml", "cisteps.json", "cisteps.yaml", "cisteps.yml"]
            .into_iter()
            .map(PathBuf::from)
            .chain(user_config_file());

        for candidate in candidates {
            if candidate.exists() {
                log::debug!("Using config file: {}", candidate.display());
                return Self::load_from_path(&candidate);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => toml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .or_else(|_| serde_yaml::from_str(&contents))
                .with_context(|| format!("Failed to parse config file: {}", path.display())),
        }
    }
}

fn user_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("cisteps").join("config.toml"))
}
