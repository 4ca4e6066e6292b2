use anyhow::{Context, Result};
use clap::builder::FalseyValueParser;
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::path::PathBuf;

use crate::auth::Token;
use crate::budget::TraversalBudget;
use crate::config::Config;
use crate::error::CiStepsError;
use crate::merge::merge_files;
use crate::output::write_json;
use crate::providers::GitHubProvider;

#[derive(Parser, Debug)]
#[command(name = "cisteps")]
#[command(author, version, about = "GitHub Actions Step Telemetry", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Write the JSON array to this file instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[arg(short, long, global = true, default_value_t = false)]
    pretty: bool,

    /// Configuration file (defaults to ./cisteps.toml and friends)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Flatten every workflow run on a branch into step records
    Fetch {
        owner: String,

        repo: String,

        branch: String,

        #[arg(long, env = "GH_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// GitHub API base URL
        #[arg(long)]
        url: Option<String>,

        /// Stop after a small sample of workflows, jobs and steps
        #[arg(long, env = "CISTEPS_DEBUG", value_parser = FalseyValueParser::new())]
        debug: bool,
    },
    /// Concatenate JSON arrays from files, in order
    ///
    /// Only `[output] pretty` is read from the configuration file; an
    /// unreadable configuration is ignored with a warning.
    Merge {
        #[arg(required = true, num_args = 1..)]
        paths: Vec<PathBuf>,
    },
}

impl Cli {
    pub async fn execute(&self) -> Result<()> {
        match &self.command {
            Commands::Fetch {
                owner,
                repo,
                branch,
                token,
                url,
                debug,
            } => {
                let config = Config::load(self.config.as_deref())?;
                let pretty = self.pretty || config.output.pretty;
                self.execute_fetch(
                    &config,
                    owner,
                    repo,
                    branch,
                    token.as_deref(),
                    url.as_deref(),
                    *debug,
                    pretty,
                )
                .await
            }
            Commands::Merge { paths } => {
                // Only the output preference is read here, so a broken config
                // file must not block a merge.
                let config = Config::load(self.config.as_deref()).unwrap_or_else(|e| {
                    warn!("Ignoring configuration for merge: {e:#}");
                    Config::default()
                });
                let pretty = self.pretty || config.output.pretty;
                let merged = merge_files(paths)?;
                write_json(&merged, self.output.as_deref(), pretty)?;
                Ok(())
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn execute_fetch(
        &self,
        config: &Config,
        owner: &str,
        repo: &str,
        branch: &str,
        token: Option<&str>,
        url: Option<&str>,
        debug: bool,
        pretty: bool,
    ) -> Result<()> {
        let token = token
            .map(Token::from)
            .filter(|token| !token.as_str().is_empty())
            .ok_or(CiStepsError::MissingToken)?;
        let base_url = url.unwrap_or(&config.github.base_url);
        let budget = TraversalBudget::from_config(&config.budget, debug);

        info!("Collecting step telemetry for {owner}/{repo} on {branch}");

        let provider = GitHubProvider::new(
            base_url,
            owner.to_owned(),
            repo.to_owned(),
            token,
            config.github.per_page,
        )?;

        let steps = provider
            .collect_steps(branch, &budget)
            .await
            .into_output()
            .with_context(|| format!("Traversal of {owner}/{repo} failed"))?;

        write_json(&steps, self.output.as_deref(), pretty)?;
        Ok(())
    }
}
