// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Command-line interface for the profile-stats binary.
//!
//! A single invocation lists the account's repositories, aggregates their
//! statistics and refreshes the README section, SVG card and optional JSON
//! snapshot.

use std::{env, io, path::PathBuf, process};

use chrono::Utc;
use clap::{ArgAction, Parser};
use profile_stats::{
    CommitSource, Error, GitHubClient, ListingScope, Overrides, RetryConfig, Settings, SettingsFile,
    Visibility,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Secondary environment variable consulted for the token.
const TOKEN_FALLBACK_ENV: &str = "GITHUB_TOKEN";

/// Aggregate GitHub account statistics into a README section and SVG card.
#[derive(Debug, Parser,)]
#[command(name = "profile-stats", version, about)]
struct Cli
{
    /// Optional YAML settings file; flags take precedence over its values.
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf,>,

    /// Personal access token (falls back to GITHUB_TOKEN).
    #[arg(long = "token", env = "GH_TOKEN", hide_env_values = true, value_name = "TOKEN")]
    token: Option<String,>,

    /// Account whose statistics are collected.
    #[arg(long = "account", env = "GH_USER", value_name = "LOGIN")]
    account: Option<String,>,

    /// README that receives the generated section.
    #[arg(long = "readme", value_name = "PATH")]
    readme: Option<PathBuf,>,

    /// Destination of the SVG language card.
    #[arg(long = "svg", value_name = "PATH")]
    svg: Option<PathBuf,>,

    /// Also write a JSON snapshot of the aggregate.
    #[arg(long = "json", value_name = "PATH")]
    json: Option<PathBuf,>,

    /// Maximum number of repositories processed concurrently.
    #[arg(long = "concurrency", value_name = "N")]
    concurrency: Option<usize,>,

    /// Commit counting strategy.
    #[arg(long = "commit-source", value_enum, value_name = "SOURCE")]
    commit_source: Option<CommitSource,>,

    /// Repository collection to aggregate.
    #[arg(long = "scope", value_enum, value_name = "SCOPE")]
    scope: Option<ListingScope,>,

    /// Visibility filter for the authenticated scope.
    #[arg(long = "visibility", value_enum, value_name = "VISIBILITY")]
    visibility: Option<Visibility,>,

    /// Comma separated affiliation filter for the authenticated scope.
    #[arg(long = "affiliation", value_name = "LIST")]
    affiliation: Option<String,>,

    /// Count forked repositories.
    #[arg(long = "include-forks", action = ArgAction::SetTrue)]
    include_forks: bool,

    /// Count archived repositories.
    #[arg(long = "include-archived", action = ArgAction::SetTrue)]
    include_archived: bool,

    /// Fold languages beyond the first N into an "Other" row.
    #[arg(long = "max-languages", value_name = "N")]
    max_languages: Option<usize,>,

    /// Hide the progress bar and informational logs.
    #[arg(long = "quiet", short = 'q', action = ArgAction::SetTrue)]
    quiet: bool,
}

impl Cli
{
    fn overrides(&self, token_fallback: Option<String,>,) -> Overrides
    {
        Overrides {
            token:            self.token.clone().or(token_fallback,),
            account:          self.account.clone(),
            readme:           self.readme.clone(),
            svg:              self.svg.clone(),
            json:             self.json.clone(),
            concurrency:      self.concurrency,
            commit_source:    self.commit_source,
            include_forks:    self.include_forks.then_some(true,),
            include_archived: self.include_archived.then_some(true,),
            scope:            self.scope,
            visibility:       self.visibility,
            affiliation:      self.affiliation.clone(),
            max_languages:    self.max_languages,
            quiet:            self.quiet,
        }
    }

    /// Resolves settings from the optional file and the parsed flags.
    ///
    /// # Errors
    ///
    /// Propagates settings file and validation errors.
    fn settings(&self, token_fallback: Option<String,>,) -> Result<Settings, Error,>
    {
        let file = match &self.config {
            Some(path,) => SettingsFile::load(path,)?,
            None => SettingsFile::default(),
        };
        Settings::resolve(file, self.overrides(token_fallback,),)
    }
}

/// Entry point that reports errors and sets the appropriate exit status.
#[tokio::main]
async fn main()
{
    if let Err(error,) = run().await {
        eprintln!("{}", error.to_display_string());
        process::exit(1,);
    }
}

/// Executes the CLI using parsed arguments.
///
/// # Errors
///
/// Returns settings, listing and output errors.
async fn run() -> Result<(), Error,>
{
    let cli = Cli::parse();
    init_tracing(cli.quiet,);

    let settings = cli.settings(env::var(TOKEN_FALLBACK_ENV,).ok(),)?;
    info!("Collecting statistics for {}", settings.account);

    let client = GitHubClient::new(&settings.token,)?;
    let report = profile_stats::run(&client, &settings, &RetryConfig::default(), Utc::now(),).await?;

    if report.readme_updated {
        info!("Statistics refreshed");
    } else {
        info!("Statistics unchanged");
    }
    Ok((),)
}

fn init_tracing(quiet: bool,)
{
    let fallback = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback,),);
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter,)
        .with_writer(io::stderr,)
        .with_target(false,)
        .try_init();
}
