// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Run settings assembled from defaults, an optional YAML file and CLI flags.
//!
//! Precedence is flags over file values over built-in defaults. The
//! resolved [`Settings`] are validated once and then passed explicitly to
//! the client and the pipeline.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    aggregate::AggregateOptions,
    count::CommitSource,
    error::{self, Error},
    render::RenderOptions,
    source::{RepositoryListing, Visibility},
};

/// Account aggregated when none is configured.
pub const DEFAULT_ACCOUNT: &str = "GavinHaydy";
/// README updated when none is configured.
pub const DEFAULT_README: &str = "README.md";
/// SVG card written when no path is configured.
pub const DEFAULT_SVG: &str = "metrics/languages.svg";
/// Repositories processed concurrently by default.
pub const DEFAULT_CONCURRENCY: usize = 4;
/// Affiliation filter of authenticated listings.
pub const DEFAULT_AFFILIATION: &str = "owner";

/// Which repository collection a run aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,)]
#[serde(rename_all = "snake_case")]
pub enum ListingScope
{
    /// Repositories of the token holder, private ones included.
    #[default]
    Authenticated,
    /// Public repositories of the configured account.
    Public,
}

/// Optional values read from the YAML settings file.
///
/// # Examples
///
/// ```
/// use profile_stats::SettingsFile;
///
/// let yaml = r#"
/// account: octocat
/// concurrency: 8
/// include_forks: true
/// "#;
/// let file = SettingsFile::parse(yaml,).expect("valid settings",);
/// assert_eq!(file.account.as_deref(), Some("octocat"));
/// assert_eq!(file.concurrency, Some(8));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize,)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile
{
    /// Account whose statistics are collected.
    #[serde(default, alias = "user")]
    pub account:          Option<String,>,
    /// README containing the generated section.
    #[serde(default)]
    pub readme:           Option<PathBuf,>,
    /// Destination of the SVG card.
    #[serde(default)]
    pub svg:              Option<PathBuf,>,
    /// Destination of the JSON snapshot.
    #[serde(default)]
    pub json:             Option<PathBuf,>,
    /// Maximum number of repositories processed at once.
    #[serde(default)]
    pub concurrency:      Option<usize,>,
    /// Commit counting strategy.
    #[serde(default)]
    pub commit_source:    Option<CommitSource,>,
    /// Count forked repositories.
    #[serde(default)]
    pub include_forks:    Option<bool,>,
    /// Count archived repositories.
    #[serde(default)]
    pub include_archived: Option<bool,>,
    /// Repository collection to aggregate.
    #[serde(default)]
    pub scope:            Option<ListingScope,>,
    /// Visibility filter of authenticated listings.
    #[serde(default)]
    pub visibility:       Option<Visibility,>,
    /// Affiliation filter of authenticated listings.
    #[serde(default)]
    pub affiliation:      Option<String,>,
    /// Number of named languages before the tail is folded into "Other".
    #[serde(default)]
    pub max_languages:    Option<usize,>,
}

impl SettingsFile
{
    /// Loads a settings file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](Error::Io) when the file cannot be read and
    /// [`Error::Parse`](Error::Parse) when it is not valid YAML.
    pub fn load(path: &Path,) -> Result<Self, Error,>
    {
        let contents = fs::read_to_string(path,).map_err(|source| error::io_error(path, source,),)?;
        Self::parse(&contents,)
    }

    /// Parses settings from a YAML document.
    ///
    /// An empty document yields all defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`](Error::Parse) for malformed YAML or unknown
    /// keys.
    pub fn parse(contents: &str,) -> Result<Self, Error,>
    {
        if contents.trim().is_empty() {
            return Ok(Self::default(),);
        }
        Ok(serde_yaml::from_str(contents,)?,)
    }
}

/// Values supplied on the command line or through the environment.
#[derive(Debug, Clone, Default,)]
pub struct Overrides
{
    /// Personal access token; required after merging.
    pub token:            Option<String,>,
    /// Account whose statistics are collected.
    pub account:          Option<String,>,
    /// README containing the generated section.
    pub readme:           Option<PathBuf,>,
    /// Destination of the SVG card.
    pub svg:              Option<PathBuf,>,
    /// Destination of the JSON snapshot.
    pub json:             Option<PathBuf,>,
    /// Maximum number of repositories processed at once.
    pub concurrency:      Option<usize,>,
    /// Commit counting strategy.
    pub commit_source:    Option<CommitSource,>,
    /// Count forked repositories; `None` keeps the file value.
    pub include_forks:    Option<bool,>,
    /// Count archived repositories; `None` keeps the file value.
    pub include_archived: Option<bool,>,
    /// Repository collection to aggregate.
    pub scope:            Option<ListingScope,>,
    /// Visibility filter of authenticated listings.
    pub visibility:       Option<Visibility,>,
    /// Affiliation filter of authenticated listings.
    pub affiliation:      Option<String,>,
    /// Number of named languages before the tail is folded into "Other".
    pub max_languages:    Option<usize,>,
    /// Hide the progress bar.
    pub quiet:            bool,
}

/// Fully resolved and validated run settings.
#[derive(Clone, PartialEq, Eq,)]
pub struct Settings
{
    /// Personal access token sent as bearer credentials.
    pub token:            String,
    /// Account login the statistics belong to.
    pub account:          String,
    /// README containing the generated section.
    pub readme:           PathBuf,
    /// Destination of the SVG card.
    pub svg:              PathBuf,
    /// Optional destination of the JSON snapshot.
    pub json:             Option<PathBuf,>,
    /// Maximum number of repositories processed at once.
    pub concurrency:      usize,
    /// Commit counting strategy.
    pub commit_source:    CommitSource,
    /// Count forked repositories.
    pub include_forks:    bool,
    /// Count archived repositories.
    pub include_archived: bool,
    /// Repository collection to aggregate.
    pub listing:          RepositoryListing,
    /// Number of named languages before the tail is folded into "Other".
    pub max_languages:    Option<usize,>,
    /// Show the progress bar.
    pub show_progress:    bool,
}

impl std::fmt::Debug for Settings
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_,>,) -> std::fmt::Result
    {
        f.debug_struct("Settings",)
            .field("token", &"<redacted>",)
            .field("account", &self.account,)
            .field("readme", &self.readme,)
            .field("svg", &self.svg,)
            .field("json", &self.json,)
            .field("concurrency", &self.concurrency,)
            .field("commit_source", &self.commit_source,)
            .field("include_forks", &self.include_forks,)
            .field("include_archived", &self.include_archived,)
            .field("listing", &self.listing,)
            .field("max_languages", &self.max_languages,)
            .field("show_progress", &self.show_progress,)
            .finish()
    }
}

impl Settings
{
    /// Merges overrides and file values over the built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`](Error::Validation) when the token is
    /// missing or blank, the account is blank, or a numeric limit is zero.
    pub fn resolve(file: SettingsFile, overrides: Overrides,) -> Result<Self, Error,>
    {
        let token = overrides
            .token
            .map(|token| token.trim().to_owned(),)
            .filter(|token| !token.is_empty(),)
            .ok_or_else(|| Error::validation("a GitHub token is required (GH_TOKEN or --token)",),)?;

        let account = overrides
            .account
            .or(file.account,)
            .unwrap_or_else(|| DEFAULT_ACCOUNT.to_owned(),)
            .trim()
            .to_owned();
        if account.is_empty() {
            return Err(Error::validation("account must not be empty",),);
        }

        let concurrency = overrides.concurrency.or(file.concurrency,).unwrap_or(DEFAULT_CONCURRENCY,);
        if concurrency == 0 {
            return Err(Error::validation("concurrency must be at least 1",),);
        }

        let max_languages = overrides.max_languages.or(file.max_languages,);
        if max_languages == Some(0,) {
            return Err(Error::validation("max_languages must be at least 1",),);
        }

        let listing = match overrides.scope.or(file.scope,).unwrap_or_default() {
            ListingScope::Authenticated => RepositoryListing::Authenticated {
                visibility:  overrides.visibility.or(file.visibility,).unwrap_or_default(),
                affiliation: overrides
                    .affiliation
                    .or(file.affiliation,)
                    .filter(|affiliation| !affiliation.trim().is_empty(),)
                    .unwrap_or_else(|| DEFAULT_AFFILIATION.to_owned(),),
            },
            ListingScope::Public => RepositoryListing::Public {
                account: account.clone(),
            },
        };

        Ok(Self {
            token,
            account,
            readme: overrides
                .readme
                .or(file.readme,)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_README,),),
            svg: overrides.svg.or(file.svg,).unwrap_or_else(|| PathBuf::from(DEFAULT_SVG,),),
            json: overrides.json.or(file.json,),
            concurrency,
            commit_source: overrides.commit_source.or(file.commit_source,).unwrap_or_default(),
            include_forks: overrides.include_forks.or(file.include_forks,).unwrap_or(false,),
            include_archived: overrides.include_archived.or(file.include_archived,).unwrap_or(false,),
            listing,
            max_languages,
            show_progress: !overrides.quiet,
        },)
    }

    /// Options handed to the aggregator.
    pub fn aggregate_options(&self,) -> AggregateOptions
    {
        AggregateOptions {
            concurrency:   self.concurrency,
            commit_source: self.commit_source,
            login:         self.account.clone(),
            show_progress: self.show_progress,
        }
    }

    /// Options handed to the renderer.
    pub fn render_options(&self,) -> RenderOptions
    {
        RenderOptions {
            max_languages: self.max_languages,
            svg_link:      Some(svg_link(&self.readme, &self.svg,),),
        }
    }
}

/// Path of the SVG as referenced from the README.
///
/// The link is relative to the README's directory when the SVG lives below
/// it; otherwise the configured path is used verbatim.
fn svg_link(readme: &Path, svg: &Path,) -> String
{
    let base = readme.parent().unwrap_or_else(|| Path::new("",),);
    let relative = svg.strip_prefix(base,).unwrap_or(svg,);
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy(),)
        .collect::<Vec<_,>>()
        .join("/",)
}
