// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Abstraction over the remote API consumed by the aggregation pipeline.
//!
//! The pipeline is generic over [`StatsSource`] so that tests can drive it
//! with in-memory fakes while production code uses
//! [`GitHubClient`](crate::GitHubClient).

use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    model::{LanguageByteMap, ListedRepository, PageResponse, RepositoryRef},
};

/// Repository visibility filter applied to authenticated listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,)]
#[serde(rename_all = "snake_case")]
pub enum Visibility
{
    /// Public and private repositories.
    #[default]
    All,
    /// Public repositories only.
    Public,
    /// Private repositories only.
    Private,
}

impl Visibility
{
    /// Query-string value understood by the GitHub API.
    pub fn as_str(self,) -> &'static str
    {
        match self {
            Self::All => "all",
            Self::Public => "public",
            Self::Private => "private",
        }
    }
}

/// Collection of repositories the run aggregates over.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub enum RepositoryListing
{
    /// Repositories visible to the authenticated token holder.
    Authenticated
    {
        /// Visibility filter.
        visibility:  Visibility,
        /// Comma separated affiliation filter, e.g. `owner,collaborator`.
        affiliation: String,
    },
    /// Public repositories owned by a named account.
    Public
    {
        /// Account whose repositories are listed.
        account: String,
    },
}

impl RepositoryListing
{
    /// Short label used in log messages.
    pub fn describe(&self,) -> String
    {
        match self {
            Self::Authenticated {
                visibility,
                affiliation,
            } => format!("authenticated user ({} / {affiliation})", visibility.as_str()),
            Self::Public {
                account,
            } => format!("public repositories of {account}"),
        }
    }
}

/// Raw outcome of a `per_page=1` commit listing request.
#[derive(Debug, Clone, PartialEq, Eq, Default,)]
pub struct CommitProbe
{
    /// Value of the `Link` response header, if the server sent one.
    pub link_header: Option<String,>,
    /// Number of commit entries in the response body.
    pub item_count:  usize,
}

/// Contribution count reported for one contributor login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
pub struct Contribution
{
    /// Contributor login.
    pub login:         String,
    /// Number of commits attributed to the login.
    pub contributions: u64,
}

/// Remote endpoints required by the aggregation pipeline.
///
/// Every method performs at most one request; pagination and fault
/// containment live in the callers.
#[allow(async_fn_in_trait)]
pub trait StatsSource
{
    /// Fetches one page of the repository listing.
    async fn repositories_page(
        &self,
        listing: &RepositoryListing,
        page: u32,
        per_page: u32,
    ) -> Result<PageResponse<ListedRepository,>, Error,>;

    /// Fetches the language byte distribution of a repository.
    async fn languages(&self, repository: &RepositoryRef,) -> Result<LanguageByteMap, Error,>;

    /// Requests the first commit page of the default branch with one item
    /// per page.
    async fn commit_probe(&self, repository: &RepositoryRef,) -> Result<CommitProbe, Error,>;

    /// Fetches one page of a repository's contributors with their
    /// contribution counts.
    async fn contributors_page(
        &self,
        repository: &RepositoryRef,
        page: u32,
        per_page: u32,
    ) -> Result<PageResponse<Contribution,>, Error,>;
}
