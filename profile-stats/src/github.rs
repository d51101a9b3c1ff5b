// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// GitHub REST implementation of [`StatsSource`].
///
/// Requests go through [`Octocrab`] but responses are read raw so that the
/// `Link` header stays available to the pagination and count logic.
use http::header::USER_AGENT;
use octocrab::Octocrab;
use serde::Deserialize;
use tracing::debug;

use crate::{
    count::parse_link_page,
    error::Error,
    model::{LanguageByteMap, ListedRepository, PageResponse, RepositoryRef},
    source::{CommitProbe, Contribution, RepositoryListing, StatsSource},
};

const LINK: &str = "link";
const FALLBACK_BRANCH: &str = "main";

/// Client identifier sent with every request.
pub const CLIENT_IDENTIFIER: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize,)]
struct OwnerPayload
{
    login: String,
}

#[derive(Debug, Deserialize,)]
struct RepositoryPayload
{
    name:           String,
    owner:          OwnerPayload,
    #[serde(default)]
    default_branch: Option<String,>,
    #[serde(default)]
    fork:           bool,
    #[serde(default)]
    archived:       bool,
}

impl From<RepositoryPayload,> for ListedRepository
{
    fn from(payload: RepositoryPayload,) -> Self
    {
        let default_branch = payload
            .default_branch
            .filter(|branch| !branch.is_empty(),)
            .unwrap_or_else(|| FALLBACK_BRANCH.to_owned(),);
        Self {
            repository: RepositoryRef::new(payload.owner.login, payload.name, default_branch,),
            fork:       payload.fork,
            archived:   payload.archived,
        }
    }
}

struct RawResponse
{
    link: Option<String,>,
    body: String,
}

/// Authenticated GitHub API client.
#[derive(Clone,)]
pub struct GitHubClient
{
    client: Octocrab,
}

impl std::fmt::Debug for GitHubClient
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_,>,) -> std::fmt::Result
    {
        f.debug_struct("GitHubClient",).finish_non_exhaustive()
    }
}

impl GitHubClient
{
    /// Builds a client authenticating with a personal access token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Service`](Error::Service) when the underlying HTTP
    /// client cannot be constructed.
    pub fn new(token: &str,) -> Result<Self, Error,>
    {
        let client = Octocrab::builder()
            .personal_token(token.to_owned(),)
            .add_header(USER_AGENT, CLIENT_IDENTIFIER.to_owned(),)
            .build()
            .map_err(|e| Error::service(format!("failed to initialize GitHub client: {e}"),),)?;
        Ok(Self {
            client,
        },)
    }

    /// Wraps an already configured [`Octocrab`] instance.
    pub fn from_octocrab(client: Octocrab,) -> Self
    {
        Self {
            client,
        }
    }

    async fn get_raw(&self, route: String,) -> Result<RawResponse, Error,>
    {
        debug!("GET {}", route);
        let response = self
            .client
            ._get(route.as_str(),)
            .await
            .map_err(|e| Error::service(format!("GET {route} failed: {e}"),),)?;

        let status = response.status();
        let link = response
            .headers()
            .get(LINK,)
            .and_then(|value| value.to_str().ok(),)
            .map(str::to_owned,);
        let body = self
            .client
            .body_to_string(response,)
            .await
            .map_err(|e| Error::service(format!("failed to read response of {route}: {e}"),),)?;

        if !status.is_success() {
            return Err(Error::service(format!(
                "GET {route} returned {status}: {}",
                error_message(&body,)
            ),),);
        }

        Ok(RawResponse {
            link,
            body,
        },)
    }
}

fn listing_route(listing: &RepositoryListing, page: u32, per_page: u32,) -> String
{
    match listing {
        RepositoryListing::Authenticated {
            visibility,
            affiliation,
        } => format!(
            "/user/repos?visibility={}&affiliation={}&per_page={per_page}&page={page}",
            visibility.as_str(),
            affiliation.replace(' ', "",),
        ),
        RepositoryListing::Public {
            account,
        } => format!("/users/{account}/repos?type=owner&per_page={per_page}&page={page}"),
    }
}

fn commits_route(repository: &RepositoryRef,) -> String
{
    format!(
        "/repos/{}/{}/commits?sha={}&per_page=1",
        repository.owner,
        repository.name,
        encode_query_value(&repository.default_branch,)
    )
}

fn contributors_route(repository: &RepositoryRef, page: u32, per_page: u32,) -> String
{
    format!(
        "/repos/{}/{}/contributors?per_page={per_page}&page={page}",
        repository.owner, repository.name
    )
}

/// Page number advertised by the `rel="next"` link, if any.
fn next_page_number(link: Option<&str,>,) -> Option<u32,>
{
    link.and_then(|link| parse_link_page(link, "next",),).and_then(|next| u32::try_from(next,).ok(),)
}

fn encode_query_value(value: &str,) -> String
{
    let mut encoded = String::with_capacity(value.len(),);
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                encoded.push(byte as char,)
            }
            other => encoded.push_str(&format!("%{other:02X}"),),
        }
    }
    encoded
}

/// Extracts the `message` field GitHub includes in error bodies.
fn error_message(body: &str,) -> String
{
    #[derive(Deserialize,)]
    struct ErrorBody
    {
        message: String,
    }

    serde_json::from_str::<ErrorBody,>(body,)
        .map(|error| error.message,)
        .unwrap_or_else(|_| body.chars().take(200,).collect(),)
}

impl StatsSource for GitHubClient
{
    async fn repositories_page(
        &self,
        listing: &RepositoryListing,
        page: u32,
        per_page: u32,
    ) -> Result<PageResponse<ListedRepository,>, Error,>
    {
        let raw = self.get_raw(listing_route(listing, page, per_page,),).await?;
        let payload: Vec<RepositoryPayload,> = serde_json::from_str(&raw.body,)?;
        let next_page = next_page_number(raw.link.as_deref(),);

        Ok(PageResponse {
            items: payload.into_iter().map(ListedRepository::from,).collect(),
            is_last_page: next_page.is_none(),
            next_page,
        },)
    }

    async fn languages(&self, repository: &RepositoryRef,) -> Result<LanguageByteMap, Error,>
    {
        let route = format!("/repos/{}/{}/languages", repository.owner, repository.name);
        let raw = self.get_raw(route,).await?;
        Ok(serde_json::from_str(&raw.body,)?,)
    }

    async fn commit_probe(&self, repository: &RepositoryRef,) -> Result<CommitProbe, Error,>
    {
        let raw = self.get_raw(commits_route(repository,),).await?;
        let items: Vec<serde_json::Value,> = serde_json::from_str(&raw.body,)?;
        Ok(CommitProbe {
            link_header: raw.link, item_count: items.len(),
        },)
    }

    async fn contributors_page(
        &self,
        repository: &RepositoryRef,
        page: u32,
        per_page: u32,
    ) -> Result<PageResponse<Contribution,>, Error,>
    {
        let raw = self.get_raw(contributors_route(repository, page, per_page,),).await?;
        // GitHub answers 204 with an empty body for empty repositories.
        if raw.body.trim().is_empty() {
            return Ok(PageResponse {
                items: Vec::new(), next_page: None, is_last_page: true,
            },);
        }
        let items: Vec<Contribution,> = serde_json::from_str(&raw.body,)?;
        let next_page = next_page_number(raw.link.as_deref(),);
        Ok(PageResponse {
            items,
            is_last_page: next_page.is_none(),
            next_page,
        },)
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::source::Visibility;

    #[test]
    fn authenticated_listing_route_carries_filters()
    {
        let listing = RepositoryListing::Authenticated {
            visibility:  Visibility::All,
            affiliation: "owner, collaborator".to_owned(),
        };
        assert_eq!(
            listing_route(&listing, 3, 100,),
            "/user/repos?visibility=all&affiliation=owner,collaborator&per_page=100&page=3"
        );
    }

    #[test]
    fn public_listing_route_targets_account()
    {
        let listing = RepositoryListing::Public {
            account: "octocat".to_owned(),
        };
        assert_eq!(listing_route(&listing, 1, 50,), "/users/octocat/repos?type=owner&per_page=50&page=1");
    }

    #[test]
    fn commits_route_requests_single_item_pages()
    {
        let repository = RepositoryRef::new("octocat", "hello-world", "release/1.0 beta",);
        assert_eq!(
            commits_route(&repository,),
            "/repos/octocat/hello-world/commits?sha=release/1.0%20beta&per_page=1"
        );
    }

    #[test]
    fn contributors_route_is_paginated()
    {
        let repository = RepositoryRef::new("octocat", "hello-world", "main",);
        assert_eq!(
            contributors_route(&repository, 2, 100,),
            "/repos/octocat/hello-world/contributors?per_page=100&page=2"
        );
    }

    #[test]
    fn next_page_reads_next_relation_only()
    {
        let header = "<https://api.github.com/x?page=3>; rel=\"next\", <https://api.github.com/x?page=9>; rel=\"last\"";
        assert_eq!(next_page_number(Some(header,),), Some(3));
        assert_eq!(next_page_number(Some("<https://api.github.com/x?page=1>; rel=\"prev\"",),), None);
        assert_eq!(next_page_number(None,), None);
    }

    #[test]
    fn repository_payload_defaults_missing_fields()
    {
        let payload: RepositoryPayload =
            serde_json::from_str(r#"{"name":"demo","owner":{"login":"octocat"}}"#,)
                .expect("valid payload",);
        let listed = ListedRepository::from(payload,);

        assert_eq!(listed.repository, RepositoryRef::new("octocat", "demo", "main",));
        assert!(!listed.fork);
        assert!(!listed.archived);
    }

    #[test]
    fn repository_payload_reads_flags_and_branch()
    {
        let payload: RepositoryPayload = serde_json::from_str(
            r#"{"name":"demo","owner":{"login":"octocat"},"default_branch":"trunk","fork":true,"archived":true,"stargazers_count":3}"#,
        )
        .expect("valid payload",);
        let listed = ListedRepository::from(payload,);

        assert_eq!(listed.repository.default_branch, "trunk");
        assert!(listed.fork);
        assert!(listed.archived);
    }

    #[test]
    fn error_message_prefers_github_message_field()
    {
        assert_eq!(
            error_message(r#"{"message":"Git Repository is empty.","documentation_url":"x"}"#,),
            "Git Repository is empty."
        );
        assert_eq!(error_message("plain text",), "plain text");
    }

    #[test]
    fn client_identifier_names_the_tool()
    {
        assert!(CLIENT_IDENTIFIER.starts_with("profile-stats/"));
    }

    #[tokio::test]
    async fn client_builds_with_token()
    {
        assert!(GitHubClient::new("ghp_example",).is_ok());
    }
}
