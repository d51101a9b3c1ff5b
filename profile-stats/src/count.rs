// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Commit count resolution for a repository's default branch.
///
/// The commits endpoint does not return a total. Requesting one commit per
/// page turns the page number of the `rel="last"` link into the exact count.
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    error::Error,
    fetch::{MAX_PAGE_SIZE, fetch_all_pages},
    model::RepositoryRef,
    source::{CommitProbe, StatsSource},
};

static LINK_PATTERN: LazyLock<Regex,> = LazyLock::new(|| {
    Regex::new(r#"<([^>]*)>\s*;\s*rel\s*=\s*"([^"]*)""#,).expect("link pattern is valid",)
},);

static PAGE_PATTERN: LazyLock<Regex,> =
    LazyLock::new(|| Regex::new(r"[?&]page=(\d+)",).expect("page pattern is valid",),);

/// Strategy used to obtain a repository's commit total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,)]
#[serde(rename_all = "snake_case")]
pub enum CommitSource
{
    /// Count every commit on the default branch via pagination metadata.
    #[default]
    Pagination,
    /// Use the contribution count the contributors endpoint reports for the
    /// configured account.
    Contributors,
}

/// Extracts the page number carried by the `relation` link of a `Link`
/// header.
///
/// Returns `None` when the relation is missing or its URL has no numeric
/// `page` parameter.
///
/// # Example
///
/// ```
/// use profile_stats::parse_link_page;
///
/// let header = r#"<https://api.github.com/x?page=2>; rel="next", <https://api.github.com/x?page=9>; rel="last""#;
/// assert_eq!(parse_link_page(header, "next"), Some(2));
/// assert_eq!(parse_link_page(header, "prev"), None);
/// ```
pub fn parse_link_page(header: &str, relation: &str,) -> Option<u64,>
{
    LINK_PATTERN
        .captures_iter(header,)
        .find(|captures| captures[2].split_whitespace().any(|rel| rel == relation,),)
        .and_then(|captures| {
            PAGE_PATTERN.captures(&captures[1],).and_then(|page| page[1].parse().ok(),)
        },)
}

/// Extracts the page number of the `rel="last"` link.
pub fn parse_last_page(header: &str,) -> Option<u64,>
{
    parse_link_page(header, "last",)
}

/// Derives the commit total from a `per_page=1` probe.
///
/// Falls back to the number of returned items when the header is absent or
/// unusable.
pub fn count_from_probe(probe: &CommitProbe,) -> u64
{
    probe.link_header.as_deref().and_then(parse_last_page,).unwrap_or(probe.item_count as u64,)
}

/// Resolves the commit count of the default branch, reporting failures.
///
/// # Errors
///
/// Propagates the request error returned by the source.
pub async fn try_resolve_count<C: StatsSource,>(
    source: &C,
    repository: &RepositoryRef,
) -> Result<u64, Error,>
{
    let probe = source.commit_probe(repository,).await?;
    let count = count_from_probe(&probe,);
    debug!("{} has {} commits on {}", repository, count, repository.default_branch);
    Ok(count,)
}

/// Resolves the commit count of the default branch.
///
/// Request failures are logged and resolve to zero; they never reach the
/// caller.
pub async fn resolve_count<C: StatsSource,>(source: &C, repository: &RepositoryRef,) -> u64
{
    match try_resolve_count(source, repository,).await {
        Ok(count,) => count,
        Err(error,) => {
            warn!("commit count for {} unavailable: {}", repository, error);
            0
        }
    }
}

/// Sums the contributions attributed to `login` in a repository.
///
/// Every contributor page is read, so logins outside the first page are
/// still found. Logins are compared case-insensitively, matching GitHub's
/// handling.
///
/// # Errors
///
/// Propagates the request error returned by the source.
pub async fn try_contributions_count<C: StatsSource,>(
    source: &C,
    repository: &RepositoryRef,
    login: &str,
) -> Result<u64, Error,>
{
    contributions_count_paged(source, repository, login, MAX_PAGE_SIZE,).await
}

async fn contributions_count_paged<C: StatsSource,>(
    source: &C,
    repository: &RepositoryRef,
    login: &str,
    page_size: u32,
) -> Result<u64, Error,>
{
    let contributors = fetch_all_pages(page_size, |page| {
        source.contributors_page(repository, page, page_size,)
    },)
    .await?;
    let count: u64 = contributors
        .iter()
        .filter(|contributor| contributor.login.eq_ignore_ascii_case(login,),)
        .map(|contributor| contributor.contributions,)
        .sum();
    debug!("{} has {} commits by {}", repository, count, login);
    Ok(count,)
}

/// Resolves the commit total of a repository with the selected strategy.
///
/// # Errors
///
/// Propagates the request error of the underlying strategy.
pub async fn resolve_commits<C: StatsSource,>(
    source: &C,
    repository: &RepositoryRef,
    strategy: CommitSource,
    login: &str,
) -> Result<u64, Error,>
{
    match strategy {
        CommitSource::Pagination => try_resolve_count(source, repository,).await,
        CommitSource::Contributors => try_contributions_count(source, repository, login,).await,
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::source::{
        Contribution,
        testing::{FakeRepository, FakeSource},
    };

    const GITHUB_LINK: &str = "<https://api.github.com/repositories/1300192/commits?sha=main&per_page=1&page=2>; rel=\"next\", <https://api.github.com/repositories/1300192/commits?sha=main&per_page=1&page=1487>; rel=\"last\"";

    #[test]
    fn parse_last_page_reads_github_header()
    {
        assert_eq!(parse_last_page(GITHUB_LINK), Some(1487));
    }

    #[test]
    fn parse_last_page_ignores_per_page_parameter()
    {
        let header = "<https://api.github.com/x?per_page=1>; rel=\"last\"";
        assert_eq!(parse_last_page(header), None);
    }

    #[test]
    fn parse_last_page_handles_page_before_other_parameters()
    {
        let header = "<https://api.github.com/x?page=31&per_page=1>; rel=\"last\"";
        assert_eq!(parse_last_page(header), Some(31));
    }

    #[test]
    fn parse_last_page_returns_none_without_last_relation()
    {
        let header = "<https://api.github.com/x?page=1>; rel=\"prev\", <https://api.github.com/x?page=1>; rel=\"first\"";
        assert_eq!(parse_last_page(header), None);
    }

    #[test]
    fn parse_last_page_treats_malformed_input_as_absent()
    {
        assert_eq!(parse_last_page(""), None);
        assert_eq!(parse_last_page("garbage"), None);
        assert_eq!(parse_last_page("<https://x?page=abc>; rel=\"last\""), None);
        assert_eq!(parse_last_page("https://x?page=4; rel=last"), None);
        assert_eq!(parse_last_page("<https://x?page=99999999999999999999999>; rel=\"last\""), None);
    }

    #[test]
    fn count_from_probe_prefers_last_page()
    {
        let probe = CommitProbe {
            link_header: Some(GITHUB_LINK.to_owned(),), item_count: 1,
        };
        assert_eq!(count_from_probe(&probe), 1487);
    }

    #[test]
    fn count_from_probe_falls_back_to_item_count()
    {
        let single = CommitProbe {
            link_header: None, item_count: 1,
        };
        let empty = CommitProbe {
            link_header: None, item_count: 0,
        };
        let malformed = CommitProbe {
            link_header: Some("nonsense".to_owned(),), item_count: 1,
        };

        assert_eq!(count_from_probe(&single), 1);
        assert_eq!(count_from_probe(&empty), 0);
        assert_eq!(count_from_probe(&malformed), 1);
    }

    #[tokio::test]
    async fn resolve_count_returns_zero_on_request_failure()
    {
        let mut repository = FakeRepository::succeeding(10, &[],);
        repository.probe = Err("409 Git Repository is empty".to_owned(),);
        let source = FakeSource::default().with_repository("empty", repository,);

        let count = resolve_count(&source, &RepositoryRef::new("octocat", "empty", "main",),).await;
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn resolve_count_reads_probe()
    {
        let source =
            FakeSource::default().with_repository("busy", FakeRepository::succeeding(42, &[],),);

        let count = resolve_count(&source, &RepositoryRef::new("octocat", "busy", "main",),).await;
        assert_eq!(count, 42);
    }

    #[tokio::test]
    async fn contributions_count_matches_login_case_insensitively()
    {
        let mut repository = FakeRepository::succeeding(0, &[],);
        repository.contributors = Ok(vec![
            Contribution {
                login: "OctoCat".to_owned(), contributions: 12,
            },
            Contribution {
                login: "hubot".to_owned(), contributions: 30,
            },
        ],);
        let source = FakeSource::default().with_repository("shared", repository,);
        let reference = RepositoryRef::new("octocat", "shared", "main",);

        let count = resolve_commits(&source, &reference, CommitSource::Contributors, "octocat",)
            .await
            .expect("contributors succeed",);
        assert_eq!(count, 12);

        let missing = try_contributions_count(&source, &reference, "someone-else",)
            .await
            .expect("contributors succeed",);
        assert_eq!(missing, 0);
    }

    #[tokio::test]
    async fn contributions_count_reads_every_contributor_page()
    {
        let mut repository = FakeRepository::succeeding(0, &[],);
        repository.contributors = Ok((0..5)
            .map(|index| Contribution {
                login: format!("bot-{index}"), contributions: 100,
            },)
            .chain([Contribution {
                login: "octocat".to_owned(), contributions: 7,
            },],)
            .collect(),);
        let source = FakeSource::default().with_repository("popular", repository,);
        let reference = RepositoryRef::new("octocat", "popular", "main",);

        let count = contributions_count_paged(&source, &reference, "octocat", 2,)
            .await
            .expect("contributors succeed",);

        assert_eq!(count, 7);
        assert_eq!(source.contributor_calls(), 3);
    }

    #[tokio::test]
    async fn contributions_count_propagates_page_failure()
    {
        let mut repository = FakeRepository::succeeding(0, &[],);
        repository.contributors = Err("403 rate limited".to_owned(),);
        let source = FakeSource::default().with_repository("limited", repository,);

        let result = try_contributions_count(
            &source,
            &RepositoryRef::new("octocat", "limited", "main",),
            "octocat",
        )
        .await;
        assert!(matches!(result, Err(Error::Service { .. })));
    }
}
