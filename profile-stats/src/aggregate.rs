// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Account-wide aggregation of per-repository statistics.
///
/// Each repository is processed as an independent unit of work whose
/// failure is captured in its [`RepositoryOutcome`]. Outcomes are reduced on
/// a single task in input order, so concurrency never affects the totals.
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::{
    count::{CommitSource, resolve_commits},
    model::{AggregateStats, ListedRepository, RepositoryOutcome, RepositoryRef, RepositoryStats},
    source::StatsSource,
};

/// Tunables controlling how repositories are processed.
#[derive(Debug, Clone,)]
pub struct AggregateOptions
{
    /// Maximum number of repositories processed concurrently.
    pub concurrency:   usize,
    /// Strategy used to count commits.
    pub commit_source: CommitSource,
    /// Account login used by the contributors strategy.
    pub login:         String,
    /// Draw a progress bar on stderr.
    pub show_progress: bool,
}

impl Default for AggregateOptions
{
    fn default() -> Self
    {
        Self {
            concurrency:   1,
            commit_source: CommitSource::Pagination,
            login:         String::new(),
            show_progress: false,
        }
    }
}

/// Drops forks and archived repositories unless explicitly included.
pub fn select_repositories(
    listed: Vec<ListedRepository,>,
    include_forks: bool,
    include_archived: bool,
) -> Vec<RepositoryRef,>
{
    listed
        .into_iter()
        .filter(|entry| include_forks || !entry.fork,)
        .filter(|entry| include_archived || !entry.archived,)
        .map(|entry| entry.repository,)
        .collect()
}

/// Fetches languages and the commit total of one repository.
///
/// Any failure makes the whole repository fail; partial results are
/// discarded.
pub async fn process_repository<C: StatsSource,>(
    source: &C,
    repository: &RepositoryRef,
    options: &AggregateOptions,
) -> RepositoryOutcome
{
    let result = async {
        let languages = source.languages(repository,).await?;
        let commits =
            resolve_commits(source, repository, options.commit_source, &options.login,).await?;
        Ok::<_, crate::Error,>(RepositoryStats {
            languages,
            commits,
        },)
    }
    .await
    .map_err(|error| error.to_display_string(),);

    if let Err(reason,) = &result {
        warn!("skipping {}: {}", repository, reason);
    }

    RepositoryOutcome {
        repository: repository.clone(),
        result,
    }
}

/// Reduces outcomes into account-wide totals.
pub fn fold_outcomes<'a,>(outcomes: impl IntoIterator<Item = &'a RepositoryOutcome,>,) -> AggregateStats
{
    outcomes.into_iter().fold(AggregateStats::default(), |mut stats, outcome| {
        stats.absorb(outcome,);
        stats
    },)
}

/// Aggregates statistics across `repositories`.
///
/// A failing repository contributes nothing and never aborts the batch.
///
/// # Example
///
/// ```no_run
/// use profile_stats::{AggregateOptions, GitHubClient, RepositoryRef, aggregate};
///
/// # async fn example() -> Result<(), profile_stats::Error> {
/// let client = GitHubClient::new("ghp_token")?;
/// let repositories = vec![RepositoryRef::new("octocat", "hello-world", "master")];
/// let stats = aggregate(&client, &repositories, &AggregateOptions::default()).await;
/// println!("{} commits", stats.total_commits);
/// # Ok(())
/// # }
/// ```
pub async fn aggregate<C: StatsSource,>(
    source: &C,
    repositories: &[RepositoryRef],
    options: &AggregateOptions,
) -> AggregateStats
{
    let progress = progress_bar(repositories.len(), options.show_progress,);

    let outcomes: Vec<RepositoryOutcome,> = stream::iter(repositories,)
        .map(|repository| process_repository(source, repository, options,),)
        .buffered(options.concurrency.max(1,),)
        .inspect(|outcome| {
            progress.set_message(outcome.repository.to_string(),);
            progress.inc(1,);
        },)
        .collect()
        .await;

    progress.finish_and_clear();

    let stats = fold_outcomes(&outcomes,);
    info!(
        "Aggregated {} repositories ({} skipped): {} commits across {} languages",
        stats.processed,
        stats.failed,
        stats.total_commits,
        stats.language_bytes.len()
    );
    stats
}

fn progress_bar(length: usize, visible: bool,) -> ProgressBar
{
    if !visible {
        return ProgressBar::hidden();
    }

    let progress = ProgressBar::new(length as u64,);
    if let Ok(style,) =
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {bar:30.cyan/blue} {pos}/{len} {msg}",)
    {
        progress.set_style(style,);
    }
    progress
}

#[cfg(test)]
mod tests
{
    use proptest::prelude::*;

    use super::*;
    use crate::{
        model::LanguageByteMap,
        source::testing::{FakeRepository, FakeSource, listed},
    };

    fn abc_source() -> FakeSource
    {
        let mut broken = FakeRepository::succeeding(7, &[("X", 999,),],);
        broken.languages = Err("500 Internal Server Error".to_owned(),);

        FakeSource::default()
            .with_repository("a", FakeRepository::succeeding(10, &[("X", 100,),],),)
            .with_repository("b", broken,)
            .with_repository("c", FakeRepository::succeeding(5, &[("X", 50,), ("Y", 20,),],),)
    }

    fn refs(names: &[&str],) -> Vec<RepositoryRef,>
    {
        names.iter().map(|name| RepositoryRef::new("octocat", *name, "main",),).collect()
    }

    #[tokio::test]
    async fn failing_repository_contributes_nothing()
    {
        let source = abc_source();
        let stats = aggregate(&source, &refs(&["a", "b", "c"],), &AggregateOptions::default(),).await;

        assert_eq!(stats.total_commits, 15);
        let expected: LanguageByteMap = [("X", 150,), ("Y", 20,),].into_iter().collect();
        assert_eq!(stats.language_bytes, expected);
        assert_eq!(stats.processed, 2);
        assert_eq!(stats.failed, 1);
    }

    #[tokio::test]
    async fn commit_failure_discards_language_bytes_too()
    {
        let mut broken = FakeRepository::succeeding(3, &[("Z", 40,),],);
        broken.probe = Err("timeout".to_owned(),);
        let source = FakeSource::default()
            .with_repository("a", FakeRepository::succeeding(10, &[("X", 100,),],),)
            .with_repository("z", broken,);

        let stats = aggregate(&source, &refs(&["a", "z"],), &AggregateOptions::default(),).await;

        assert_eq!(stats.total_commits, 10);
        assert_eq!(stats.language_bytes.get("Z"), None);
    }

    #[tokio::test]
    async fn processing_order_does_not_change_totals()
    {
        let source = abc_source();
        let options = AggregateOptions {
            concurrency: 3, ..AggregateOptions::default()
        };

        let forward = aggregate(&source, &refs(&["a", "b", "c"],), &options,).await;
        let rotated = aggregate(&source, &refs(&["c", "a", "b"],), &options,).await;

        assert_eq!(forward, rotated);
    }

    #[tokio::test]
    async fn concurrent_processing_matches_sequential()
    {
        let source = abc_source();
        let sequential = aggregate(&source, &refs(&["a", "b", "c"],), &AggregateOptions::default(),).await;
        let concurrent = aggregate(
            &source,
            &refs(&["a", "b", "c"],),
            &AggregateOptions {
                concurrency: 8, ..AggregateOptions::default()
            },
        )
        .await;

        assert_eq!(sequential, concurrent);
    }

    #[tokio::test]
    async fn unknown_repository_is_contained()
    {
        let source = abc_source();
        let stats = aggregate(&source, &refs(&["missing", "a"],), &AggregateOptions::default(),).await;

        assert_eq!(stats.total_commits, 10);
        assert_eq!(stats.failed, 1);
    }

    #[tokio::test]
    async fn process_repository_reports_failure_reason()
    {
        let source = abc_source();
        let outcome = process_repository(
            &source,
            &RepositoryRef::new("octocat", "b", "main",),
            &AggregateOptions::default(),
        )
        .await;

        let reason = outcome.result.expect_err("b fails",);
        assert!(reason.contains("500 Internal Server Error"));
    }

    #[test]
    fn select_repositories_filters_forks_and_archives()
    {
        let entries = vec![
            listed("own", false, false,),
            listed("fork", true, false,),
            listed("old", false, true,),
        ];

        let names = |selected: Vec<RepositoryRef,>| -> Vec<String,> {
            selected.into_iter().map(|repository| repository.name,).collect()
        };

        assert_eq!(names(select_repositories(entries.clone(), false, false,)), vec!["own"]);
        assert_eq!(names(select_repositories(entries.clone(), true, false,)), vec!["own", "fork"]);
        assert_eq!(names(select_repositories(entries, true, true,)), vec!["own", "fork", "old"]);
    }

    fn outcome(name: String, commits: u64, languages: Vec<(String, u64,),>, ok: bool,) -> RepositoryOutcome
    {
        RepositoryOutcome {
            repository: RepositoryRef::new("octocat", name, "main",),
            result:     if ok {
                Ok(RepositoryStats {
                    languages: languages.into_iter().collect(),
                    commits,
                },)
            } else {
                Err("failed".to_owned(),)
            },
        }
    }

    proptest! {
        #[test]
        fn fold_is_order_independent(
            entries in proptest::collection::vec(
                (
                    0u64..10_000,
                    proptest::collection::vec(("[A-E]", 0u64..1_000_000), 0..4),
                    any::<bool>(),
                ),
                0..12,
            ),
            seed in any::<u64>(),
        ) {
            let outcomes: Vec<RepositoryOutcome> = entries
                .into_iter()
                .enumerate()
                .map(|(index, (commits, languages, ok))| outcome(format!("r{index}"), commits, languages, ok))
                .collect();

            let mut shuffled = outcomes.clone();
            let len = shuffled.len().max(1);
            shuffled.rotate_left(seed as usize % len);
            shuffled.reverse();

            prop_assert_eq!(fold_outcomes(&outcomes), fold_outcomes(&shuffled));
        }
    }
}
