// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! End-to-end run: list, select, aggregate, render, write.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::{
    aggregate::{aggregate, select_repositories},
    config::Settings,
    error::Error,
    fetch::{MAX_PAGE_SIZE, list_repositories},
    model::AggregateStats,
    output::{OutputPaths, OutputReport, write_outputs},
    render::{RenderedArtifact, render_with},
    retry::RetryConfig,
    source::StatsSource,
};

/// Lists the configured repositories and aggregates their statistics.
///
/// # Errors
///
/// Fails only when the repository listing cannot be retrieved; failures of
/// individual repositories are folded into [`AggregateStats::failed`].
pub async fn collect_stats<C: StatsSource,>(
    source: &C,
    settings: &Settings,
    retry: &RetryConfig,
) -> Result<AggregateStats, Error,>
{
    let listed = list_repositories(source, &settings.listing, MAX_PAGE_SIZE, retry,).await?;
    let total = listed.len();
    let selected = select_repositories(listed, settings.include_forks, settings.include_archived,);
    if selected.len() < total {
        info!("Excluded {} forked or archived repositories", total - selected.len());
    }

    Ok(aggregate(source, &selected, &settings.aggregate_options(),).await,)
}

/// Renders `stats` and writes every configured output.
///
/// # Errors
///
/// Propagates file system and serialization errors from
/// [`write_outputs`].
pub fn publish(
    settings: &Settings,
    stats: &AggregateStats,
    generated_at: DateTime<Utc,>,
) -> Result<(RenderedArtifact, OutputReport,), Error,>
{
    let artifact = render_with(stats, generated_at, &settings.render_options(),);
    let report = write_outputs(&OutputPaths::from(settings,), &artifact, stats, generated_at,)?;
    Ok((artifact, report,),)
}

/// Runs the whole pipeline against `source`.
///
/// Outputs are only written once aggregation has finished.
///
/// # Errors
///
/// Returns the listing error or the first output error.
pub async fn run<C: StatsSource,>(
    source: &C,
    settings: &Settings,
    retry: &RetryConfig,
    generated_at: DateTime<Utc,>,
) -> Result<OutputReport, Error,>
{
    let stats = collect_stats(source, settings, retry,).await?;
    let (_, report,) = publish(settings, &stats, generated_at,)?;
    Ok(report,)
}
