// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Aggregates GitHub account statistics into a README section and an SVG
//! language card.
//!
//! The pipeline lists an account's repositories page by page, resolves each
//! repository's default-branch commit count and language byte distribution,
//! folds the per-repository outcomes into account-wide totals and renders
//! them. Failures of individual repositories are contained; only a failed
//! listing or an output error aborts a run.
//!
//! Every network-facing step is generic over [`StatsSource`], with
//! [`GitHubClient`] as the production implementation.

mod aggregate;
mod config;
mod count;
mod error;
mod fetch;
mod github;
mod model;
mod output;
mod pipeline;
mod render;
mod retry;
mod section;
mod source;

pub use aggregate::{AggregateOptions, aggregate, fold_outcomes, process_repository, select_repositories};
pub use config::{
    DEFAULT_ACCOUNT, DEFAULT_AFFILIATION, DEFAULT_CONCURRENCY, DEFAULT_README, DEFAULT_SVG,
    ListingScope, Overrides, Settings, SettingsFile,
};
pub use count::{
    CommitSource, count_from_probe, parse_last_page, parse_link_page, resolve_commits, resolve_count,
    try_contributions_count, try_resolve_count,
};
pub use error::{Error, io_error};
pub use fetch::{MAX_PAGE_SIZE, fetch_all_pages, list_repositories};
pub use github::{CLIENT_IDENTIFIER, GitHubClient};
pub use model::{
    AggregateStats, LanguageByteMap, LanguageBytes, ListedRepository, PageResponse, RepositoryOutcome,
    RepositoryRef, RepositoryStats,
};
pub use output::{OutputPaths, OutputReport, write_outputs};
pub use pipeline::{collect_stats, publish, run};
pub use render::{
    BAR_MAX_WIDTH, CARD_WIDTH, DEFAULT_COLOR, FOOTER_SPACE, LINE_HEIGHT, LanguageRow, PADDING_TOP,
    RenderOptions, RenderedArtifact, canvas_height, format_thousands, language_color, language_rows, render,
    render_with,
};
pub use retry::{RetryConfig, retry_with_backoff};
pub use section::{SECTION_END_MARKER, SECTION_START_MARKER, update_section};
pub use source::{CommitProbe, Contribution, RepositoryListing, StatsSource, Visibility};
