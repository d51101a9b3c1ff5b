// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Paginated retrieval of collection resources.
//!
//! Pages are requested sequentially starting at page 1. Retrieval stops on
//! the first page that holds fewer items than requested, or earlier when the
//! response metadata already marks the page as the last one.

use std::future::Future;

use tracing::{debug, info};

use crate::{
    error::Error,
    model::{ListedRepository, PageResponse},
    retry::{RetryConfig, retry_with_backoff},
    source::{RepositoryListing, StatsSource},
};

/// Largest page size accepted by the GitHub REST API.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Collects every item of a paginated collection.
///
/// `fetch_page` receives the 1-based page index and returns the page
/// contents. There is no upper bound on the number of pages.
///
/// # Errors
///
/// Returns [`Error::Validation`](Error::Validation) when `page_size` is zero
/// and propagates the first error returned by `fetch_page`.
///
/// # Example
///
/// ```
/// use profile_stats::{PageResponse, fetch_all_pages};
///
/// # async fn example() -> Result<(), profile_stats::Error> {
/// let items = fetch_all_pages(2, |page| async move {
///     let items = if page == 1 { vec![1, 2] } else { vec![3] };
///     Ok(PageResponse {
///         items,
///         next_page: None,
///         is_last_page: false,
///     })
/// })
/// .await?;
/// assert_eq!(items, vec![1, 2, 3]);
/// # Ok(())
/// # }
/// ```
pub async fn fetch_all_pages<T, F, Fut,>(page_size: u32, mut fetch_page: F,) -> Result<Vec<T,>, Error,>
where
    F: FnMut(u32,) -> Fut,
    Fut: Future<Output = Result<PageResponse<T,>, Error,>,>,
{
    if page_size == 0 {
        return Err(Error::validation("page size must be greater than zero",),);
    }

    let mut items = Vec::new();
    let mut page = 1u32;

    loop {
        let response = fetch_page(page,).await?;
        let received = response.items.len();
        items.extend(response.items,);
        debug!(page, received, "fetched page");

        if received < page_size as usize || response.is_last_page {
            break;
        }

        page = page
            .checked_add(1,)
            .ok_or_else(|| Error::service("pagination exceeded the page index range",),)?;
    }

    Ok(items,)
}

/// Lists every repository of `listing`, retrying individual pages.
///
/// # Errors
///
/// Returns the last error reported for a page once its retries are
/// exhausted. A failed listing is fatal for the run.
pub async fn list_repositories<C: StatsSource,>(
    source: &C,
    listing: &RepositoryListing,
    page_size: u32,
    retry: &RetryConfig,
) -> Result<Vec<ListedRepository,>, Error,>
{
    info!("Listing {}", listing.describe());

    let repositories = fetch_all_pages(page_size, |page| async move {
        let operation = format!("repository listing page {page}");
        retry_with_backoff(retry, &operation, || source.repositories_page(listing, page, page_size,),)
            .await
    },)
    .await?;

    info!("Found {} repositories", repositories.len());
    Ok(repositories,)
}
