//! Paginated discovery of candidate files.

use crate::errors::GoogleDriveResult;
use crate::pagination::{Page, PageIterator};
use crate::remote::RemoteFileService;
use crate::types::DriveFile;
use tracing::{debug, info, warn};

/// Files requested per listing page.
pub const PAGE_SIZE: u32 = 1000;

/// Pages fetched at most unless configured otherwise.
pub const DEFAULT_PAGE_CEILING: usize = 10;

/// Lists every file matching `query`, up to `page_ceiling` pages.
///
/// Stops at the first page without a continuation token, the first empty
/// page, or the ceiling. A failed page aborts the whole listing.
pub async fn discover_files<S>(
    service: &S,
    query: &str,
    page_ceiling: usize,
) -> GoogleDriveResult<Vec<DriveFile>>
where
    S: RemoteFileService + ?Sized,
{
    let mut pages = PageIterator::new(|token: Option<String>| {
        let page = service.list(query, PAGE_SIZE, token);
        async move { page.await.map(Page::<DriveFile>::from) }
    })
    .with_max_pages(page_ceiling);

    let mut files = Vec::new();
    let mut truncated = false;
    while let Some(page) = pages.next_page().await? {
        debug!(
            page = pages.pages_fetched(),
            files = page.len(),
            "Fetched listing page"
        );
        if page.incomplete_search {
            warn!("Provider reported an incomplete search");
        }
        truncated = page.has_next() && !page.is_empty();
        files.extend(page.items);
    }

    if truncated {
        warn!(
            page_ceiling,
            files = files.len(),
            "Page ceiling reached, more files may match"
        );
    }
    info!(
        files = files.len(),
        pages = pages.pages_fetched(),
        "Discovery complete"
    );

    Ok(files)
}
