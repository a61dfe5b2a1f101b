//! Pagination handling for Google Drive API.
//!
//! This module provides utilities for handling cursor-based pagination using
//! `nextPageToken` from Google Drive API responses.

use crate::errors::GoogleDriveResult;
use crate::types::{DriveFile, FileList};
use std::marker::PhantomData;

/// A page of results from Google Drive API.
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// The items in this page.
    pub items: Vec<T>,
    /// Token for the next page (cursor-based pagination).
    pub next_page_token: Option<String>,
    /// Indicates if the search was incomplete (for file lists).
    pub incomplete_search: bool,
}

impl<T> Page<T> {
    /// Creates a new page.
    pub fn new(items: Vec<T>, next_page_token: Option<String>) -> Self {
        Self {
            items,
            next_page_token,
            incomplete_search: false,
        }
    }

    /// Returns true if there is a next page.
    pub fn has_next(&self) -> bool {
        self.next_page_token.is_some()
    }

    /// Returns the number of items in this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if this page is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<FileList> for Page<DriveFile> {
    fn from(list: FileList) -> Self {
        Self {
            items: list.files,
            next_page_token: list.next_page_token,
            incomplete_search: list.incomplete_search,
        }
    }
}

/// Iterator over pages fetched through a closure.
///
/// Stops after a page without a continuation token, after an empty page, or
/// once `max_pages` pages have been fetched, whichever comes first.
pub struct PageIterator<T, F, Fut>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: std::future::Future<Output = GoogleDriveResult<Page<T>>>,
{
    fetch_fn: F,
    next_token: Option<String>,
    max_pages: Option<usize>,
    pages_fetched: usize,
    done: bool,
    _marker: PhantomData<T>,
}

impl<T, F, Fut> PageIterator<T, F, Fut>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: std::future::Future<Output = GoogleDriveResult<Page<T>>>,
{
    /// Creates a new page iterator.
    pub fn new(fetch_fn: F) -> Self {
        Self {
            fetch_fn,
            next_token: None,
            max_pages: None,
            pages_fetched: 0,
            done: false,
            _marker: PhantomData,
        }
    }

    /// Caps the number of pages fetched.
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    /// Fetches the next page of results.
    pub async fn next_page(&mut self) -> GoogleDriveResult<Option<Page<T>>> {
        if !self.has_next() {
            return Ok(None);
        }

        let page = (self.fetch_fn)(self.next_token.take()).await?;
        self.pages_fetched += 1;

        match &page.next_page_token {
            Some(token) if !page.is_empty() => self.next_token = Some(token.clone()),
            _ => self.done = true,
        }

        Ok(Some(page))
    }

    /// Collects all remaining items from all pages.
    pub async fn collect_all(&mut self) -> GoogleDriveResult<Vec<T>> {
        let mut all_items = Vec::new();

        while let Some(page) = self.next_page().await? {
            all_items.extend(page.items);
        }

        Ok(all_items)
    }

    /// Returns true if there are more pages to fetch.
    pub fn has_next(&self) -> bool {
        !self.done && self.max_pages.map_or(true, |max| self.pages_fetched < max)
    }

    /// Number of pages fetched so far.
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn scripted(
        pages: Vec<Page<u32>>,
    ) -> (
        Arc<Mutex<Vec<Option<String>>>>,
        impl FnMut(Option<String>) -> std::future::Ready<GoogleDriveResult<Page<u32>>>,
    ) {
        let tokens = Arc::new(Mutex::new(Vec::new()));
        let seen = tokens.clone();
        let mut pages = pages.into_iter();
        let fetch = move |token: Option<String>| {
            seen.lock().unwrap().push(token);
            let page = pages
                .next()
                .unwrap_or_else(|| Page::new(vec![0], Some("more".to_string())));
            std::future::ready(Ok(page))
        };
        (tokens, fetch)
    }

    #[test]
    fn test_page_creation() {
        let page = Page::new(vec![1, 2, 3], Some("token".to_string()));
        assert_eq!(page.len(), 3);
        assert!(page.has_next());
        assert!(!page.is_empty());
    }

    #[test]
    fn test_page_from_file_list() {
        let list = FileList {
            next_page_token: Some("t".to_string()),
            incomplete_search: true,
            files: vec![DriveFile::new("1", "a")],
        };
        let page = Page::from(list);
        assert_eq!(page.len(), 1);
        assert!(page.incomplete_search);
        assert_eq!(page.next_page_token.as_deref(), Some("t"));
    }

    #[tokio::test]
    async fn test_page_iterator_follows_tokens() {
        let (tokens, fetch) = scripted(vec![
            Page::new(vec![1, 2, 3], Some("token1".to_string())),
            Page::new(vec![4, 5, 6], Some("token2".to_string())),
            Page::new(vec![7, 8, 9], None),
        ]);

        let mut iterator = PageIterator::new(fetch);
        let all_items = iterator.collect_all().await.unwrap();

        assert_eq!(all_items, vec![1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(
            *tokens.lock().unwrap(),
            vec![None, Some("token1".to_string()), Some("token2".to_string())]
        );
        assert!(!iterator.has_next());
    }

    #[tokio::test]
    async fn test_page_iterator_stops_on_empty_page() {
        let (tokens, fetch) = scripted(vec![
            Page::new(vec![1], Some("token1".to_string())),
            Page::new(vec![], Some("token2".to_string())),
        ]);

        let all_items = PageIterator::new(fetch).collect_all().await.unwrap();

        assert_eq!(all_items, vec![1]);
        assert_eq!(tokens.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_page_iterator_respects_max_pages() {
        // The script runs out and keeps serving full pages with a cursor.
        let (tokens, fetch) = scripted(Vec::new());

        let mut iterator = PageIterator::new(fetch).with_max_pages(3);
        let all_items = iterator.collect_all().await.unwrap();

        assert_eq!(all_items.len(), 3);
        assert_eq!(iterator.pages_fetched(), 3);
        assert_eq!(tokens.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_page_iterator_zero_max_pages_fetches_nothing() {
        let (tokens, fetch) = scripted(Vec::new());

        let all_items = PageIterator::new(fetch).with_max_pages(0).collect_all().await.unwrap();

        assert!(all_items.is_empty());
        assert!(tokens.lock().unwrap().is_empty());
    }
}
