use tracing::debug;

use crate::{
    art::{ArtProviderId, ArtworkProvider},
    error::LabError,
    model::SearchPage,
};

use super::PageState;

/// Pagination position for one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor {
    pub query: String,
    /// 1-based, always within `[1, max(total_pages, 1)]` after a fetch.
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl PageCursor {
    /// Fresh cursor at page 1. `total_pages` is unknown until the first response.
    pub fn new(query: impl Into<String>, limit: u32) -> Self {
        Self { query: query.into(), page: 1, limit, total_pages: 1 }
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    fn at(&self, page: u32) -> Self {
        Self { page: clamp_page(page, self.total_pages), ..self.clone() }
    }
}

fn clamp_page(page: u32, total_pages: u32) -> u32 {
    page.clamp(1, total_pages.max(1))
}

/// Fetch the page `cursor` points at and return the cursor updated from the response.
///
/// The response's total always replaces the remembered one. If the requested page is
/// past the new total, the last page is fetched instead.
pub async fn fetch_page(
    provider: &dyn ArtworkProvider,
    cursor: PageCursor,
) -> Result<(SearchPage, PageCursor), LabError> {
    let mut result = provider.search(&cursor.query, cursor.page, cursor.limit).await?;
    let mut page = clamp_page(cursor.page, result.total_pages);

    if page != cursor.page {
        debug!(requested = cursor.page, page, "page out of range, refetching");
        result = provider.search(&cursor.query, page, cursor.limit).await?;
        page = clamp_page(page, result.total_pages);
    }

    let updated = PageCursor { page, total_pages: result.total_pages, ..cursor };
    Ok((result, updated))
}

#[derive(Debug)]
pub struct ArtController {
    provider: Box<dyn ArtworkProvider>,
    cursor: Option<PageCursor>,
    state: PageState<SearchPage>,
}

impl ArtController {
    pub fn new(provider: Box<dyn ArtworkProvider>) -> Self {
        Self { provider, cursor: None, state: PageState::Idle }
    }

    pub fn provider_id(&self) -> ArtProviderId {
        self.provider.id()
    }

    pub fn set_provider(&mut self, provider: Box<dyn ArtworkProvider>) {
        self.provider = provider;
        self.cursor = None;
        self.state = PageState::Idle;
    }

    pub fn state(&self) -> &PageState<SearchPage> {
        &self.state
    }

    pub fn cursor(&self) -> Option<&PageCursor> {
        self.cursor.as_ref()
    }

    pub fn can_prev(&self) -> bool {
        self.cursor.as_ref().is_some_and(PageCursor::has_prev)
    }

    pub fn can_next(&self) -> bool {
        self.cursor.as_ref().is_some_and(PageCursor::has_next)
    }

    /// New query: always starts over at page 1.
    pub async fn search(&mut self, keyword: &str, limit: u32) -> &PageState<SearchPage> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            self.state = PageState::Failed(
                LabError::invalid_input("Please enter a keyword.").user_message(),
            );
            return &self.state;
        }

        // A previous query's cursor must not survive a new search, even a failed one.
        self.cursor = None;
        self.load(PageCursor::new(keyword, limit)).await
    }

    /// No-op returning `false` when already on the last known page.
    pub async fn next(&mut self) -> bool {
        let Some(target) = self.cursor.as_ref().filter(|c| c.has_next()).map(|c| c.at(c.page + 1))
        else {
            return false;
        };
        self.load(target).await;
        true
    }

    /// No-op returning `false` on page 1.
    pub async fn prev(&mut self) -> bool {
        let Some(target) = self.cursor.as_ref().filter(|c| c.has_prev()).map(|c| c.at(c.page - 1))
        else {
            return false;
        };
        self.load(target).await;
        true
    }

    async fn load(&mut self, target: PageCursor) -> &PageState<SearchPage> {
        let result = match fetch_page(&*self.provider, target).await {
            Ok((page, cursor)) => {
                self.cursor = Some(cursor);
                Ok(page)
            }
            Err(e) => Err(e),
        };

        self.state = PageState::from_result("art", result);
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ArtworkRecord;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Serves `totals[query]` pages per query and records every request.
    #[derive(Debug, Default)]
    struct FakeProvider {
        totals: Vec<(&'static str, u32)>,
        fail_pages: Vec<u32>,
        calls: Mutex<Vec<(String, u32, u32)>>,
    }

    impl FakeProvider {
        fn with_totals(totals: Vec<(&'static str, u32)>) -> Self {
            Self { totals, ..Self::default() }
        }

        fn calls(&self) -> Vec<(String, u32, u32)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ArtworkProvider for FakeProvider {
        fn id(&self) -> ArtProviderId {
            ArtProviderId::Artic
        }

        async fn search(&self, keyword: &str, page: u32, limit: u32) -> Result<SearchPage, LabError> {
            self.calls.lock().unwrap().push((keyword.to_string(), page, limit));
            if self.fail_pages.contains(&page) {
                return Err(LabError::remote("boom"));
            }

            let total_pages = self.totals.iter().find(|(q, _)| *q == keyword).map_or(0, |(_, t)| *t);
            let records = if page <= total_pages {
                vec![ArtworkRecord {
                    title: format!("{keyword} #{page}"),
                    artist: "Unknown".into(),
                    date_display: String::new(),
                    image_id: None,
                    image_url: None,
                }]
            } else {
                Vec::new()
            };

            Ok(SearchPage { records, current_page: page, total_pages, total: u64::from(total_pages) })
        }
    }

    // The controller boxes its provider, so tests share one through a thin wrapper.
    #[derive(Debug)]
    struct Shared(std::sync::Arc<FakeProvider>);

    #[async_trait]
    impl ArtworkProvider for Shared {
        fn id(&self) -> ArtProviderId {
            self.0.id()
        }

        async fn search(&self, keyword: &str, page: u32, limit: u32) -> Result<SearchPage, LabError> {
            self.0.search(keyword, page, limit).await
        }
    }

    fn controller(fake: FakeProvider) -> (ArtController, std::sync::Arc<FakeProvider>) {
        let fake = std::sync::Arc::new(fake);
        (ArtController::new(Box::new(Shared(fake.clone()))), fake)
    }

    #[tokio::test]
    async fn search_starts_at_page_one_and_remembers_total() {
        let (mut ctl, fake) = controller(FakeProvider::with_totals(vec![("cats", 3)]));

        let state = ctl.search("cats", 12).await;
        assert_eq!(state.loaded().unwrap().records[0].title, "cats #1");

        let cursor = ctl.cursor().unwrap();
        assert_eq!((cursor.page, cursor.total_pages, cursor.limit), (1, 3, 12));
        assert!(!ctl.can_prev());
        assert!(ctl.can_next());
        assert_eq!(fake.calls(), vec![("cats".to_string(), 1, 12)]);
    }

    #[tokio::test]
    async fn prev_on_first_page_is_a_no_op() {
        let (mut ctl, fake) = controller(FakeProvider::with_totals(vec![("cats", 3)]));
        ctl.search("cats", 6).await;

        assert!(!ctl.prev().await);
        assert_eq!(ctl.cursor().unwrap().page, 1);
        assert_eq!(fake.calls().len(), 1);
    }

    #[tokio::test]
    async fn next_on_last_page_is_a_no_op() {
        let (mut ctl, fake) = controller(FakeProvider::with_totals(vec![("cats", 2)]));
        ctl.search("cats", 6).await;

        assert!(ctl.next().await);
        assert_eq!(ctl.cursor().unwrap().page, 2);
        assert!(!ctl.can_next());

        assert!(!ctl.next().await);
        assert_eq!(ctl.cursor().unwrap().page, 2);
        assert_eq!(fake.calls().len(), 2);

        assert!(ctl.prev().await);
        assert_eq!(ctl.cursor().unwrap().page, 1);
    }

    #[tokio::test]
    async fn zero_matches_loads_an_empty_page() {
        let (mut ctl, _) = controller(FakeProvider::default());

        let state = ctl.search("qwzxv", 12).await;
        let page = state.loaded().expect("empty results are not an error");
        assert!(page.is_empty());
        assert!(page.total_pages <= 1);
        assert!(!ctl.can_next());
        assert!(!ctl.can_prev());
    }

    #[tokio::test]
    async fn new_search_replaces_stale_total_pages() {
        let (mut ctl, _) = controller(FakeProvider::with_totals(vec![("cats", 5), ("dogs", 1)]));

        ctl.search("cats", 12).await;
        ctl.next().await;
        assert_eq!(ctl.cursor().unwrap().page, 2);

        ctl.search("dogs", 12).await;
        let cursor = ctl.cursor().unwrap();
        assert_eq!(cursor.query, "dogs");
        assert_eq!((cursor.page, cursor.total_pages), (1, 1));
        assert!(!ctl.can_next());
    }

    #[tokio::test]
    async fn shrunken_total_clamps_to_last_page() {
        let fake = FakeProvider::with_totals(vec![("cats", 2)]);
        let cursor = PageCursor { query: "cats".into(), page: 4, limit: 12, total_pages: 5 };

        let (page, updated) = fetch_page(&fake, cursor).await.unwrap();

        assert_eq!((updated.page, updated.total_pages), (2, 2));
        assert_eq!(page.records[0].title, "cats #2");
        assert_eq!(fake.calls().iter().map(|c| c.1).collect::<Vec<_>>(), vec![4, 2]);
    }

    #[tokio::test]
    async fn failed_page_keeps_previous_cursor() {
        let fake = FakeProvider { fail_pages: vec![2], ..FakeProvider::with_totals(vec![("cats", 3)]) };
        let (mut ctl, _) = controller(fake);
        ctl.search("cats", 12).await;

        assert!(ctl.next().await);

        assert_eq!(ctl.state().failure(), Some("Request failed: boom"));
        assert_eq!(ctl.cursor().unwrap().page, 1);
        assert!(ctl.can_next());
    }

    #[tokio::test]
    async fn blank_keyword_fails_without_request() {
        let (mut ctl, fake) = controller(FakeProvider::default());

        let state = ctl.search("   ", 12).await;
        assert_eq!(state.failure(), Some("Please enter a keyword."));
        assert!(fake.calls().is_empty());
    }
}
