//! End-to-end paging: first page on start, scroll to the bottom, short
//! second page exhausts the feed, then edits and deletes reach storage.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::tempdir;

use cooking_list::api::RecipeApi;
use cooking_list::error::FetchError;
use cooking_list::feed::RecipeFeed;
use cooking_list::list::FETCH_ERROR_PREFIX;
use cooking_list::pagination::PageRequest;
use cooking_list::recipe::Recipe;
use cooking_list::scroll::{ScrollListener, SCROLL_DEBOUNCE};
use cooking_list::storage::{load_recipes, SqliteStorage};
use cooking_list::view;

struct ScriptedApi {
    pages: Mutex<VecDeque<Result<Vec<Recipe>, FetchError>>>,
    offsets: Mutex<Vec<usize>>,
}

impl ScriptedApi {
    fn new(pages: Vec<Result<Vec<Recipe>, FetchError>>) -> Arc<Self> {
        Arc::new(ScriptedApi {
            pages: Mutex::new(pages.into()),
            offsets: Mutex::new(Vec::new()),
        })
    }

    fn offsets(&self) -> Vec<usize> {
        self.offsets.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecipeApi for ScriptedApi {
    async fn fetch_page(&self, request: PageRequest) -> Result<Vec<Recipe>, FetchError> {
        self.offsets.lock().unwrap().push(request.offset());
        tokio::time::sleep(Duration::from_millis(30)).await;
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected request")
    }
}

fn page(ids: std::ops::Range<i64>) -> Vec<Recipe> {
    ids.map(|id| Recipe {
        id,
        title: format!("Recipe {}", id),
        image: format!("https://img.example/{}.jpg", id),
    })
    .collect()
}

async fn settle(duration: Duration) {
    tokio::time::sleep(duration).await;
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

fn scroll_to_bottom(feed: &RecipeFeed, listener: &ScrollListener) {
    let total = feed.with_list(|list| list.len());
    let first_row = view::scroll_rows(0, total, true);
    listener.on_scroll(view::scroll_position(first_row, total));
}

#[tokio::test(start_paused = true)]
async fn scroll_loads_until_short_page() {
    let dir = tempdir().expect("Failed to create temp dir");
    let storage = Arc::new(SqliteStorage::open(&dir.path().join("local.sqlite")).unwrap());
    let api = ScriptedApi::new(vec![Ok(page(0..10)), Ok(page(10..11))]);
    let feed = Arc::new(RecipeFeed::new(api.clone(), storage.clone()));
    let listener = ScrollListener::new(feed.clone(), SCROLL_DEBOUNCE);

    feed.start().await;
    assert_eq!(feed.recipes().len(), 10);
    assert!(feed.with_list(|list| list.has_more()));

    scroll_to_bottom(&feed, &listener);
    settle(SCROLL_DEBOUNCE + Duration::from_millis(100)).await;

    assert_eq!(api.offsets(), vec![0, 10]);
    assert_eq!(feed.recipes().len(), 11);
    assert!(!feed.with_list(|list| list.has_more()));

    // exhausted: further scrolling issues nothing
    scroll_to_bottom(&feed, &listener);
    settle(SCROLL_DEBOUNCE + Duration::from_millis(100)).await;
    assert_eq!(api.offsets(), vec![0, 10]);

    assert!(feed.delete(4));
    let mut draft = feed.open_editor(7).unwrap();
    draft.title = "Pelmeni".to_string();
    assert!(feed.save(draft));

    let stored = load_recipes(storage.as_ref()).unwrap();
    assert_eq!(stored.len(), 10);
    assert!(stored.iter().all(|r| r.id != 4));
    assert_eq!(stored.iter().find(|r| r.id == 7).unwrap().title, "Pelmeni");
    assert_eq!(stored, feed.recipes());
}

#[tokio::test(start_paused = true)]
async fn scroll_during_fetch_is_ignored() {
    let storage = Arc::new(SqliteStorage::open_in_memory().unwrap());
    let api = ScriptedApi::new(vec![Ok(page(0..10)), Ok(page(10..20))]);
    let feed = Arc::new(RecipeFeed::new(api.clone(), storage));
    let listener = ScrollListener::new(feed.clone(), Duration::from_millis(10));

    let starter = feed.clone();
    let first = tokio::spawn(async move { starter.start().await });
    tokio::task::yield_now().await;
    assert!(feed.with_list(|list| list.is_loading()));

    // the timer fires while the first page is still in flight
    listener.on_scroll(view::scroll_position(0, 0));
    settle(Duration::from_millis(15)).await;
    first.await.unwrap();

    assert_eq!(api.offsets(), vec![0]);
    assert_eq!(feed.with_list(|list| list.cursor().page), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_first_page_shows_error() {
    let storage = Arc::new(SqliteStorage::open_in_memory().unwrap());
    let api = ScriptedApi::new(vec![Err(FetchError::Status(500))]);
    let feed = Arc::new(RecipeFeed::new(api, storage));

    feed.start().await;

    let text = feed.with_list(|list| view::render_list(list, 0));
    assert!(text.starts_with(FETCH_ERROR_PREFIX));
    assert!(feed.recipes().is_empty());
    assert!(!feed.with_list(|list| list.is_loading()));
}
