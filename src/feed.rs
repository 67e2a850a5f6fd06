//! Recipe feed: the list state wired to the API, local storage and
//! subscribers.
//!
//! All list transitions go through [`RecipeList`]; the feed only performs the
//! side effects around them. The list lock is never held across the network
//! await, so callers can inspect the list while a page is loading.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::api::RecipeApi;
use crate::events::{EventEmitter, ListenerId};
use crate::list::{FetchOutcome, RecipeList};
use crate::pagination::PageRequest;
use crate::recipe::Recipe;
use crate::storage::{persist_recipes, LocalStorage};

pub const LOADED: &str = "loaded";
pub const FAILED: &str = "failed";
pub const DELETED: &str = "deleted";
pub const UPDATED: &str = "updated";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent {
    Loaded { page: u32, received: usize, total: usize },
    Failed { page: u32, message: String },
    Deleted { id: i64 },
    Updated { recipe: Recipe },
}

impl FeedEvent {
    pub fn name(&self) -> &'static str {
        match self {
            FeedEvent::Loaded { .. } => LOADED,
            FeedEvent::Failed { .. } => FAILED,
            FeedEvent::Deleted { .. } => DELETED,
            FeedEvent::Updated { .. } => UPDATED,
        }
    }
}

pub struct RecipeFeed {
    list: Mutex<RecipeList>,
    api: Arc<dyn RecipeApi>,
    storage: Arc<dyn LocalStorage>,
    emitter: Mutex<EventEmitter<FeedEvent>>,
}

impl RecipeFeed {
    pub fn new(api: Arc<dyn RecipeApi>, storage: Arc<dyn LocalStorage>) -> Self {
        RecipeFeed {
            list: Mutex::new(RecipeList::new()),
            api,
            storage,
            emitter: Mutex::new(EventEmitter::new()),
        }
    }

    fn list(&self) -> MutexGuard<'_, RecipeList> {
        self.list.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn update<R>(&self, f: impl FnOnce(&mut RecipeList) -> R) -> R {
        f(&mut self.list())
    }

    /// Runs `f` against the current list state.
    pub fn with_list<R>(&self, f: impl FnOnce(&RecipeList) -> R) -> R {
        f(&self.list())
    }

    pub fn recipes(&self) -> Vec<Recipe> {
        self.with_list(|list| list.recipes().to_vec())
    }

    pub fn subscribe<F>(&self, event: &str, listener: F) -> ListenerId
    where
        F: Fn(&FeedEvent) + Send + Sync + 'static,
    {
        self.emitter
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .on(event, listener)
    }

    pub fn unsubscribe(&self, event: &str, id: ListenerId) -> bool {
        self.emitter
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .off(event, id)
    }

    // listeners run without the emitter lock, so they may subscribe or unsubscribe
    fn publish(&self, event: FeedEvent) {
        let listeners = self
            .emitter
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .listeners(event.name());
        for listener in listeners {
            listener(&event);
        }
    }

    fn persist(&self, list: &RecipeList) {
        if let Err(e) = persist_recipes(self.storage.as_ref(), list.recipes()) {
            log::error!("Could not write recipes to local storage: {}", e);
        }
    }

    /// Mirrors the initial (empty) list to storage and loads the first page.
    pub async fn start(&self) -> Option<FetchOutcome> {
        self.with_list(|list| self.persist(list));
        self.load_page(1).await
    }

    /// Fetches `page` unless a fetch is in flight or the list is exhausted.
    pub async fn load_page(&self, page: u32) -> Option<FetchOutcome> {
        let request = self.update(|list| list.begin_fetch(page))?;
        Some(self.run(request).await)
    }

    /// Advances the cursor and fetches the next page.
    pub async fn load_next(&self) -> Option<FetchOutcome> {
        let request = self.update(RecipeList::advance)?;
        Some(self.run(request).await)
    }

    async fn run(&self, request: PageRequest) -> FetchOutcome {
        let result = self.api.fetch_page(request).await;
        let outcome = {
            let mut list = self.list();
            let outcome = list.finish_fetch(request, result);
            if let FetchOutcome::Appended { .. } = outcome {
                self.persist(&list);
            }
            outcome
        };
        let event = match &outcome {
            FetchOutcome::Appended { received, total } => FeedEvent::Loaded {
                page: request.page,
                received: *received,
                total: *total,
            },
            FetchOutcome::Failed(message) => FeedEvent::Failed {
                page: request.page,
                message: message.clone(),
            },
        };
        self.publish(event);
        outcome
    }

    pub fn delete(&self, id: i64) -> bool {
        let changed = {
            let mut list = self.list();
            let changed = list.delete(id);
            if changed {
                self.persist(&list);
            }
            changed
        };
        if changed {
            self.publish(FeedEvent::Deleted { id });
        }
        changed
    }

    /// Copy of the recipe with `id` for the caller to edit. Each editor
    /// holds its own copy; nothing is shared until [`RecipeFeed::save`].
    pub fn open_editor(&self, id: i64) -> Option<Recipe> {
        self.with_list(|list| list.edit_copy(id))
    }

    /// Stores an edited copy. Returns false, without touching storage or
    /// notifying anyone, when the recipe no longer exists.
    pub fn save(&self, draft: Recipe) -> bool {
        let saved = {
            let mut list = self.list();
            let saved = list.save(&draft);
            if saved {
                self.persist(&list);
            }
            saved
        };
        if saved {
            self.publish(FeedEvent::Updated { recipe: draft });
        }
        saved
    }
}
