//! In-memory recipe list and the transitions that drive it.
//!
//! Nothing here performs I/O. The owner calls [`RecipeList::begin_fetch`],
//! runs the request itself, and hands the result back through
//! [`RecipeList::finish_fetch`]. While a fetch is open the list refuses to
//! start another one, so pages always land in the order they were asked for.

use crate::error::FetchError;
use crate::pagination::{Cursor, PageRequest};
use crate::recipe::Recipe;

pub const FETCH_ERROR_PREFIX: &str = "Failed to load recipes: ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Appended { received: usize, total: usize },
    Failed(String),
}

#[derive(Debug, Default)]
pub struct RecipeList {
    recipes: Vec<Recipe>,
    loading: bool,
    error: Option<String>,
    cursor: Cursor,
}

impl RecipeList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn has_more(&self) -> bool {
        self.cursor.has_more
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Opens a fetch for `page`, or returns `None` when one is already in
    /// flight or the upstream list is exhausted.
    pub fn begin_fetch(&mut self, page: u32) -> Option<PageRequest> {
        if self.loading || !self.cursor.has_more {
            log::debug!(
                "Skipping fetch of page {} (loading: {}, has_more: {})",
                page,
                self.loading,
                self.cursor.has_more
            );
            return None;
        }
        self.loading = true;
        self.error = None;
        let request = PageRequest::new(page);
        log::debug!("Requesting page {} at offset {}", request.page, request.offset());
        Some(request)
    }

    /// Advances the cursor and opens a fetch for the new page. The cursor is
    /// not moved when the fetch would be refused.
    pub fn advance(&mut self) -> Option<PageRequest> {
        if self.loading || !self.cursor.has_more {
            return None;
        }
        let page = self.cursor.advance();
        self.begin_fetch(page)
    }

    /// Settles the open fetch. The loading flag is cleared whatever the result.
    pub fn finish_fetch(
        &mut self,
        request: PageRequest,
        result: Result<Vec<Recipe>, FetchError>,
    ) -> FetchOutcome {
        self.loading = false;
        match result {
            Ok(page) => {
                let received = page.len();
                self.recipes.extend(page);
                self.cursor.record_page(received);
                log::debug!(
                    "Page {} brought {} recipes ({} total, has_more: {})",
                    request.page,
                    received,
                    self.recipes.len(),
                    self.cursor.has_more
                );
                FetchOutcome::Appended {
                    received,
                    total: self.recipes.len(),
                }
            }
            Err(e) => {
                let message = format!("{}{}", FETCH_ERROR_PREFIX, e);
                log::error!("Page {} failed: {}", request.page, e);
                self.error = Some(message.clone());
                FetchOutcome::Failed(message)
            }
        }
    }

    /// Removes every entry carrying `id`. Returns whether the list changed.
    pub fn delete(&mut self, id: i64) -> bool {
        let before = self.recipes.len();
        self.recipes.retain(|recipe| recipe.id != id);
        let changed = self.recipes.len() != before;
        log::debug!("Delete {}: changed={}", id, changed);
        changed
    }

    /// Copy of the recipe with `id` for an edit modal to work on. The list
    /// is untouched until the copy comes back through [`RecipeList::save`];
    /// cancelling is dropping the copy.
    pub fn edit_copy(&self, id: i64) -> Option<Recipe> {
        self.recipes.iter().find(|recipe| recipe.id == id).cloned()
    }

    /// Writes `draft` over every entry with the same id. Returns false when
    /// no entry matched, e.g. the recipe was deleted while being edited.
    pub fn save(&mut self, draft: &Recipe) -> bool {
        let mut matched = false;
        for recipe in self.recipes.iter_mut().filter(|r| r.id == draft.id) {
            *recipe = draft.clone();
            matched = true;
        }
        log::debug!("Save recipe {}: matched={}", draft.id, matched);
        matched
    }
}
