use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::debounce::Debouncer;
use crate::feed::RecipeFeed;

pub const SCROLL_DEBOUNCE: Duration = Duration::from_millis(200);
/// Distance from the document bottom at which the next page is requested.
pub const BOTTOM_THRESHOLD: u32 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollPosition {
    pub viewport_height: u32,
    pub scroll_top: u32,
    pub document_height: u32,
}

impl ScrollPosition {
    pub fn is_near_bottom(&self, threshold: u32) -> bool {
        let bottom = self.viewport_height as u64 + self.scroll_top as u64;
        bottom + threshold as u64 >= self.document_height as u64
    }
}

/// Watches scroll positions and loads the next page once the viewport nears
/// the bottom. The check runs when the debounce timer fires, against the
/// most recent position.
pub struct ScrollListener {
    latest: Arc<Mutex<ScrollPosition>>,
    debouncer: Debouncer,
}

impl ScrollListener {
    pub fn new(feed: Arc<RecipeFeed>, delay: Duration) -> Self {
        let latest = Arc::new(Mutex::new(ScrollPosition::default()));
        let position = latest.clone();
        let debouncer = Debouncer::new(delay, move || {
            let feed = feed.clone();
            let position = *position.lock().unwrap_or_else(|p| p.into_inner());
            async move {
                if !position.is_near_bottom(BOTTOM_THRESHOLD) {
                    return;
                }
                let ready = feed.with_list(|list| list.has_more() && !list.is_loading());
                if !ready {
                    log::debug!("Near bottom but no page to load");
                    return;
                }
                log::debug!("Near bottom at {:?}, loading next page", position);
                feed.load_next().await;
            }
        });
        ScrollListener { latest, debouncer }
    }

    /// Records the new position and re-arms the debounce timer.
    pub fn on_scroll(&self, position: ScrollPosition) {
        *self.latest.lock().unwrap_or_else(|p| p.into_inner()) = position;
        self.debouncer.trigger();
    }

    pub fn dispose(&self) {
        self.debouncer.dispose();
    }
}
