//! Trailing-edge debounce on top of the tokio timer.
//!
//! Every [`Debouncer::trigger`] cancels the pending timer and arms a new one,
//! so a burst of triggers runs the action once, `delay` after the last of
//! them. Only the timer is ever cancelled: once the delay has elapsed the
//! action runs on its own task and is left to finish.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

type Action = Arc<dyn Fn() -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

pub struct Debouncer {
    delay: Duration,
    action: Action,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new<F, Fut>(delay: Duration, action: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Debouncer {
            delay,
            action: Arc::new(move || -> Pin<Box<dyn Future<Output = ()> + Send>> {
                Box::pin(action())
            }),
            timer: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Re-arms the timer. Must be called from within a tokio runtime.
    pub fn trigger(&self) {
        let mut timer = self.timer.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(previous) = timer.take() {
            previous.abort();
        }
        let action = self.action.clone();
        let delay = self.delay;
        *timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(action());
        }));
    }

    pub fn is_pending(&self) -> bool {
        let timer = self.timer.lock().unwrap_or_else(|p| p.into_inner());
        timer.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Drops the pending timer, if any. Further triggers re-arm as usual.
    pub fn dispose(&self) {
        let mut timer = self.timer.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(handle) = timer.take() {
            handle.abort();
            log::debug!("Debounce timer released");
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.dispose();
    }
}
