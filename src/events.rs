//! Named-event subscription registry.
//!
//! Each registry is an ordinary value owned by whoever publishes through it.
//! Listeners are identified by the [`ListenerId`] handed back from
//! [`EventEmitter::on`], since closures cannot be compared.

use std::collections::HashMap;
use std::sync::Arc;

pub type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub struct EventEmitter<T> {
    events: HashMap<String, Vec<(ListenerId, Listener<T>)>>,
    next_id: u64,
}

impl<T> Default for EventEmitter<T> {
    fn default() -> Self {
        EventEmitter {
            events: HashMap::new(),
            next_id: 0,
        }
    }
}

impl<T> EventEmitter<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F>(&mut self, event: &str, listener: F) -> ListenerId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        let listener: Listener<T> = Arc::new(listener);
        self.events
            .entry(event.to_string())
            .or_default()
            .push((id, listener));
        id
    }

    /// Calls the listeners of `event` in registration order and returns how many ran.
    pub fn emit(&self, event: &str, payload: &T) -> usize {
        match self.events.get(event) {
            Some(listeners) => {
                for (_, listener) in listeners {
                    listener(payload);
                }
                listeners.len()
            }
            None => 0,
        }
    }

    /// Copies out the listeners of `event`, so a caller behind a lock can
    /// release it before running them.
    pub fn listeners(&self, event: &str) -> Vec<Listener<T>> {
        self.events.get(event).map_or_else(Vec::new, |listeners| {
            listeners.iter().map(|(_, listener)| listener.clone()).collect()
        })
    }

    pub fn off(&mut self, event: &str, id: ListenerId) -> bool {
        let Some(listeners) = self.events.get_mut(event) else {
            return false;
        };
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        let removed = listeners.len() != before;
        if listeners.is_empty() {
            self.events.remove(event);
        }
        removed
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.events.get(event).map_or(0, Vec::len)
    }
}
