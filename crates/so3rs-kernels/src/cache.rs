//! Per-key compute-once memoization
//!
//! Lookups hold the map lock only long enough to fetch or insert the slot;
//! the expensive computation then runs under the slot's [`OnceCell`], so
//! concurrent requests for *different* keys never serialize behind each
//! other while concurrent requests for the *same* key compute exactly once.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;

pub(crate) struct KeyedCache<K, V> {
    slots: Mutex<HashMap<K, Arc<OnceCell<V>>>>,
    computed: AtomicUsize,
}

impl<K, V> Default for KeyedCache<K, V> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            computed: AtomicUsize::new(0),
        }
    }
}

impl<K: Eq + Hash + Clone, V: Clone> KeyedCache<K, V> {
    /// Fetch the value for `key`, running `init` if no caller has yet.
    ///
    /// A failed `init` leaves the slot empty so the next caller retries.
    pub fn get_or_try_init<E>(
        &self,
        key: &K,
        init: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        let slot = {
            let mut slots = self.slots.lock();
            slots
                .entry(key.clone())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };
        slot.get_or_try_init(|| {
            let value = init()?;
            self.computed.fetch_add(1, Ordering::Relaxed);
            Ok(value)
        })
        .cloned()
    }

    /// Number of values actually computed (cache misses)
    pub fn computed(&self) -> usize {
        self.computed.load(Ordering::Relaxed)
    }

    /// Number of populated slots
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .values()
            .filter(|slot| slot.get().is_some())
            .count()
    }
}
