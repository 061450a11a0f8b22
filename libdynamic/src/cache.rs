use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::platform::RawSymbol;

/// Name → address map shared by every `invoke` on one library.
///
/// The lock only guards map access. Callers resolve and call with the lock
/// released, so two threads missing on the same name may both resolve it;
/// the first insert is kept and later ones are no-ops.
#[derive(Debug, Default)]
pub(crate) struct SymbolCache {
    entries: Mutex<HashMap<String, RawSymbol>>,
}

impl SymbolCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    // The map holds plain addresses, a panic mid-update cannot corrupt it.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, RawSymbol>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn lookup(&self, name: &str) -> Option<RawSymbol> {
        self.lock().get(name).copied()
    }

    /// Returns the address now cached under `name`, which is `raw` unless
    /// another thread got there first.
    pub(crate) fn insert(&self, name: &str, raw: RawSymbol) -> RawSymbol {
        *self.lock().entry(name.to_string()).or_insert(raw)
    }

    pub(crate) fn clear(&mut self) {
        self.entries
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::c_void;
    use std::sync::Arc;
    use std::thread;

    fn raw(value: &mut u8) -> RawSymbol {
        RawSymbol::new((value as *mut u8).cast::<c_void>()).unwrap()
    }

    #[test]
    fn first_insert_wins() {
        let (mut a, mut b) = (1u8, 2u8);
        let cache = SymbolCache::new();
        assert!(cache.lookup("intAdd").is_none());

        let first = raw(&mut a);
        assert_eq!(cache.insert("intAdd", first), first);
        assert_eq!(cache.insert("intAdd", raw(&mut b)), first);
        assert_eq!(cache.lookup("intAdd"), Some(first));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn clear_empties_the_map() {
        let mut value = 0u8;
        let mut cache = SymbolCache::new();
        cache.insert("a", raw(&mut value));
        cache.insert("b", raw(&mut value));
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert_eq!(cache.len(), 0);
        assert!(cache.lookup("a").is_none());
    }

    #[test]
    fn survives_a_poisoned_lock() {
        let mut value = 0u8;
        let symbol = raw(&mut value);
        let cache = Arc::new(SymbolCache::new());
        cache.insert("kept", symbol);

        let poisoner = Arc::clone(&cache);
        let result = thread::spawn(move || {
            let _guard = poisoner.entries.lock().unwrap();
            panic!("poison the cache lock");
        })
        .join();
        assert!(result.is_err());

        assert_eq!(cache.lookup("kept"), Some(symbol));
        assert_eq!(cache.len(), 1);
    }
}
