//! In-memory translation cache.
//! Key: blake3 hash of (word | target_lang). Process-lifetime, unbounded:
//! no TTL and no size eviction; the only purge is `clear()` on language change.

use std::collections::HashMap;

use parking_lot::Mutex;

pub struct TranslationCache {
    inner: Mutex<HashMap<[u8; 32], String>>,
}

impl TranslationCache {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Compute the cache key for a (word, target language) pair.
    /// Exact pair only: no fuzzy matching, no extra case folding.
    fn compute_key(word: &str, target_lang: &str) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(word.as_bytes());
        hasher.update(b"|");
        hasher.update(target_lang.as_bytes());
        *hasher.finalize().as_bytes()
    }

    /// Look up a cached translation. Returns None if absent.
    pub fn get(&self, word: &str, target_lang: &str) -> Option<String> {
        let key = Self::compute_key(word, target_lang);
        self.inner.lock().get(&key).cloned()
    }

    /// Insert a translation for a (word, target language) pair.
    pub fn insert(&self, word: &str, target_lang: &str, translated: String) {
        let key = Self::compute_key(word, target_lang);
        self.inner.lock().insert(key, translated);
    }

    /// Purge all entries. Invoked synchronously when the target language
    /// changes, so no stale-language translation is ever served afterwards.
    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl Default for TranslationCache {
    fn default() -> Self {
        Self::new()
    }
}
