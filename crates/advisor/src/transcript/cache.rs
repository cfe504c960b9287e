//! Bounded, time-limited memo of parse results keyed by a digest of the text.

use std::fmt;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use super::types::ParsedTranscript;

/// First 16 bytes of the SHA-256 of a document's extracted text.
///
/// Only the digest is kept, so the cache never holds transcript contents
/// as keys.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub struct DocumentKey([u8; 16]);

impl DocumentKey {
    pub fn from_text(text: &str) -> Self {
        let digest = Sha256::digest(text.as_bytes());
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&digest[..16]);
        Self(bytes)
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0[..4] {
            write!(f, "{byte:02x}")?;
        }
        f.write_str("...")
    }
}

struct Memo {
    parsed: ParsedTranscript,
    stored_at: Instant,
}

impl Memo {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() < ttl
    }
}

/// Parse results shared across requests.
///
/// Holds at most `capacity` documents; storing a new one into a full cache
/// first sweeps expired entries and then evicts the oldest. Concurrent
/// stores may overshoot the bound by the number of racing writers.
pub struct ParseCache {
    memos: DashMap<DocumentKey, Memo>,
    ttl: Duration,
    capacity: usize,
}

impl ParseCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            memos: DashMap::new(),
            ttl,
            capacity,
        }
    }

    /// Returns the parse of `text`, reusing a fresh memo when there is one.
    ///
    /// Parsing is deterministic, so a hit is exactly what a fresh parse of the
    /// same text would produce.
    pub fn get_or_parse(&self, text: &str) -> ParsedTranscript {
        let key = DocumentKey::from_text(text);
        if let Some(parsed) = self.lookup(&key) {
            debug!(document = %key, "Parse cache hit");
            return parsed;
        }

        let parsed = super::parse_transcript(text);
        self.store(key, parsed.clone());
        parsed
    }

    fn lookup(&self, key: &DocumentKey) -> Option<ParsedTranscript> {
        let memo = self.memos.get(key)?;
        if memo.is_fresh(self.ttl) {
            return Some(memo.parsed.clone());
        }

        drop(memo);
        self.memos.remove_if(key, |_, memo| !memo.is_fresh(self.ttl));
        None
    }

    fn store(&self, key: DocumentKey, parsed: ParsedTranscript) {
        if self.capacity == 0 {
            return;
        }

        if !self.memos.contains_key(&key) && self.memos.len() >= self.capacity {
            self.cleanup_expired();
            if self.memos.len() >= self.capacity {
                self.evict_oldest();
            }
        }

        self.memos.insert(
            key,
            Memo {
                parsed,
                stored_at: Instant::now(),
            },
        );
    }

    fn evict_oldest(&self) {
        let oldest = self
            .memos
            .iter()
            .min_by_key(|entry| entry.stored_at)
            .map(|entry| *entry.key());

        if let Some(key) = oldest {
            self.memos.remove(&key);
            debug!(document = %key, "Evicted oldest parse");
        }
    }

    pub fn clear(&self) {
        self.memos.clear();
    }

    /// Drops every memo older than the TTL.
    pub fn cleanup_expired(&self) {
        self.memos.retain(|_, memo| memo.is_fresh(self.ttl));
    }

    pub fn stats(&self) -> ParseCacheStats {
        let (active, expired) = self.memos.iter().fold((0, 0), |(active, expired), memo| {
            if memo.is_fresh(self.ttl) {
                (active + 1, expired)
            } else {
                (active, expired + 1)
            }
        });

        ParseCacheStats {
            capacity: self.capacity,
            total_entries: active + expired,
            expired_entries: expired,
            active_entries: active,
        }
    }
}

/// Snapshot served by `GET /transcript/cache_stats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseCacheStats {
    pub capacity: usize,
    pub total_entries: usize,
    pub expired_entries: usize,
    pub active_entries: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(300);

    fn text(n: usize) -> String {
        format!("Fall 2024\nCSC {n} Computer Programming I 4.000 4.000 B 12.000\n")
    }

    #[test]
    fn test_document_key_is_a_content_digest() {
        let a = DocumentKey::from_text(&text(110));
        assert_eq!(a, DocumentKey::from_text(&text(110)));
        assert_ne!(a, DocumentKey::from_text(&text(120)));
        assert_eq!(a.to_string().len(), 11);
        assert!(a.to_string().ends_with("..."));
    }

    #[test]
    fn test_repeat_parse_is_served_from_cache() {
        let cache = ParseCache::new(TTL, 8);
        let first = cache.get_or_parse(&text(110));
        let second = cache.get_or_parse(&text(110));

        assert_eq!(first, second);
        assert_eq!(first.courses[0].code, "CSC 110");
        assert_eq!(cache.stats().total_entries, 1);
        assert!(cache.lookup(&DocumentKey::from_text(&text(110))).is_some());
    }

    #[test]
    fn test_expired_memo_is_dropped_on_lookup() {
        let cache = ParseCache::new(Duration::ZERO, 8);
        cache.get_or_parse(&text(110));
        assert_eq!(cache.stats().expired_entries, 1);

        assert!(cache.lookup(&DocumentKey::from_text(&text(110))).is_none());
        assert_eq!(cache.stats().total_entries, 0);
    }

    #[test]
    fn test_full_cache_evicts_oldest() {
        let cache = ParseCache::new(TTL, 2);
        for n in [110, 120, 130] {
            cache.get_or_parse(&text(n));
            std::thread::sleep(Duration::from_millis(2));
        }

        let stats = cache.stats();
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.capacity, 2);
        assert!(cache.lookup(&DocumentKey::from_text(&text(110))).is_none());
        assert!(cache.lookup(&DocumentKey::from_text(&text(130))).is_some());
    }

    #[test]
    fn test_zero_capacity_stores_nothing() {
        let cache = ParseCache::new(TTL, 0);
        let parsed = cache.get_or_parse(&text(110));

        assert_eq!(parsed.courses.len(), 1);
        assert_eq!(cache.stats().total_entries, 0);
    }
}
