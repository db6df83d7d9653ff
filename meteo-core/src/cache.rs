use chrono::{DateTime, Utc};
use std::{
    collections::{HashMap, VecDeque},
    time::Duration,
};

use crate::model::WeatherBundle;

/// Cache key for a coordinate pair.
pub fn coordinate_key(latitude: f64, longitude: f64) -> String {
    format!("weather_{latitude}_{longitude}")
}

#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub data: V,
    pub timestamp: DateTime<Utc>,
}

/// Time-bounded cache holding at most `capacity` entries.
///
/// Eviction is by insertion order, not recency of use: once full, the entry
/// inserted earliest goes first. Replacing the value of an existing key
/// refreshes its timestamp but keeps its place in line.
#[derive(Debug)]
pub struct WeatherCache<V = WeatherBundle> {
    entries: HashMap<String, CacheEntry<V>>,
    order: VecDeque<String>,
    ttl: Duration,
    capacity: usize,
}

impl<V: Clone> WeatherCache<V> {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self { entries: HashMap::new(), order: VecDeque::new(), ttl, capacity }
    }

    /// Returns a fresh entry's data. An expired entry is dropped on the way.
    pub fn get(&mut self, key: &str, now: DateTime<Utc>) -> Option<V> {
        let entry = self.entries.get(key)?;

        // A timestamp in the future (clock moved back) counts as fresh.
        let fresh = (now - entry.timestamp).to_std().map_or(true, |age| age < self.ttl);
        if fresh {
            return Some(entry.data.clone());
        }

        tracing::debug!(key, "cache entry expired");
        self.remove(key);
        None
    }

    pub fn insert(&mut self, key: String, data: V, now: DateTime<Utc>) {
        let entry = CacheEntry { data, timestamp: now };
        if self.entries.insert(key.clone(), entry).is_none() {
            self.order.push_back(key);
        }

        while self.entries.len() > self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            tracing::debug!(key = %oldest, "evicting oldest cache entry");
            self.entries.remove(&oldest);
        }
    }

    pub fn remove(&mut self, key: &str) -> bool {
        if self.entries.remove(key).is_some() {
            self.order.retain(|k| k != key);
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Keys from oldest to newest insertion.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn cache() -> WeatherCache<u32> {
        WeatherCache::new(Duration::from_secs(600), 10)
    }

    #[test]
    fn eleventh_key_evicts_the_first_inserted() {
        let mut cache = cache();
        for i in 0..10 {
            cache.insert(coordinate_key(i as f64, 0.0), i, t0());
        }
        assert_eq!(cache.len(), 10);

        cache.insert(coordinate_key(10.0, 0.0), 10, t0());

        assert_eq!(cache.len(), 10);
        assert!(!cache.contains_key(&coordinate_key(0.0, 0.0)));
        for i in 1..=10 {
            assert!(cache.contains_key(&coordinate_key(i as f64, 0.0)));
        }
    }

    #[test]
    fn eviction_ignores_reads() {
        let mut cache = WeatherCache::new(Duration::from_secs(600), 2);
        cache.insert("a".into(), 1, t0());
        cache.insert("b".into(), 2, t0());
        // Reading "a" does not protect it.
        assert_eq!(cache.get("a", t0()), Some(1));

        cache.insert("c".into(), 3, t0());
        assert_eq!(cache.keys().collect::<Vec<_>>(), vec!["b", "c"]);
    }

    #[test]
    fn replacing_a_key_keeps_its_position() {
        let mut cache = WeatherCache::new(Duration::from_secs(600), 2);
        cache.insert("a".into(), 1, t0());
        cache.insert("b".into(), 2, t0());
        cache.insert("a".into(), 10, t0());
        assert_eq!(cache.len(), 2);

        cache.insert("c".into(), 3, t0());
        assert!(!cache.contains_key("a"));
        assert_eq!(cache.get("b", t0()), Some(2));
    }

    #[test]
    fn entries_expire_after_ttl() {
        let mut cache = cache();
        cache.insert("k".into(), 7, t0());

        let almost = t0() + chrono::Duration::seconds(599);
        assert_eq!(cache.get("k", almost), Some(7));

        let expired = t0() + chrono::Duration::seconds(600);
        assert_eq!(cache.get("k", expired), None);
        assert!(cache.is_empty());
        assert_eq!(cache.keys().count(), 0);
    }

    #[test]
    fn coordinate_keys_are_stable() {
        assert_eq!(coordinate_key(51.5, -0.12), "weather_51.5_-0.12");
    }

    #[test]
    fn clear_drops_everything() {
        let mut cache = cache();
        cache.insert("a".into(), 1, t0());
        cache.clear();
        assert!(cache.is_empty());
        assert!(!cache.remove("a"));
    }
}
