//! Result cache for expensive resolutions.
//!
//! Values are serialized responses. The cache knows nothing about their shape; the resolver
//! validates a hit before serving it and evicts entries that do not decode.

use std::{
	collections::HashMap,
	sync::{Arc, Mutex, Weak},
	time::Duration,
};

use serde::de::IgnoredAny;
use tokio::{
	task::JoinHandle,
	time::{self, Instant, MissedTickBehavior},
};

pub trait ResultCache
where
	Self: Send + Sync,
{
	/// Expired entries are never returned.
	fn get(&self, key: &str) -> Option<Vec<u8>>;

	fn set(&self, key: &str, value: Vec<u8>, ttl: Duration);

	fn delete(&self, key: &str);

	fn flush(&self);

	/// Number of live entries. Expired entries the sweeper has not reached yet are not counted.
	fn len(&self) -> usize;

	fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

/// Outcome of a cache read as seen by the resolver.
#[derive(Debug)]
pub(crate) enum Lookup {
	Hit(Vec<u8>),
	Miss,
	Corrupt,
}

#[derive(Debug)]
struct Entry {
	value: Vec<u8>,
	expires_at: Instant,
}

/// Process-local cache with a fixed TTL per entry and a periodic sweep.
#[derive(Debug, Default)]
pub struct MemoryCache {
	entries: Mutex<HashMap<String, Entry>>,
}
impl MemoryCache {
	pub fn new() -> Self {
		Self::default()
	}

	/// Removes expired entries and returns how many were dropped.
	pub fn sweep(&self) -> usize {
		let now = Instant::now();
		let mut entries = self.entries.lock().unwrap_or_else(|err| err.into_inner());
		let before = entries.len();

		entries.retain(|_, entry| entry.expires_at > now);

		before - entries.len()
	}

	/// Sweeps every `interval` until the cache is dropped. Must be called inside a Tokio
	/// runtime.
	pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
		let weak: Weak<Self> = Arc::downgrade(self);

		tokio::spawn(async move {
			let mut ticker = time::interval_at(Instant::now() + interval, interval);

			ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

			loop {
				ticker.tick().await;

				let Some(cache) = weak.upgrade() else {
					break;
				};
				let removed = cache.sweep();

				if removed > 0 {
					tracing::debug!(removed, "Swept expired cache entries.");
				}
			}
		})
	}
}
impl ResultCache for MemoryCache {
	fn get(&self, key: &str) -> Option<Vec<u8>> {
		let mut entries = self.entries.lock().unwrap_or_else(|err| err.into_inner());
		let expired = match entries.get(key) {
			Some(entry) if entry.expires_at > Instant::now() => return Some(entry.value.clone()),
			Some(_) => true,
			None => false,
		};

		if expired {
			entries.remove(key);
		}

		None
	}

	fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) {
		let entry = Entry { value, expires_at: Instant::now() + ttl };

		self.entries.lock().unwrap_or_else(|err| err.into_inner()).insert(key.to_string(), entry);
	}

	fn delete(&self, key: &str) {
		self.entries.lock().unwrap_or_else(|err| err.into_inner()).remove(key);
	}

	fn flush(&self) {
		self.entries.lock().unwrap_or_else(|err| err.into_inner()).clear();
	}

	fn len(&self) -> usize {
		let now = Instant::now();
		let entries = self.entries.lock().unwrap_or_else(|err| err.into_inner());

		entries.values().filter(|entry| entry.expires_at > now).count()
	}
}

/// A stored value counts as intact when it is one well-formed JSON document.
pub(crate) fn lookup(cache: &dyn ResultCache, key: &str) -> Lookup {
	let Some(value) = cache.get(key) else {
		return Lookup::Miss;
	};

	match serde_json::from_slice::<IgnoredAny>(&value) {
		Ok(_) => Lookup::Hit(value),
		Err(_) => Lookup::Corrupt,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test(start_paused = true)]
	async fn entries_expire_after_ttl() {
		let cache = MemoryCache::new();

		cache.set("a", b"{}".to_vec(), Duration::from_secs(10));

		assert_eq!(cache.get("a"), Some(b"{}".to_vec()));

		time::advance(Duration::from_secs(11)).await;

		assert_eq!(cache.get("a"), None);
		assert_eq!(cache.len(), 0);
	}

	#[tokio::test(start_paused = true)]
	async fn sweep_drops_only_expired_entries() {
		let cache = MemoryCache::new();

		cache.set("short", b"{}".to_vec(), Duration::from_secs(1));
		cache.set("long", b"{}".to_vec(), Duration::from_secs(100));

		time::advance(Duration::from_secs(2)).await;

		assert_eq!(cache.len(), 1);
		assert_eq!(cache.sweep(), 1);
		assert_eq!(cache.len(), 1);
		assert!(cache.get("long").is_some());
	}

	#[tokio::test(start_paused = true)]
	async fn len_skips_expired_entries_before_sweep() {
		let cache = MemoryCache::new();

		cache.set("a", b"{}".to_vec(), Duration::from_secs(1));
		cache.set("b", b"{}".to_vec(), Duration::from_secs(3));

		assert_eq!(cache.len(), 2);

		time::advance(Duration::from_secs(2)).await;

		assert_eq!(cache.len(), 1);

		time::advance(Duration::from_secs(2)).await;

		assert_eq!(cache.len(), 0);
		assert!(cache.is_empty());
		assert_eq!(cache.sweep(), 2);
	}

	#[tokio::test(start_paused = true)]
	async fn sweeper_runs_on_interval_and_stops_with_cache() {
		let cache = Arc::new(MemoryCache::new());
		let handle = cache.spawn_sweeper(Duration::from_secs(5));

		cache.set("a", b"{}".to_vec(), Duration::from_secs(1));

		time::sleep(Duration::from_secs(6)).await;

		assert_eq!(cache.len(), 0);

		drop(cache);
		time::sleep(Duration::from_secs(6)).await;

		assert!(handle.is_finished());
	}

	#[test]
	fn lookup_classifies_values() {
		let cache = MemoryCache::new();

		cache.set("ok", br#"{"id":"a"}"#.to_vec(), Duration::from_secs(60));
		cache.set("bad", b"\x00\x01not json".to_vec(), Duration::from_secs(60));

		assert!(matches!(lookup(&cache, "ok"), Lookup::Hit(_)));
		assert!(matches!(lookup(&cache, "bad"), Lookup::Corrupt));
		assert!(matches!(lookup(&cache, "missing"), Lookup::Miss));
	}

	#[test]
	fn flush_and_delete() {
		let cache = MemoryCache::new();

		cache.set("a", b"{}".to_vec(), Duration::from_secs(60));
		cache.set("b", b"{}".to_vec(), Duration::from_secs(60));
		cache.delete("a");

		assert_eq!(cache.len(), 1);

		cache.flush();

		assert!(cache.is_empty());
	}
}
