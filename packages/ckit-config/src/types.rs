use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub index_data: IndexData,
	#[serde(default)]
	pub cache: Cache,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
	#[serde(default = "default_request_timeout_ms")]
	pub request_timeout_ms: u64,
	/// Emit per-step timings for every resolution at info level.
	#[serde(default)]
	pub stopwatch: bool,
}
impl Service {
	pub fn request_timeout(&self) -> Duration {
		Duration::from_millis(self.request_timeout_ms)
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	/// Local identifier to DOI table.
	pub identifiers: Postgres,
	/// Citation edges, citing DOI to cited DOI.
	pub citations: Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndexData {
	pub timeout_ms: u64,
	/// Consulted in order; the first backend that knows an identifier wins.
	pub backends: Vec<IndexDataBackend>,
}
impl IndexData {
	pub fn timeout(&self) -> Duration {
		Duration::from_millis(self.timeout_ms)
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IndexDataBackend {
	Http { url: String },
	Postgres(Postgres),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Cache {
	pub enabled: bool,
	/// Only resolutions slower than this are written to the cache.
	pub trigger_ms: u64,
	pub ttl_secs: u64,
	pub sweep_interval_secs: u64,
}
impl Cache {
	pub fn trigger(&self) -> Duration {
		Duration::from_millis(self.trigger_ms)
	}

	pub fn ttl(&self) -> Duration {
		Duration::from_secs(self.ttl_secs)
	}

	pub fn sweep_interval(&self) -> Duration {
		Duration::from_secs(self.sweep_interval_secs)
	}
}
impl Default for Cache {
	fn default() -> Self {
		Self { enabled: false, trigger_ms: 250, ttl_secs: 8 * 60 * 60, sweep_interval_secs: 300 }
	}
}

fn default_request_timeout_ms() -> u64 {
	30_000
}
