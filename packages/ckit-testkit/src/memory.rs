//! In-memory collaborators with call counters, for pipeline and route tests.
//!
//! Every fake uses interior mutability so a test can keep an `Arc` to it after handing a clone
//! to the service.

use std::{
	collections::{HashMap, HashSet},
	sync::{
		Mutex,
		atomic::{AtomicBool, AtomicUsize, Ordering},
	},
	time::Duration,
};

use ckit_service::{
	BlobFetcher, BoxFuture, CitationStore, Counter, Edges, Error, FetchError, IdMapping,
	IdentifierStore, Pinger, Result,
};

#[derive(Debug, Default)]
struct Knobs {
	delay: Mutex<Duration>,
	unavailable: AtomicBool,
}
impl Knobs {
	async fn wait(&self) {
		let delay = *self.delay.lock().unwrap_or_else(|err| err.into_inner());

		if !delay.is_zero() {
			tokio::time::sleep(delay).await;
		}
	}

	fn check(&self, store: &str) -> Result<()> {
		if self.unavailable.load(Ordering::SeqCst) {
			return Err(Error::Storage { message: format!("{store} is unavailable.") });
		}

		Ok(())
	}
}

/// Local id to DOI rows, kept in id order.
#[derive(Debug, Default)]
pub struct MemoryIdentifiers {
	rows: Mutex<Vec<IdMapping>>,
	/// Returned from every batch join whether asked for or not.
	stray: Mutex<Vec<IdMapping>>,
	point_calls: AtomicUsize,
	batch_calls: AtomicUsize,
	knobs: Knobs,
}
impl MemoryIdentifiers {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&self, id: &str, doi: &str) {
		let mut rows = self.rows.lock().unwrap_or_else(|err| err.into_inner());

		rows.push(IdMapping { id: id.to_string(), doi: doi.to_string() });
	}

	/// Makes the batch join also answer a mapping the caller never asked about.
	pub fn insert_stray(&self, id: &str, doi: &str) {
		self.stray
			.lock()
			.unwrap_or_else(|err| err.into_inner())
			.push(IdMapping { id: id.to_string(), doi: doi.to_string() });
	}

	pub fn set_delay(&self, delay: Duration) {
		*self.knobs.delay.lock().unwrap_or_else(|err| err.into_inner()) = delay;
	}

	pub fn set_unavailable(&self, unavailable: bool) {
		self.knobs.unavailable.store(unavailable, Ordering::SeqCst);
	}

	pub fn point_calls(&self) -> usize {
		self.point_calls.load(Ordering::SeqCst)
	}

	pub fn batch_calls(&self) -> usize {
		self.batch_calls.load(Ordering::SeqCst)
	}

	fn rows(&self) -> Vec<IdMapping> {
		let mut rows = self.rows.lock().unwrap_or_else(|err| err.into_inner()).clone();

		rows.sort_by(|a, b| a.id.cmp(&b.id));

		rows
	}
}
impl IdentifierStore for MemoryIdentifiers {
	fn doi_for_id<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<String>> {
		Box::pin(async move {
			self.point_calls.fetch_add(1, Ordering::SeqCst);
			self.knobs.wait().await;
			self.knobs.check("Identifier store")?;

			self.rows()
				.into_iter()
				.find(|row| row.id == id)
				.map(|row| row.doi)
				.ok_or_else(|| Error::NotFound { message: format!("No DOI for id {id:?}.") })
		})
	}

	fn id_for_doi<'a>(&'a self, doi: &'a str) -> BoxFuture<'a, Result<String>> {
		Box::pin(async move {
			self.point_calls.fetch_add(1, Ordering::SeqCst);
			self.knobs.wait().await;
			self.knobs.check("Identifier store")?;

			self.rows()
				.into_iter()
				.find(|row| row.doi == doi)
				.map(|row| row.id)
				.ok_or_else(|| Error::NotFound { message: format!("No id for DOI {doi:?}.") })
		})
	}

	fn ids_for_dois<'a>(&'a self, dois: &'a [String]) -> BoxFuture<'a, Result<Vec<IdMapping>>> {
		Box::pin(async move {
			if dois.is_empty() {
				return Ok(Vec::new());
			}

			self.batch_calls.fetch_add(1, Ordering::SeqCst);
			self.knobs.check("Identifier store")?;

			let wanted = dois.iter().map(String::as_str).collect::<HashSet<_>>();
			let mut found = self
				.rows()
				.into_iter()
				.filter(|row| wanted.contains(row.doi.as_str()))
				.collect::<Vec<_>>();

			found.extend(self.stray.lock().unwrap_or_else(|err| err.into_inner()).iter().cloned());

			Ok(found)
		})
	}

	fn ping(&self) -> BoxFuture<'_, Result<()>> {
		Box::pin(async move { self.knobs.check("Identifier store") })
	}

	fn count(&self) -> BoxFuture<'_, Result<u64>> {
		Box::pin(async move {
			self.knobs.check("Identifier store")?;

			Ok(self.rows().len() as u64)
		})
	}
}

/// Citation edges as (citing DOI, cited DOI) pairs.
#[derive(Debug, Default)]
pub struct MemoryCitations {
	edges: Mutex<Vec<(String, String)>>,
	calls: AtomicUsize,
	knobs: Knobs,
}
impl MemoryCitations {
	pub fn new() -> Self {
		Self::default()
	}

	/// Records that `source` cites `target`.
	pub fn cite(&self, source: &str, target: &str) {
		self.edges
			.lock()
			.unwrap_or_else(|err| err.into_inner())
			.push((source.to_string(), target.to_string()));
	}

	pub fn set_delay(&self, delay: Duration) {
		*self.knobs.delay.lock().unwrap_or_else(|err| err.into_inner()) = delay;
	}

	pub fn set_unavailable(&self, unavailable: bool) {
		self.knobs.unavailable.store(unavailable, Ordering::SeqCst);
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl CitationStore for MemoryCitations {
	fn edges<'a>(&'a self, doi: &'a str) -> BoxFuture<'a, Result<Edges>> {
		Box::pin(async move {
			self.calls.fetch_add(1, Ordering::SeqCst);
			self.knobs.wait().await;
			self.knobs.check("Citation store")?;

			let edges = self.edges.lock().unwrap_or_else(|err| err.into_inner()).clone();
			let citing = edges
				.iter()
				.filter(|(source, _)| source == doi)
				.map(|(_, target)| target.clone())
				.collect();
			let cited = edges
				.iter()
				.filter(|(_, target)| target == doi)
				.map(|(source, _)| source.clone())
				.collect();

			Ok(Edges { citing, cited })
		})
	}

	fn ping(&self) -> BoxFuture<'_, Result<()>> {
		Box::pin(async move { self.knobs.check("Citation store") })
	}

	fn count(&self) -> BoxFuture<'_, Result<u64>> {
		Box::pin(async move {
			self.knobs.check("Citation store")?;

			Ok(self.edges.lock().unwrap_or_else(|err| err.into_inner()).len() as u64)
		})
	}
}

/// Blobs keyed by local id. Without [`MemoryIndexData::with_health`] the fake exposes neither
/// a ping nor a count.
#[derive(Debug, Default)]
pub struct MemoryIndexData {
	blobs: Mutex<HashMap<String, Vec<u8>>>,
	broken: Mutex<Vec<String>>,
	calls: AtomicUsize,
	healthy: Option<AtomicBool>,
	knobs: Knobs,
}
impl MemoryIndexData {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds ping and count capabilities; ping succeeds while `healthy` holds.
	pub fn with_health(healthy: bool) -> Self {
		Self { healthy: Some(AtomicBool::new(healthy)), ..Self::default() }
	}

	pub fn insert(&self, id: &str, blob: impl Into<Vec<u8>>) {
		self.blobs.lock().unwrap_or_else(|err| err.into_inner()).insert(id.to_string(), blob.into());
	}

	/// Fetching `id` fails with a backend error from now on.
	pub fn break_id(&self, id: &str) {
		self.broken.lock().unwrap_or_else(|err| err.into_inner()).push(id.to_string());
	}

	pub fn set_delay(&self, delay: Duration) {
		*self.knobs.delay.lock().unwrap_or_else(|err| err.into_inner()) = delay;
	}

	pub fn set_healthy(&self, healthy: bool) {
		if let Some(flag) = &self.healthy {
			flag.store(healthy, Ordering::SeqCst);
		}
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl BlobFetcher for MemoryIndexData {
	fn fetch<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Vec<u8>, FetchError>> {
		Box::pin(async move {
			self.calls.fetch_add(1, Ordering::SeqCst);
			self.knobs.wait().await;

			if self.broken.lock().unwrap_or_else(|err| err.into_inner()).iter().any(|b| b == id) {
				return Err(FetchError::Backend { message: format!("Backend failed for {id:?}.") });
			}

			self.blobs
				.lock()
				.unwrap_or_else(|err| err.into_inner())
				.get(id)
				.cloned()
				.ok_or_else(|| FetchError::NotFound { id: id.to_string() })
		})
	}

	fn pinger(&self) -> Option<&dyn Pinger> {
		self.healthy.as_ref().map(|_| self as &dyn Pinger)
	}

	fn counter(&self) -> Option<&dyn Counter> {
		self.healthy.as_ref().map(|_| self as &dyn Counter)
	}
}
impl Pinger for MemoryIndexData {
	fn ping(&self) -> BoxFuture<'_, Result<()>> {
		Box::pin(async move {
			match &self.healthy {
				Some(flag) if !flag.load(Ordering::SeqCst) =>
					Err(Error::IndexData { message: "Index data store is unavailable.".to_string() }),
				_ => Ok(()),
			}
		})
	}
}
impl Counter for MemoryIndexData {
	fn count(&self) -> BoxFuture<'_, Result<u64>> {
		Box::pin(async move {
			Ok(self.blobs.lock().unwrap_or_else(|err| err.into_inner()).len() as u64)
		})
	}
}
