pub mod cache;
pub mod fetch;
pub mod health;
pub mod resolve;
pub mod response;
pub mod stopwatch;

mod error;

use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use ckit_config::Config;
use ckit_storage::{citations::CitationDb, db::Db, identifiers::IdentifierDb};

pub use cache::{MemoryCache, ResultCache};
pub use ckit_storage::models::{Edges, IdMapping};
pub use error::{Error, Result};
pub use fetch::{BlobFetcher, Counter, FetchError, FetchGroup, Pinger};
pub use health::{HealthReport, StoreInfo, StoreStatus};
pub use resolve::Resolution;
pub use response::{DocStub, Extra, Response, Unmatched};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Local identifier to DOI table, readable in both directions.
pub trait IdentifierStore
where
	Self: Send + Sync,
{
	/// Fails with [`Error::NotFound`] when the identifier is unknown.
	fn doi_for_id<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<String>>;

	/// Fails with [`Error::NotFound`] when no local record carries the DOI.
	fn id_for_doi<'a>(&'a self, doi: &'a str) -> BoxFuture<'a, Result<String>>;

	/// Batch join in a single round trip. DOIs without a local record are left out of the
	/// result; an empty input must not reach the backing store.
	fn ids_for_dois<'a>(&'a self, dois: &'a [String]) -> BoxFuture<'a, Result<Vec<IdMapping>>>;

	fn ping(&self) -> BoxFuture<'_, Result<()>>;

	fn count(&self) -> BoxFuture<'_, Result<u64>>;
}

/// Citation edges keyed by DOI.
pub trait CitationStore
where
	Self: Send + Sync,
{
	/// Both lists may be empty; that is an answer, not an error.
	fn edges<'a>(&'a self, doi: &'a str) -> BoxFuture<'a, Result<Edges>>;

	fn ping(&self) -> BoxFuture<'_, Result<()>>;

	fn count(&self) -> BoxFuture<'_, Result<u64>>;
}

#[derive(Debug, Clone)]
pub struct Settings {
	/// Upper bound for one resolution; expiry surfaces as [`Error::Canceled`].
	pub request_timeout: Duration,
	pub stopwatch: bool,
	/// Resolutions at or below this duration are never cached.
	pub cache_trigger: Duration,
	pub cache_ttl: Duration,
}
impl Settings {
	pub fn from_config(cfg: &Config) -> Self {
		Self {
			request_timeout: cfg.service.request_timeout(),
			stopwatch: cfg.service.stopwatch,
			cache_trigger: cfg.cache.trigger(),
			cache_ttl: cfg.cache.ttl(),
		}
	}
}
impl Default for Settings {
	fn default() -> Self {
		Self {
			request_timeout: Duration::from_secs(30),
			stopwatch: false,
			cache_trigger: Duration::from_millis(250),
			cache_ttl: Duration::from_secs(8 * 60 * 60),
		}
	}
}

#[derive(Clone)]
pub struct Stores {
	pub identifiers: Arc<dyn IdentifierStore>,
	pub citations: Arc<dyn CitationStore>,
	pub index_data: Arc<dyn BlobFetcher>,
}
impl Stores {
	pub fn new(
		identifiers: Arc<dyn IdentifierStore>,
		citations: Arc<dyn CitationStore>,
		index_data: Arc<dyn BlobFetcher>,
	) -> Self {
		Self { identifiers, citations, index_data }
	}

	/// Connects every configured backend and makes sure the read tables exist.
	pub async fn connect(cfg: &Config) -> Result<Self> {
		let identifiers = IdentifierDb::new(Db::connect(&cfg.storage.identifiers).await?);

		identifiers.ensure_schema().await?;

		let citations = CitationDb::new(Db::connect(&cfg.storage.citations).await?);

		citations.ensure_schema().await?;

		let index_data = FetchGroup::connect(&cfg.index_data).await?;

		Ok(Self::new(Arc::new(identifiers), Arc::new(citations), Arc::new(index_data)))
	}
}

pub struct CkitService {
	pub settings: Settings,
	pub stores: Stores,
	/// `None` when caching is disabled.
	pub cache: Option<Arc<dyn ResultCache>>,
}
impl CkitService {
	pub fn new(settings: Settings, stores: Stores) -> Self {
		Self { settings, stores, cache: None }
	}

	pub fn with_cache(settings: Settings, stores: Stores, cache: Arc<dyn ResultCache>) -> Self {
		Self { settings, stores, cache: Some(cache) }
	}

	/// `None` when caching is disabled.
	pub fn cache_size(&self) -> Option<usize> {
		self.cache.as_ref().map(|cache| cache.len())
	}

	/// Returns `false` when caching is disabled.
	pub fn flush_cache(&self) -> bool {
		let Some(cache) = self.cache.as_ref() else {
			return false;
		};

		cache.flush();

		tracing::info!("Flushed result cache.");

		true
	}
}

impl IdentifierStore for IdentifierDb {
	fn doi_for_id<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<String>> {
		Box::pin(async move { Ok(IdentifierDb::doi_for_id(self, id).await?) })
	}

	fn id_for_doi<'a>(&'a self, doi: &'a str) -> BoxFuture<'a, Result<String>> {
		Box::pin(async move { Ok(IdentifierDb::id_for_doi(self, doi).await?) })
	}

	fn ids_for_dois<'a>(&'a self, dois: &'a [String]) -> BoxFuture<'a, Result<Vec<IdMapping>>> {
		Box::pin(async move { Ok(IdentifierDb::ids_for_dois(self, dois).await?) })
	}

	fn ping(&self) -> BoxFuture<'_, Result<()>> {
		Box::pin(async move { Ok(self.db.ping().await?) })
	}

	fn count(&self) -> BoxFuture<'_, Result<u64>> {
		Box::pin(async move { Ok(IdentifierDb::count(self).await?) })
	}
}

impl CitationStore for CitationDb {
	fn edges<'a>(&'a self, doi: &'a str) -> BoxFuture<'a, Result<Edges>> {
		Box::pin(async move { Ok(CitationDb::edges(self, doi).await?) })
	}

	fn ping(&self) -> BoxFuture<'_, Result<()>> {
		Box::pin(async move { Ok(self.db.ping().await?) })
	}

	fn count(&self) -> BoxFuture<'_, Result<u64>> {
		Box::pin(async move { Ok(CitationDb::count(self).await?) })
	}
}
