//! Index data (metadata blob) access.
//!
//! A fetcher answers an opaque payload per local identifier. A miss is its own error kind
//! because the resolver skips missing records instead of failing the request.

use std::sync::Arc;

use ckit_config::{IndexData, IndexDataBackend};
use ckit_index::IndexClient;
use ckit_storage::{db::Db, index_data::IndexDataDb};

use crate::{BoxFuture, Error, Result};

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
	#[error("No index data for {id:?}.")]
	NotFound { id: String },
	#[error("{message}")]
	Backend { message: String },
}
impl FetchError {
	pub fn is_not_found(&self) -> bool {
		matches!(self, Self::NotFound { .. })
	}
}

pub trait BlobFetcher
where
	Self: Send + Sync,
{
	fn fetch<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Vec<u8>, FetchError>>;

	/// Health capability. Fetchers without one are reported with unknown status.
	fn pinger(&self) -> Option<&dyn Pinger> {
		None
	}

	/// Size capability, used by the store info report.
	fn counter(&self) -> Option<&dyn Counter> {
		None
	}
}

pub trait Pinger
where
	Self: Send + Sync,
{
	fn ping(&self) -> BoxFuture<'_, Result<()>>;
}

pub trait Counter
where
	Self: Send + Sync,
{
	fn count(&self) -> BoxFuture<'_, Result<u64>>;
}

/// Several index data backends asked in order, e.g. a daily main index in front of a
/// monthly secondary one. A miss falls through to the next member; any other error stops.
#[derive(Clone, Default)]
pub struct FetchGroup {
	members: Vec<Arc<dyn BlobFetcher>>,
}
impl FetchGroup {
	pub fn new(members: Vec<Arc<dyn BlobFetcher>>) -> Self {
		Self { members }
	}

	pub fn push(&mut self, member: Arc<dyn BlobFetcher>) {
		self.members.push(member);
	}

	pub fn len(&self) -> usize {
		self.members.len()
	}

	pub fn is_empty(&self) -> bool {
		self.members.is_empty()
	}

	pub async fn connect(cfg: &IndexData) -> Result<Self> {
		let mut group = Self::default();

		for backend in &cfg.backends {
			let member: Arc<dyn BlobFetcher> = match backend {
				IndexDataBackend::Http { url } => {
					let client = IndexClient::new(url, cfg.timeout())
						.map_err(|err| Error::IndexData { message: err.to_string() })?;

					Arc::new(client)
				},
				IndexDataBackend::Postgres(pg) => {
					let store = IndexDataDb::new(Db::connect(pg).await?);

					store.ensure_schema().await?;

					Arc::new(store)
				},
			};

			group.push(member);
		}

		Ok(group)
	}
}
impl BlobFetcher for FetchGroup {
	fn fetch<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Vec<u8>, FetchError>> {
		Box::pin(async move {
			for member in &self.members {
				match member.fetch(id).await {
					Err(err) if err.is_not_found() => continue,
					result => return result,
				}
			}

			Err(FetchError::NotFound { id: id.to_string() })
		})
	}

	fn pinger(&self) -> Option<&dyn Pinger> {
		if self.members.iter().any(|member| member.pinger().is_some()) { Some(self) } else { None }
	}

	fn counter(&self) -> Option<&dyn Counter> {
		if self.members.iter().any(|member| member.counter().is_some()) {
			Some(self)
		} else {
			None
		}
	}
}
impl Pinger for FetchGroup {
	fn ping(&self) -> BoxFuture<'_, Result<()>> {
		Box::pin(async move {
			for pinger in self.members.iter().filter_map(|member| member.pinger()) {
				pinger.ping().await?;
			}

			Ok(())
		})
	}
}
impl Counter for FetchGroup {
	/// Sum over members that can count; records present in several members count twice.
	fn count(&self) -> BoxFuture<'_, Result<u64>> {
		Box::pin(async move {
			let mut total = 0_u64;

			for counter in self.members.iter().filter_map(|member| member.counter()) {
				total = total.saturating_add(counter.count().await?);
			}

			Ok(total)
		})
	}
}

impl From<ckit_index::Error> for FetchError {
	fn from(err: ckit_index::Error) -> Self {
		match err {
			ckit_index::Error::NotFound { id } => Self::NotFound { id },
			other => Self::Backend { message: other.to_string() },
		}
	}
}

impl BlobFetcher for IndexClient {
	fn fetch<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Vec<u8>, FetchError>> {
		Box::pin(async move { Ok(IndexClient::fetch(self, id).await?) })
	}

	fn pinger(&self) -> Option<&dyn Pinger> {
		Some(self)
	}

	fn counter(&self) -> Option<&dyn Counter> {
		Some(self)
	}
}
impl Pinger for IndexClient {
	fn ping(&self) -> BoxFuture<'_, Result<()>> {
		Box::pin(async move {
			IndexClient::ping(self).await.map_err(|err| Error::IndexData {
				message: format!("Could not reach index data service at {}: {err}", self.base()),
			})
		})
	}
}
impl Counter for IndexClient {
	fn count(&self) -> BoxFuture<'_, Result<u64>> {
		Box::pin(async move { Ok(IndexClient::count(self).await?) })
	}
}

impl BlobFetcher for IndexDataDb {
	fn fetch<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Vec<u8>, FetchError>> {
		Box::pin(async move {
			IndexDataDb::blob(self, id).await.map_err(|err| match err {
				ckit_storage::Error::NotFound(_) => FetchError::NotFound { id: id.to_string() },
				other => FetchError::Backend { message: other.to_string() },
			})
		})
	}

	fn pinger(&self) -> Option<&dyn Pinger> {
		Some(self)
	}

	fn counter(&self) -> Option<&dyn Counter> {
		Some(self)
	}
}
impl Pinger for IndexDataDb {
	fn ping(&self) -> BoxFuture<'_, Result<()>> {
		Box::pin(async move { Ok(self.db.ping().await?) })
	}
}
impl Counter for IndexDataDb {
	fn count(&self) -> BoxFuture<'_, Result<u64>> {
		Box::pin(async move { Ok(IndexDataDb::count(self).await?) })
	}
}
