//! Client for a key-value index data service (microblob style).
//!
//! `GET {base}/{id}` answers the raw metadata blob, `404` when the id is unknown, and
//! `GET {base}/count` answers `{"count": n}`.

mod error;

pub use error::{Error, Result};

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};

#[derive(Debug, Clone)]
pub struct IndexClient {
	client: Client,
	base: Url,
}
impl IndexClient {
	pub fn new(base: &str, timeout: Duration) -> Result<Self> {
		let base = Url::parse(base).map_err(|err| Error::InvalidConfig {
			message: format!("Invalid index data URL {base:?}: {err}."),
		})?;

		if base.cannot_be_a_base() {
			return Err(Error::InvalidConfig {
				message: format!("Index data URL {base} cannot be used as a base."),
			});
		}

		let client = Client::builder().timeout(timeout).build()?;

		Ok(Self { client, base })
	}

	pub fn base(&self) -> &Url {
		&self.base
	}

	pub async fn fetch(&self, id: &str) -> Result<Vec<u8>> {
		let res = self.client.get(self.blob_url(id)).send().await?;

		if res.status() == StatusCode::NOT_FOUND {
			return Err(Error::NotFound { id: id.to_string() });
		}

		let bytes = res.error_for_status()?.bytes().await?;

		Ok(bytes.to_vec())
	}

	pub async fn ping(&self) -> Result<()> {
		self.client.get(self.base.clone()).send().await?.error_for_status()?;

		Ok(())
	}

	pub async fn count(&self) -> Result<u64> {
		#[derive(serde::Deserialize)]
		struct CountResponse {
			count: u64,
		}

		let res = self.client.get(self.blob_url("count")).send().await?.error_for_status()?;
		let body: CountResponse = res.json().await.map_err(|err| Error::InvalidResponse {
			message: format!("Index data count response is malformed: {err}."),
		})?;

		Ok(body.count)
	}

	/// Appends `id` as a single, percent-encoded path segment.
	pub fn blob_url(&self, id: &str) -> Url {
		let mut url = self.base.clone();

		if let Ok(mut segments) = url.path_segments_mut() {
			segments.pop_if_empty().push(id);
		}

		url
	}
}
