//! The citation join: local id -> DOI -> citation edges -> local ids -> index data blobs.

use serde_json::value::RawValue;
use tokio::time::{self, Instant};

use ckit_domain::{Direction, Set, took};

use crate::{
	CkitService, Error, Result,
	cache::{self, Lookup},
	response::{DocStub, Response},
	stopwatch::Stopwatch,
};

/// Outcome of a successful resolution.
#[derive(Debug)]
pub enum Resolution {
	/// Bytes stored by an earlier slow resolution, with `extra.took` rewritten for this
	/// request.
	Cached(Vec<u8>),
	Resolved(Response),
	/// The DOI has no citation edges in either direction.
	NoRelated { id: String, doi: String },
}
impl Resolution {
	pub fn into_body(self) -> Result<Vec<u8>> {
		match self {
			Self::Cached(body) => Ok(body),
			Self::Resolved(response) => Ok(serde_json::to_vec(&response)?),
			Self::NoRelated { id, doi } =>
				Ok(serde_json::to_vec(&serde_json::json!({ "id": id, "doi": doi }))?),
		}
	}
}

impl CkitService {
	pub async fn resolve(&self, id: &str) -> Result<Resolution> {
		let started = Instant::now();
		let mut sw = Stopwatch::new(self.settings.stopwatch);
		let outcome = time::timeout(self.settings.request_timeout, self.resolve_id(id, started, &mut sw))
			.await
			.map_err(|_| Error::Canceled)
			.and_then(|result| result);

		sw.log(id);

		outcome
	}

	/// Reverse lookup backing the DOI redirect.
	pub async fn resolve_doi(&self, doi: &str) -> Result<String> {
		time::timeout(self.settings.request_timeout, self.stores.identifiers.id_for_doi(doi))
			.await
			.map_err(|_| Error::Canceled)?
	}

	async fn resolve_id(&self, id: &str, started: Instant, sw: &mut Stopwatch) -> Result<Resolution> {
		if let Some(cache) = self.cache.as_deref() {
			match cache::lookup(cache, id) {
				Lookup::Hit(body) => {
					sw.record("served from cache");

					let body = took::patch_took(&body, started.elapsed()).unwrap_or(body);

					return Ok(Resolution::Cached(body));
				},
				Lookup::Corrupt => {
					cache.delete(id);

					tracing::warn!(id, "Evicted corrupt cache entry.");
				},
				Lookup::Miss => {},
			}
		}

		let doi = self.stores.identifiers.doi_for_id(id).await?;

		sw.record("found doi");

		let edges = self.stores.citations.edges(&doi).await?;
		let outbound = edges.citing.into_iter().collect::<Set<_>>();
		let inbound = edges.cited.into_iter().collect::<Set<_>>();

		sw.record(format_args!(
			"found {} outbound and {} inbound edges",
			outbound.len(),
			inbound.len()
		));

		let related = outbound.union(&inbound);

		if related.is_empty() {
			return Ok(Resolution::NoRelated { id: id.to_string(), doi });
		}

		let mappings = self.stores.identifiers.ids_for_dois(&related.to_sorted_vec()).await?;
		let matched = mappings.iter().map(|mapping| mapping.doi.clone()).collect::<Set<_>>();
		let unmatched = related.difference(&matched);

		sw.record(format_args!("mapped {} dois back to ids", mappings.len()));

		let mut response = Response::new(id, doi);

		for doi in unmatched.to_sorted_vec() {
			let list = match Direction::classify(&doi, &outbound, &inbound) {
				Some(Direction::Citing) => &mut response.unmatched.citing,
				Some(Direction::Cited) => &mut response.unmatched.cited,
				None => {
					return Err(Error::invariant(format!(
						"Unmatched DOI {doi:?} is neither citing nor cited."
					)));
				},
			};

			list.push(DocStub { doi });
		}

		sw.record("recorded unmatched ids");

		for mapping in &mappings {
			let Some(direction) = Direction::classify(&mapping.doi, &outbound, &inbound) else {
				return Err(Error::invariant(format!(
					"Matched DOI {:?} is neither citing nor cited.",
					mapping.doi
				)));
			};
			let blob = match self.stores.index_data.fetch(&mapping.id).await {
				Ok(blob) => blob,
				Err(err) if err.is_not_found() => continue,
				Err(err) => return Err(err.into()),
			};
			let blob = raw_blob(&mapping.id, blob)?;

			match direction {
				Direction::Citing => response.citing.push(blob),
				Direction::Cited => response.cited.push(blob),
			}
		}

		sw.record(format_args!(
			"fetched {} blobs",
			response.citing.len() + response.cited.len()
		));
		response.update_counts();

		let elapsed = started.elapsed();

		response.extra.took = elapsed.as_secs_f64();

		if let Some(cache) = self.cache.as_deref()
			&& elapsed > self.settings.cache_trigger
		{
			response.extra.cached = true;

			cache.set(id, serde_json::to_vec(&response)?, self.settings.cache_ttl);
			sw.record("encoded and cached");
		}

		Ok(Resolution::Resolved(response))
	}
}

fn raw_blob(id: &str, blob: Vec<u8>) -> Result<Box<RawValue>> {
	let text = String::from_utf8(blob).map_err(|err| Error::IndexData {
		message: format!("Index data for {id:?} is not UTF-8: {err}"),
	})?;

	RawValue::from_string(text).map_err(|err| Error::IndexData {
		message: format!("Index data for {id:?} is not JSON: {err}"),
	})
}
