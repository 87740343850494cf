use serde::{Deserialize, Serialize};

use crate::{CkitService, Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreStatus {
	Ok,
	/// The store exposes no health signal.
	Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
	pub identifiers: StoreStatus,
	pub citations: StoreStatus,
	pub index_data: StoreStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreInfo {
	pub identifier_database_count: u64,
	pub oci_database_count: u64,
	/// `None` when no index data backend can count its records.
	pub index_data_count: Option<u64>,
}

impl CkitService {
	/// Succeeds only when every store answers; the index data store may report unknown.
	pub async fn ping(&self) -> Result<HealthReport> {
		self.stores.identifiers.ping().await.map_err(|err| labelled("identifier store", err))?;
		self.stores.citations.ping().await.map_err(|err| labelled("citation store", err))?;

		let index_data = match self.stores.index_data.pinger() {
			Some(pinger) => {
				pinger.ping().await.map_err(|err| labelled("index data store", err))?;

				StoreStatus::Ok
			},
			None => StoreStatus::Unknown,
		};

		Ok(HealthReport { identifiers: StoreStatus::Ok, citations: StoreStatus::Ok, index_data })
	}

	pub async fn info(&self) -> Result<StoreInfo> {
		let index_data = async {
			match self.stores.index_data.counter() {
				Some(counter) => counter.count().await.map(Some),
				None => Ok(None),
			}
		};
		let (identifier_database_count, oci_database_count, index_data_count) = tokio::try_join!(
			self.stores.identifiers.count(),
			self.stores.citations.count(),
			index_data,
		)?;

		Ok(StoreInfo { identifier_database_count, oci_database_count, index_data_count })
	}
}

fn labelled(store: &str, err: Error) -> Error {
	match err {
		Error::Storage { message } => Error::Storage { message: format!("{store}: {message}") },
		Error::IndexData { message } => Error::IndexData { message: format!("{store}: {message}") },
		other => other,
	}
}
