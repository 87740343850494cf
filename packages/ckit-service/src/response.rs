use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

/// Index metadata fused with citation data for one local identifier.
///
/// Matched documents are forwarded as the raw blobs the index data store returned. Related
/// DOIs without a local record are listed as `{"doi": ...}` stubs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
	pub id: String,
	pub doi: String,
	#[serde(default)]
	pub citing: Vec<Box<RawValue>>,
	#[serde(default)]
	pub cited: Vec<Box<RawValue>>,
	#[serde(default)]
	pub unmatched: Unmatched,
	#[serde(default)]
	pub extra: Extra,
}
impl Response {
	pub fn new(id: impl Into<String>, doi: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			doi: doi.into(),
			citing: Vec::new(),
			cited: Vec::new(),
			unmatched: Unmatched::default(),
			extra: Extra::default(),
		}
	}

	pub fn update_counts(&mut self) {
		self.extra.citing_count = self.citing.len();
		self.extra.cited_count = self.cited.len();
		self.extra.unmatched_citing_count = self.unmatched.citing.len();
		self.extra.unmatched_cited_count = self.unmatched.cited.len();
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Unmatched {
	pub citing: Vec<DocStub>,
	pub cited: Vec<DocStub>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocStub {
	pub doi: String,
}

/// `took` must stay the first field: cache hits rewrite it in place by pattern.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Extra {
	/// Seconds.
	pub took: f64,
	pub unmatched_citing_count: usize,
	pub unmatched_cited_count: usize,
	pub citing_count: usize,
	pub cited_count: usize,
	pub cached: bool,
}
