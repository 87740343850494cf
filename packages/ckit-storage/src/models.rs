/// One row of the identifier map: a local record and its DOI.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct IdMapping {
	#[sqlx(rename = "k")]
	pub id: String,
	#[sqlx(rename = "v")]
	pub doi: String,
}

/// DOIs adjacent to one document in the citation graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Edges {
	/// DOIs the document cites.
	pub citing: Vec<String>,
	/// DOIs that cite the document.
	pub cited: Vec<String>,
}
impl Edges {
	pub fn is_empty(&self) -> bool {
		self.citing.is_empty() && self.cited.is_empty()
	}
}
