//! Tables are filled by external loaders; the service only reads them.

/// Local identifier (`k`) to DOI (`v`). A DOI may belong to several local records.
pub const IDENTIFIER_MAP: &str = "\
CREATE TABLE IF NOT EXISTS identifier_map (
	k TEXT PRIMARY KEY,
	v TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS identifier_map_v_idx ON identifier_map (v)";

/// Citing DOI (`k`) to cited DOI (`v`), indexed for lookups from either end.
pub const CITATION_MAP: &str = "\
CREATE TABLE IF NOT EXISTS citation_map (
	k TEXT NOT NULL,
	v TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS citation_map_k_idx ON citation_map (k);
CREATE INDEX IF NOT EXISTS citation_map_v_idx ON citation_map (v)";

/// Local identifier (`k`) to metadata blob (`v`).
pub const INDEX_DATA: &str = "\
CREATE TABLE IF NOT EXISTS index_data (
	k TEXT PRIMARY KEY,
	v TEXT NOT NULL
)";

pub fn statements(sql: &str) -> impl Iterator<Item = &str> {
	sql.split(';').map(str::trim).filter(|statement| !statement.is_empty())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn splits_into_non_empty_statements() {
		assert_eq!(statements(IDENTIFIER_MAP).count(), 2);
		assert_eq!(statements(CITATION_MAP).count(), 3);
		assert_eq!(statements(INDEX_DATA).count(), 1);
		assert!(statements(CITATION_MAP).all(|statement| statement.starts_with("CREATE")));
	}
}
