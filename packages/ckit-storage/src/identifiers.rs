use crate::{Error, Result, db::Db, models::IdMapping, schema};

#[derive(Debug, Clone)]
pub struct IdentifierDb {
	pub db: Db,
}
impl IdentifierDb {
	pub fn new(db: Db) -> Self {
		Self { db }
	}

	pub async fn ensure_schema(&self) -> Result<()> {
		self.db.ensure_schema(schema::IDENTIFIER_MAP).await
	}

	pub async fn doi_for_id(&self, id: &str) -> Result<String> {
		sqlx::query_scalar("SELECT v FROM identifier_map WHERE k = $1")
			.bind(id)
			.fetch_optional(&self.db.pool)
			.await?
			.ok_or_else(|| Error::NotFound(format!("no DOI for identifier {id:?}")))
	}

	/// Some local record carrying `doi`; the lowest identifier when there are several.
	pub async fn id_for_doi(&self, doi: &str) -> Result<String> {
		sqlx::query_scalar("SELECT k FROM identifier_map WHERE v = $1 ORDER BY k LIMIT 1")
			.bind(doi)
			.fetch_optional(&self.db.pool)
			.await?
			.ok_or_else(|| Error::NotFound(format!("no identifier for DOI {doi:?}")))
	}

	/// One set-membership query for the whole batch. DOIs without a local record are simply
	/// absent from the result.
	pub async fn ids_for_dois(&self, dois: &[String]) -> Result<Vec<IdMapping>> {
		if dois.is_empty() {
			return Ok(Vec::new());
		}

		let rows = sqlx::query_as::<_, IdMapping>(
			"\
SELECT k, v
FROM identifier_map
WHERE v = ANY($1)
ORDER BY k",
		)
		.bind(dois)
		.fetch_all(&self.db.pool)
		.await?;

		Ok(rows)
	}

	pub async fn count(&self) -> Result<u64> {
		let count: i64 =
			sqlx::query_scalar("SELECT count(*) FROM identifier_map").fetch_one(&self.db.pool).await?;

		Ok(count.max(0) as u64)
	}
}
