use crate::{Result, db::Db, models::Edges, schema};

#[derive(Debug, Clone)]
pub struct CitationDb {
	pub db: Db,
}
impl CitationDb {
	pub fn new(db: Db) -> Self {
		Self { db }
	}

	pub async fn ensure_schema(&self) -> Result<()> {
		self.db.ensure_schema(schema::CITATION_MAP).await
	}

	pub async fn edges(&self, doi: &str) -> Result<Edges> {
		let citing: Vec<String> =
			sqlx::query_scalar("SELECT v FROM citation_map WHERE k = $1 ORDER BY v")
				.bind(doi)
				.fetch_all(&self.db.pool)
				.await?;
		let cited: Vec<String> =
			sqlx::query_scalar("SELECT k FROM citation_map WHERE v = $1 ORDER BY k")
				.bind(doi)
				.fetch_all(&self.db.pool)
				.await?;

		Ok(Edges { citing, cited })
	}

	pub async fn count(&self) -> Result<u64> {
		let count: i64 =
			sqlx::query_scalar("SELECT count(*) FROM citation_map").fetch_one(&self.db.pool).await?;

		Ok(count.max(0) as u64)
	}
}
