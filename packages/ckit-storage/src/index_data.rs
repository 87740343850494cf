use crate::{Error, Result, db::Db, schema};

/// Metadata blobs kept in a Postgres table instead of a separate service.
#[derive(Debug, Clone)]
pub struct IndexDataDb {
	pub db: Db,
}
impl IndexDataDb {
	pub fn new(db: Db) -> Self {
		Self { db }
	}

	pub async fn ensure_schema(&self) -> Result<()> {
		self.db.ensure_schema(schema::INDEX_DATA).await
	}

	pub async fn blob(&self, id: &str) -> Result<Vec<u8>> {
		let blob: Option<String> = sqlx::query_scalar("SELECT v FROM index_data WHERE k = $1")
			.bind(id)
			.fetch_optional(&self.db.pool)
			.await?;

		blob.map(String::into_bytes)
			.ok_or_else(|| Error::NotFound(format!("no index data for identifier {id:?}")))
	}

	pub async fn count(&self) -> Result<u64> {
		let count: i64 =
			sqlx::query_scalar("SELECT count(*) FROM index_data").fetch_one(&self.db.pool).await?;

		Ok(count.max(0) as u64)
	}
}
