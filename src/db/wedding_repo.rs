use futures::future::BoxFuture;
use sqlx::{Sqlite, SqlitePool, Transaction};

use weddingcard_core::models::{WeddingDetails, WeddingPatch, WeddingRecord};
use weddingcard_core::store::ids::{new_record_id, random_shareable_id, MAX_ID_ATTEMPTS};
use weddingcard_core::store::{RecordStore, StoreError, StoreResult};

use super::parse_timestamp;

/// SQLite-backed record store.
///
/// The record content is kept as a JSON document; `id`, `shareable_id` and
/// `owner` are unique columns so every lookup is an indexed query.
#[derive(Clone)]
pub struct WeddingRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct WeddingRow {
    id: String,
    shareable_id: String,
    owner: String,
    body: String,
    created_at: String,
    updated_at: String,
}

impl WeddingRow {
    fn into_record(self) -> Result<WeddingRecord, sqlx::Error> {
        let details: WeddingDetails =
            serde_json::from_str(&self.body).map_err(|e| sqlx::Error::ColumnDecode {
                index: "body".to_string(),
                source: Box::new(e),
            })?;

        Ok(WeddingRecord {
            id: self.id,
            shareable_id: self.shareable_id,
            owner_session: self.owner,
            created_at: parse_timestamp("created_at", &self.created_at)?,
            updated_at: parse_timestamp("updated_at", &self.updated_at)?,
            details,
        })
    }
}

fn unavailable(e: sqlx::Error) -> StoreError {
    tracing::error!("Database error: {}", e);
    StoreError::Unavailable(e.to_string())
}

fn encode_body(details: &WeddingDetails) -> Result<String, sqlx::Error> {
    serde_json::to_string(details).map_err(|e| sqlx::Error::Encode(Box::new(e)))
}

impl WeddingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, column: &str, value: &str) -> Result<Option<WeddingRecord>, sqlx::Error> {
        let sql = format!("SELECT * FROM weddings WHERE {} = ?", column);
        let row: Option<WeddingRow> = sqlx::query_as(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        row.map(WeddingRow::into_record).transpose()
    }

    pub async fn find_by_owner(&self, owner: &str) -> Result<Option<WeddingRecord>, sqlx::Error> {
        self.find_one("owner", owner).await
    }

    pub async fn find_by_shareable_id(
        &self,
        shareable_id: &str,
    ) -> Result<Option<WeddingRecord>, sqlx::Error> {
        self.find_one("shareable_id", shareable_id).await
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<WeddingRecord>, sqlx::Error> {
        self.find_one("id", id).await
    }

    /// Merges `patch` into the owner's record, creating it on first save.
    pub async fn save(&self, owner: &str, patch: &WeddingPatch) -> StoreResult<WeddingRecord> {
        let mut tx = self.pool.begin().await.map_err(unavailable)?;

        let existing: Option<WeddingRow> = sqlx::query_as("SELECT * FROM weddings WHERE owner = ?")
            .bind(owner)
            .fetch_optional(&mut *tx)
            .await
            .map_err(unavailable)?;

        let record = match existing {
            Some(row) => {
                let mut record = row.into_record().map_err(unavailable)?;
                record.merge(patch);
                let body = encode_body(&record.details).map_err(unavailable)?;

                sqlx::query("UPDATE weddings SET body = ?, updated_at = ? WHERE id = ?")
                    .bind(&body)
                    .bind(record.updated_at.to_rfc3339())
                    .bind(&record.id)
                    .execute(&mut *tx)
                    .await
                    .map_err(unavailable)?;
                record
            }
            None => {
                let id = new_record_id();
                let shareable_id = allocate_shareable_id(&mut tx, &id).await?;
                let record = WeddingRecord::create(id, shareable_id, owner, patch);
                let body = encode_body(&record.details).map_err(unavailable)?;

                sqlx::query(
                    r#"
                    INSERT INTO weddings (id, shareable_id, owner, body, created_at, updated_at)
                    VALUES (?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(&record.id)
                .bind(&record.shareable_id)
                .bind(owner)
                .bind(&body)
                .bind(record.created_at.to_rfc3339())
                .bind(record.updated_at.to_rfc3339())
                .execute(&mut *tx)
                .await
                .map_err(unavailable)?;

                tracing::info!(id = %record.id, shareable_id = %record.shareable_id, "Created wedding");
                record
            }
        };

        tx.commit().await.map_err(unavailable)?;
        Ok(record)
    }
}

/// Draws shareable ids until one collides with no `id` or `shareable_id`.
async fn allocate_shareable_id(
    tx: &mut Transaction<'_, Sqlite>,
    new_id: &str,
) -> StoreResult<String> {
    for _ in 0..MAX_ID_ATTEMPTS {
        let candidate = random_shareable_id();
        if candidate == new_id {
            continue;
        }

        let taken: Option<(String,)> =
            sqlx::query_as("SELECT id FROM weddings WHERE shareable_id = ? OR id = ?")
                .bind(&candidate)
                .bind(&candidate)
                .fetch_optional(&mut **tx)
                .await
                .map_err(unavailable)?;

        if taken.is_none() {
            return Ok(candidate);
        }
        tracing::debug!(candidate = %candidate, "Shareable id collision");
    }

    tracing::error!("Gave up allocating a shareable id");
    Err(StoreError::IdsExhausted(MAX_ID_ATTEMPTS))
}

impl RecordStore for WeddingRepository {
    fn upsert<'a>(
        &'a self,
        owner: &'a str,
        patch: &'a WeddingPatch,
    ) -> BoxFuture<'a, StoreResult<WeddingRecord>> {
        Box::pin(self.save(owner, patch))
    }

    fn get_by_owner<'a>(
        &'a self,
        owner: &'a str,
    ) -> BoxFuture<'a, StoreResult<Option<WeddingRecord>>> {
        Box::pin(async move { self.find_by_owner(owner).await.map_err(unavailable) })
    }

    fn get_by_shareable_id<'a>(
        &'a self,
        shareable_id: &'a str,
    ) -> BoxFuture<'a, StoreResult<Option<WeddingRecord>>> {
        Box::pin(async move {
            self.find_by_shareable_id(shareable_id)
                .await
                .map_err(unavailable)
        })
    }

    fn get_by_id<'a>(&'a self, id: &'a str) -> BoxFuture<'a, StoreResult<Option<WeddingRecord>>> {
        Box::pin(async move { self.find_by_id(id).await.map_err(unavailable) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use tempfile::TempDir;
    use weddingcard_core::models::{Faq, Theme};

    async fn setup() -> (WeddingRepository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_db(&temp_dir.path().join("test.db")).await.unwrap();
        (WeddingRepository::new(pool), temp_dir)
    }

    #[tokio::test]
    async fn test_first_save_creates_from_template() {
        let (repo, _temp) = setup().await;

        let record = repo
            .upsert("user-1", &WeddingPatch::new().couple_name_1("Ana"))
            .await
            .unwrap();

        assert_eq!(record.details.couple_name_1, "Ana");
        assert_eq!(record.details.couple_name_2, "Michael");
        assert_eq!(record.owner_session, "user-1");
        assert_eq!(record.shareable_id.len(), 8);
        assert_eq!(repo.find_by_owner("user-1").await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn test_merge_keeps_identity_and_replaces_arrays() {
        let (repo, _temp) = setup().await;

        let first = repo
            .upsert("user-1", &WeddingPatch::new().theme(Theme::Boho))
            .await
            .unwrap();

        let faqs = vec![Faq {
            question: "Parking?".into(),
            answer: "On site".into(),
        }];
        let second = repo
            .upsert("user-1", &WeddingPatch::new().faqs(faqs.clone()))
            .await
            .unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.shareable_id, first.shareable_id);
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(second.details.theme, Theme::Boho);
        assert_eq!(second.details.faqs, faqs);

        let fetched = repo.get_by_owner("user-1").await.unwrap().unwrap();
        assert_eq!(fetched, second);
    }

    #[tokio::test]
    async fn test_lookups_are_isolated() {
        let (repo, _temp) = setup().await;
        let a = repo
            .upsert("user-a", &WeddingPatch::new().couple_name_1("A"))
            .await
            .unwrap();
        let b = repo
            .upsert("user-b", &WeddingPatch::new().couple_name_1("B"))
            .await
            .unwrap();

        assert_ne!(a.shareable_id, b.shareable_id);

        let by_share = repo.get_by_shareable_id(&b.shareable_id).await.unwrap().unwrap();
        assert_eq!(by_share.details.couple_name_1, "B");

        let by_id = repo.get_by_id(&a.id).await.unwrap().unwrap();
        assert_eq!(by_id.details.couple_name_1, "A");

        assert!(repo.get_by_shareable_id("abc123").await.unwrap().is_none());
        assert!(repo.get_by_id(&a.shareable_id).await.unwrap().is_none());
        assert!(repo.get_by_owner("user-c").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_closed_pool_is_unavailable() {
        let (repo, _temp) = setup().await;
        repo.pool.close().await;

        let err = repo.get_by_owner("user-1").await.unwrap_err();
        assert!(err.is_retryable());
    }
}
