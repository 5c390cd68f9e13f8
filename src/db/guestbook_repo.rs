use sqlx::SqlitePool;

use weddingcard_core::models::GuestbookEntry;

use super::parse_timestamp;

#[derive(Clone)]
pub struct GuestbookRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct GuestbookRow {
    id: String,
    wedding_id: String,
    name: String,
    relationship: String,
    message: String,
    created_at: String,
}

impl GuestbookRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, entry: &GuestbookEntry) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO guestbook_messages (id, wedding_id, name, relationship, message, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&entry.id)
        .bind(&entry.wedding_id)
        .bind(&entry.name)
        .bind(&entry.relationship)
        .bind(&entry.message)
        .bind(entry.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Messages for a wedding, newest first.
    pub async fn list_for_wedding(&self, wedding_id: &str) -> Result<Vec<GuestbookEntry>, sqlx::Error> {
        let rows: Vec<GuestbookRow> = sqlx::query_as(
            "SELECT * FROM guestbook_messages WHERE wedding_id = ? ORDER BY created_at DESC",
        )
        .bind(wedding_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(GuestbookEntry {
                    created_at: parse_timestamp("created_at", &row.created_at)?,
                    id: row.id,
                    wedding_id: row.wedding_id,
                    name: row.name,
                    relationship: row.relationship,
                    message: row.message,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_db, WeddingRepository};
    use chrono::{Duration, Utc};
    use tempfile::TempDir;
    use weddingcard_core::models::WeddingPatch;

    #[tokio::test]
    async fn test_list_newest_first() {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_db(&temp_dir.path().join("test.db")).await.unwrap();
        let wedding = WeddingRepository::new(pool.clone())
            .save("user-1", &WeddingPatch::new())
            .await
            .unwrap();
        let repo = GuestbookRepository::new(pool);

        let now = Utc::now();
        for (i, name) in ["Oldest", "Middle", "Newest"].iter().enumerate() {
            let entry = GuestbookEntry {
                id: format!("msg-{}", i),
                wedding_id: wedding.id.clone(),
                name: name.to_string(),
                relationship: "Friend".to_string(),
                message: "Congratulations!".to_string(),
                created_at: now + Duration::seconds(i as i64),
            };
            repo.create(&entry).await.unwrap();
        }

        let names: Vec<String> = repo
            .list_for_wedding(&wedding.id)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["Newest", "Middle", "Oldest"]);
    }
}
