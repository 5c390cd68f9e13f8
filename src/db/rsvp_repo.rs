use sqlx::SqlitePool;
use std::str::FromStr;

use weddingcard_core::models::{Attendance, Rsvp};

use super::parse_timestamp;

#[derive(Clone)]
pub struct RsvpRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct RsvpRow {
    id: String,
    wedding_id: String,
    guest_name: String,
    guest_email: String,
    guest_phone: String,
    attendance: String,
    guest_count: i64,
    dietary_restrictions: String,
    special_message: String,
    submitted_at: String,
}

impl RsvpRow {
    fn into_rsvp(self) -> Result<Rsvp, sqlx::Error> {
        let attendance =
            Attendance::from_str(&self.attendance).map_err(|e| sqlx::Error::ColumnDecode {
                index: "attendance".to_string(),
                source: e.into(),
            })?;

        Ok(Rsvp {
            id: self.id,
            wedding_id: self.wedding_id,
            guest_name: self.guest_name,
            guest_email: self.guest_email,
            guest_phone: self.guest_phone,
            attendance,
            guest_count: self.guest_count,
            dietary_restrictions: self.dietary_restrictions,
            special_message: self.special_message,
            submitted_at: parse_timestamp("submitted_at", &self.submitted_at)?,
        })
    }
}

impl RsvpRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, rsvp: &Rsvp) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO rsvps (id, wedding_id, guest_name, guest_email, guest_phone, attendance, guest_count, dietary_restrictions, special_message, submitted_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&rsvp.id)
        .bind(&rsvp.wedding_id)
        .bind(&rsvp.guest_name)
        .bind(&rsvp.guest_email)
        .bind(&rsvp.guest_phone)
        .bind(rsvp.attendance.to_string())
        .bind(rsvp.guest_count)
        .bind(&rsvp.dietary_restrictions)
        .bind(&rsvp.special_message)
        .bind(rsvp.submitted_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// All responses for a wedding in submission order.
    pub async fn list_for_wedding(&self, wedding_id: &str) -> Result<Vec<Rsvp>, sqlx::Error> {
        let rows: Vec<RsvpRow> =
            sqlx::query_as("SELECT * FROM rsvps WHERE wedding_id = ? ORDER BY submitted_at ASC")
                .bind(wedding_id)
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(RsvpRow::into_rsvp).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_db, WeddingRepository};
    use tempfile::TempDir;
    use weddingcard_core::models::{NewRsvp, WeddingPatch};

    async fn setup() -> (RsvpRepository, String, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_db(&temp_dir.path().join("test.db")).await.unwrap();
        let wedding = WeddingRepository::new(pool.clone())
            .save("user-1", &WeddingPatch::new())
            .await
            .unwrap();
        (RsvpRepository::new(pool), wedding.id, temp_dir)
    }

    fn new_rsvp(wedding_id: &str, name: &str, attendance: Attendance) -> Rsvp {
        NewRsvp {
            wedding_id: wedding_id.to_string(),
            guest_name: name.to_string(),
            guest_email: format!("{}@example.com", name.to_lowercase()),
            guest_phone: String::new(),
            attendance,
            guest_count: 2,
            dietary_restrictions: "vegetarian".to_string(),
            special_message: String::new(),
        }
        .into_rsvp()
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let (repo, wedding_id, _temp) = setup().await;

        let first = new_rsvp(&wedding_id, "Jo", Attendance::Yes);
        repo.create(&first).await.unwrap();
        let second = new_rsvp(&wedding_id, "Sam", Attendance::No);
        repo.create(&second).await.unwrap();

        let listed = repo.list_for_wedding(&wedding_id).await.unwrap();
        assert_eq!(listed, vec![first, second]);
    }

    #[tokio::test]
    async fn test_unknown_wedding_rejected_by_foreign_key() {
        let (repo, _wedding_id, _temp) = setup().await;
        let orphan = new_rsvp("missing", "Jo", Attendance::Yes);
        assert!(repo.create(&orphan).await.is_err());
        assert!(repo.list_for_wedding("missing").await.unwrap().is_empty());
    }
}
