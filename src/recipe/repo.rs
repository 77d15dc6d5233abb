use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::recipe::model::{OwnedRecord, RecordKind};

/// Storage for user-owned records. Every method takes the owner and never
/// touches rows belonging to anyone else.
#[async_trait]
pub trait RecordRepo: Send + Sync {
    /// Owner's records, name descending.
    async fn list(&self, kind: RecordKind, owner: Uuid) -> AppResult<Vec<OwnedRecord>>;
    async fn insert(&self, kind: RecordKind, owner: Uuid, id: Uuid, name: &str) -> AppResult<OwnedRecord>;
    async fn get(&self, kind: RecordKind, owner: Uuid, id: Uuid) -> AppResult<Option<OwnedRecord>>;
    async fn rename(
        &self,
        kind: RecordKind,
        owner: Uuid,
        id: Uuid,
        name: &str,
    ) -> AppResult<Option<OwnedRecord>>;
    /// `false` when no such record is owned by `owner`.
    async fn delete(&self, kind: RecordKind, owner: Uuid, id: Uuid) -> AppResult<bool>;
}

#[derive(Clone)]
pub struct PgRecordRepo {
    db: PgPool,
}

impl PgRecordRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

// Table names come from `RecordKind::table`, never from input.
#[async_trait]
impl RecordRepo for PgRecordRepo {
    async fn list(&self, kind: RecordKind, owner: Uuid) -> AppResult<Vec<OwnedRecord>> {
        let sql = format!(
            r#"
            SELECT id, user_id, name, created_at
              FROM {}
             WHERE user_id = $1
             ORDER BY name DESC, id
            "#,
            kind.table()
        );
        let rows = sqlx::query_as::<_, OwnedRecord>(&sql)
            .bind(owner)
            .fetch_all(&self.db)
            .await?;
        Ok(rows)
    }

    async fn insert(&self, kind: RecordKind, owner: Uuid, id: Uuid, name: &str) -> AppResult<OwnedRecord> {
        let sql = format!(
            r#"
            INSERT INTO {} (id, user_id, name)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, name, created_at
            "#,
            kind.table()
        );
        let row = sqlx::query_as::<_, OwnedRecord>(&sql)
            .bind(id)
            .bind(owner)
            .bind(name)
            .fetch_one(&self.db)
            .await?;
        Ok(row)
    }

    async fn get(&self, kind: RecordKind, owner: Uuid, id: Uuid) -> AppResult<Option<OwnedRecord>> {
        let sql = format!(
            r#"
            SELECT id, user_id, name, created_at
              FROM {}
             WHERE id = $1 AND user_id = $2
            "#,
            kind.table()
        );
        let row = sqlx::query_as::<_, OwnedRecord>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.db)
            .await?;
        Ok(row)
    }

    async fn rename(
        &self,
        kind: RecordKind,
        owner: Uuid,
        id: Uuid,
        name: &str,
    ) -> AppResult<Option<OwnedRecord>> {
        let sql = format!(
            r#"
            UPDATE {}
               SET name = $3
             WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, name, created_at
            "#,
            kind.table()
        );
        let row = sqlx::query_as::<_, OwnedRecord>(&sql)
            .bind(id)
            .bind(owner)
            .bind(name)
            .fetch_optional(&self.db)
            .await?;
        Ok(row)
    }

    async fn delete(&self, kind: RecordKind, owner: Uuid, id: Uuid) -> AppResult<bool> {
        let sql = format!("DELETE FROM {} WHERE id = $1 AND user_id = $2", kind.table());
        let res = sqlx::query(&sql)
            .bind(id)
            .bind(owner)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
