use std::fmt;

use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Which user-owned table a record lives in. Tags and ingredients share one
/// contract and differ only in storage location and URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Tag,
    Ingredient,
}

impl RecordKind {
    pub fn table(self) -> &'static str {
        match self {
            RecordKind::Tag => "tags",
            RecordKind::Ingredient => "ingredients",
        }
    }

    /// Last URL segment under `/recipe`.
    pub fn path(self) -> &'static str {
        self.table()
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Tag => f.write_str("tag"),
            RecordKind::Ingredient => f.write_str("ingredient"),
        }
    }
}

/// A tag or ingredient row.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OwnedRecord {
    pub id: Uuid,
    pub user_id: Uuid, // owner, never changes
    pub name: String,
    pub created_at: OffsetDateTime,
}

impl fmt::Display for OwnedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
