use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::recipe::model::OwnedRecord;

/// Body for creating or renaming a tag/ingredient.
#[derive(Debug, Deserialize)]
pub struct RecordRequest {
    pub name: Option<String>,
    /// Owner is taken from the token; a client-supplied one is refused,
    /// `null` included.
    #[serde(default, deserialize_with = "present")]
    pub user: Option<Value>,
}

/// `Some` whenever the field appears in the body; `default` covers absence.
fn present<'de, D>(de: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(de).map(Some)
}

impl RecordRequest {
    pub fn reject_owner(&self) -> AppResult<()> {
        if self.user.is_some() {
            return Err(AppError::validation("Field `user` is read-only"));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct RecordResponse {
    pub id: Uuid,
    pub name: String,
}

impl From<OwnedRecord> for RecordResponse {
    fn from(r: OwnedRecord) -> Self {
        Self { id: r.id, name: r.name }
    }
}
