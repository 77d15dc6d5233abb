use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::recipe::model::{OwnedRecord, RecordKind};
use crate::recipe::repo::RecordRepo;
use crate::users::services::MAX_NAME_LEN;

/// Trimmed, non-empty, at most `MAX_NAME_LEN` characters.
pub fn clean_name(name: Option<&str>) -> AppResult<String> {
    let name = name.map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err(AppError::validation("Name may not be blank"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::validation(format!(
            "Name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

pub async fn list(repo: &dyn RecordRepo, kind: RecordKind, owner: Uuid) -> AppResult<Vec<OwnedRecord>> {
    repo.list(kind, owner).await
}

pub async fn create(
    repo: &dyn RecordRepo,
    kind: RecordKind,
    owner: Uuid,
    name: Option<&str>,
) -> AppResult<OwnedRecord> {
    let name = clean_name(name)?;
    let rec = repo.insert(kind, owner, Uuid::new_v4(), &name).await?;
    info!(%kind, id = %rec.id, user_id = %owner, "record created");
    Ok(rec)
}

pub async fn get(repo: &dyn RecordRepo, kind: RecordKind, owner: Uuid, id: Uuid) -> AppResult<OwnedRecord> {
    repo.get(kind, owner, id).await?.ok_or(AppError::NotFound)
}

pub async fn rename(
    repo: &dyn RecordRepo,
    kind: RecordKind,
    owner: Uuid,
    id: Uuid,
    name: Option<&str>,
) -> AppResult<OwnedRecord> {
    let name = clean_name(name)?;
    repo.rename(kind, owner, id, &name)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn delete(repo: &dyn RecordRepo, kind: RecordKind, owner: Uuid, id: Uuid) -> AppResult<()> {
    if !repo.delete(kind, owner, id).await? {
        return Err(AppError::NotFound);
    }
    info!(%kind, %id, user_id = %owner, "record deleted");
    Ok(())
}
