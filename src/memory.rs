//! In-process implementation of the repository traits, used by tests in
//! place of PostgreSQL.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::token::{generate_key, AuthToken, TokenRepo};
use crate::error::{AppError, AppResult};
use crate::recipe::model::{OwnedRecord, RecordKind};
use crate::recipe::repo::RecordRepo;
use crate::users::model::{NewUser, User};
use crate::users::repo::{UserRepo, DUPLICATE_EMAIL};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    tokens: HashMap<Uuid, AuthToken>, // keyed by user
    records: HashMap<Uuid, (RecordKind, OwnedRecord)>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|p| p.into_inner())
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn insert(&self, user: NewUser) -> AppResult<User> {
        let mut t = self.lock();
        if t.users.values().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(AppError::validation(DUPLICATE_EMAIL));
        }
        let row = User {
            id: user.id,
            email: user.email,
            password_hash: user.password_hash,
            name: user.name,
            is_active: user.flags.is_active,
            is_staff: user.flags.is_staff,
            is_superuser: user.flags.is_superuser,
            created_at: OffsetDateTime::now_utc(),
        };
        t.users.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let t = self.lock();
        Ok(t.users.values().find(|u| u.email.eq_ignore_ascii_case(email)).cloned())
    }

    async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        password_hash: Option<&str>,
    ) -> AppResult<User> {
        let mut t = self.lock();
        let user = t.users.get_mut(&id).ok_or(AppError::NotFound)?;
        if let Some(name) = name {
            user.name = name.to_string();
        }
        if let Some(hash) = password_hash {
            user.password_hash = hash.to_string();
        }
        Ok(user.clone())
    }
}

#[async_trait]
impl TokenRepo for MemoryStore {
    async fn get_or_create(&self, user_id: Uuid) -> AppResult<AuthToken> {
        let mut t = self.lock();
        let token = t.tokens.entry(user_id).or_insert_with(|| AuthToken {
            key: generate_key(),
            user_id,
            created_at: OffsetDateTime::now_utc(),
        });
        Ok(token.clone())
    }

    async fn find_user(&self, key: &str) -> AppResult<Option<User>> {
        let t = self.lock();
        Ok(t.tokens
            .values()
            .find(|tok| tok.key == key)
            .and_then(|tok| t.users.get(&tok.user_id))
            .cloned())
    }
}

#[async_trait]
impl RecordRepo for MemoryStore {
    async fn list(&self, kind: RecordKind, owner: Uuid) -> AppResult<Vec<OwnedRecord>> {
        let t = self.lock();
        let mut rows: Vec<OwnedRecord> = t
            .records
            .values()
            .filter(|(k, r)| *k == kind && r.user_id == owner)
            .map(|(_, r)| r.clone())
            .collect();
        rows.sort_by(|a, b| b.name.cmp(&a.name).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn insert(&self, kind: RecordKind, owner: Uuid, id: Uuid, name: &str) -> AppResult<OwnedRecord> {
        let mut t = self.lock();
        let rec = OwnedRecord {
            id,
            user_id: owner,
            name: name.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        t.records.insert(id, (kind, rec.clone()));
        Ok(rec)
    }

    async fn get(&self, kind: RecordKind, owner: Uuid, id: Uuid) -> AppResult<Option<OwnedRecord>> {
        let t = self.lock();
        Ok(t.records
            .get(&id)
            .filter(|(k, r)| *k == kind && r.user_id == owner)
            .map(|(_, r)| r.clone()))
    }

    async fn rename(
        &self,
        kind: RecordKind,
        owner: Uuid,
        id: Uuid,
        name: &str,
    ) -> AppResult<Option<OwnedRecord>> {
        let mut t = self.lock();
        Ok(t.records
            .get_mut(&id)
            .filter(|(k, r)| *k == kind && r.user_id == owner)
            .map(|(_, r)| {
                r.name = name.to_string();
                r.clone()
            }))
    }

    async fn delete(&self, kind: RecordKind, owner: Uuid, id: Uuid) -> AppResult<bool> {
        let mut t = self.lock();
        let owned = matches!(t.records.get(&id), Some((k, r)) if *k == kind && r.user_id == owner);
        if owned {
            t.records.remove(&id);
        }
        Ok(owned)
    }
}
