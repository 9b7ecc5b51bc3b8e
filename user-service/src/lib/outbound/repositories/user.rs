use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::RwLockReadGuard;
use std::sync::RwLockWriteGuard;

use async_trait::async_trait;
use auth::HashedPassword;
use chrono::Utc;

use crate::domain::user::models::CredentialRecord;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

/// Default cap on the number of records returned by `list`.
pub const DEFAULT_MAX_LIST_LENGTH: usize = 100;

#[derive(Default)]
struct UserTable {
    records: HashMap<UserId, CredentialRecord>,
    emails: HashMap<String, UserId>,
    // Sorted copy of the record keys; stale while `dirty` is set.
    sorted_ids: Vec<UserId>,
    dirty: bool,
}

impl UserTable {
    fn snapshot(&self, limit: usize) -> Vec<CredentialRecord> {
        self.sorted_ids
            .iter()
            .take(limit)
            .filter_map(|id| self.records.get(id).cloned())
            .collect()
    }

    fn rebuild_order(&mut self) {
        let mut ids: Vec<UserId> = self.records.keys().copied().collect();
        ids.sort_unstable();
        self.sorted_ids = ids;
        self.dirty = false;
    }

    fn not_found(id: &UserId) -> UserError {
        UserError::NotFound(id.to_string())
    }
}

/// In-memory credential store.
///
/// One reader/writer lock guards the whole table: lookups share it, every
/// mutation takes it exclusively. Callers must do slow work (hashing) before
/// calling in, since the lock is only held for the map operation itself.
pub struct InMemoryUserRepository {
    table: RwLock<UserTable>,
    max_list_length: usize,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::with_max_list_length(DEFAULT_MAX_LIST_LENGTH)
    }

    pub fn with_max_list_length(max_list_length: usize) -> Self {
        Self {
            table: RwLock::new(UserTable::default()),
            max_list_length,
        }
    }

    pub fn max_list_length(&self) -> usize {
        self.max_list_length
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, UserTable>, UserError> {
        self.table
            .read()
            .map_err(|_| UserError::Storage("user table lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, UserTable>, UserError> {
        self.table
            .write()
            .map_err(|_| UserError::Storage("user table lock poisoned".to_string()))
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(
        &self,
        user: NewUser,
        password: HashedPassword,
    ) -> Result<CredentialRecord, UserError> {
        let mut table = self.write()?;

        if table.emails.contains_key(user.email.as_str()) {
            return Err(UserError::EmailAlreadyExists(user.email.to_string()));
        }

        let record = CredentialRecord {
            id: UserId::new(),
            name: user.name,
            email: user.email,
            groups: user.groups,
            password,
            created_at: Utc::now(),
        };

        table
            .emails
            .insert(record.email.as_str().to_string(), record.id);
        table.records.insert(record.id, record.clone());
        table.dirty = true;

        Ok(record)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<CredentialRecord>, UserError> {
        Ok(self.read()?.records.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<CredentialRecord>, UserError> {
        let table = self.read()?;
        Ok(table
            .emails
            .get(email)
            .and_then(|id| table.records.get(id))
            .cloned())
    }

    async fn exists(&self, id: &UserId) -> Result<bool, UserError> {
        Ok(self.read()?.records.contains_key(id))
    }

    async fn list(&self) -> Result<Vec<CredentialRecord>, UserError> {
        {
            let table = self.read()?;
            if !table.dirty {
                return Ok(table.snapshot(self.max_list_length));
            }
        }

        // Another writer may have rebuilt the order between the two locks.
        let mut table = self.write()?;
        if table.dirty {
            table.rebuild_order();
        }
        Ok(table.snapshot(self.max_list_length))
    }

    async fn update(
        &self,
        id: &UserId,
        command: UpdateUserCommand,
    ) -> Result<CredentialRecord, UserError> {
        let mut table = self.write()?;

        let mut record = table
            .records
            .get(id)
            .cloned()
            .ok_or_else(|| UserTable::not_found(id))?;

        if let Some(new_email) = command.email {
            if new_email != record.email {
                if table.emails.contains_key(new_email.as_str()) {
                    return Err(UserError::EmailAlreadyExists(new_email.to_string()));
                }
                table.emails.remove(record.email.as_str());
                table.emails.insert(new_email.as_str().to_string(), record.id);
                record.email = new_email;
            }
        }

        if let Some(new_name) = command.name {
            record.name = new_name;
        }

        if let Some(new_groups) = command.groups {
            record.groups = new_groups;
        }

        table.records.insert(record.id, record.clone());

        Ok(record)
    }

    async fn update_password(
        &self,
        id: &UserId,
        password: HashedPassword,
    ) -> Result<CredentialRecord, UserError> {
        let mut table = self.write()?;

        let record = table
            .records
            .get_mut(id)
            .ok_or_else(|| UserTable::not_found(id))?;
        record.password = password;

        Ok(record.clone())
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserError> {
        let mut table = self.write()?;

        let record = table
            .records
            .remove(id)
            .ok_or_else(|| UserTable::not_found(id))?;
        table.emails.remove(record.email.as_str());
        table.dirty = true;

        Ok(())
    }
}
