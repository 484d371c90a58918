// SPDX-License-Identifier: AGPL-3.0-or-later

//! Account store trait and its redb / in-memory implementations.
//!
//! ## Table Layout (redb)
//!
//! - `accounts`: account_id → serialized Account (JSON bytes)
//! - `account_email_index`: lowercase email → account_id (uniqueness)
//! - `counters`: key → u64 (id sequence)

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

use crate::auth::Role;
use crate::models::{Account, NewAccount};

/// Primary table: account_id → serialized Account (JSON bytes).
const ACCOUNTS: TableDefinition<u64, &[u8]> = TableDefinition::new("accounts");

/// Index: lowercase email → account_id. One entry per email, across roles.
const EMAIL_INDEX: TableDefinition<&str, u64> = TableDefinition::new("account_email_index");

/// Counters: key → next value (e.g. "next_account_id").
const COUNTERS: TableDefinition<&str, u64> = TableDefinition::new("counters");

const NEXT_ACCOUNT_ID: &str = "next_account_id";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("an account with email {0} already exists")]
    DuplicateEmail(String),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Role-partitioned account lookup and creation.
///
/// Lookups are keyed uniformly by `(role, …)`: an account is only returned
/// when its stored role matches, so a student token can never resolve to a
/// teacher account with the same id.
pub trait AccountStore: Send + Sync {
    /// Find an account by email within one role partition.
    fn find_by_email(&self, role: Role, email: &str) -> Result<Option<Account>, StoreError>;

    /// Find an account by id within one role partition.
    fn find_by_id(&self, role: Role, id: i64) -> Result<Option<Account>, StoreError>;

    /// Persist a new account, assigning its id.
    ///
    /// Fails with [`StoreError::DuplicateEmail`] when any account (of any
    /// role) already uses the email.
    fn save(&self, account: NewAccount) -> Result<Account, StoreError>;
}

/// Emails are compared and stored lowercase.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// =============================================================================
// Redb Store
// =============================================================================

/// Embedded ACID account database.
pub struct RedbAccountStore {
    db: Database,
}

impl RedbAccountStore {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ACCOUNTS)?;
            let _ = write_txn.open_table(EMAIL_INDEX)?;
            let _ = write_txn.open_table(COUNTERS)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    fn load(bytes: &[u8]) -> Result<Account, StoreError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

impl AccountStore for RedbAccountStore {
    fn find_by_email(&self, role: Role, email: &str) -> Result<Option<Account>, StoreError> {
        let email = normalize_email(email);
        let read_txn = self.db.begin_read()?;
        let emails = read_txn.open_table(EMAIL_INDEX)?;

        let Some(id) = emails.get(email.as_str())? else {
            return Ok(None);
        };
        let id = id.value();

        let accounts = read_txn.open_table(ACCOUNTS)?;
        let Some(bytes) = accounts.get(id)? else {
            return Ok(None);
        };

        let account = Self::load(bytes.value())?;
        Ok((account.role == role).then_some(account))
    }

    fn find_by_id(&self, role: Role, id: i64) -> Result<Option<Account>, StoreError> {
        if id < 0 {
            return Ok(None);
        }
        let read_txn = self.db.begin_read()?;
        let accounts = read_txn.open_table(ACCOUNTS)?;

        let Some(bytes) = accounts.get(id as u64)? else {
            return Ok(None);
        };

        let account = Self::load(bytes.value())?;
        Ok((account.role == role).then_some(account))
    }

    fn save(&self, account: NewAccount) -> Result<Account, StoreError> {
        let email = normalize_email(&account.email);
        let write_txn = self.db.begin_write()?;

        let created = {
            let mut emails = write_txn.open_table(EMAIL_INDEX)?;
            if emails.get(email.as_str())?.is_some() {
                // Transaction is dropped without commit, aborting it.
                return Err(StoreError::DuplicateEmail(email));
            }

            let mut counters = write_txn.open_table(COUNTERS)?;
            let id = counters
                .get(NEXT_ACCOUNT_ID)?
                .map(|v| v.value())
                .unwrap_or(1);
            counters.insert(NEXT_ACCOUNT_ID, id + 1)?;

            let created = Account {
                id: id as i64,
                email: email.clone(),
                name: account.name,
                role: account.role,
                is_enabled: account.is_enabled,
                bio: account.bio,
                grade: account.grade,
                classroom: account.classroom,
                student_number: account.student_number,
            };

            let bytes = serde_json::to_vec(&created)?;
            let mut accounts = write_txn.open_table(ACCOUNTS)?;
            accounts.insert(id, bytes.as_slice())?;
            emails.insert(email.as_str(), id)?;

            created
        };

        write_txn.commit()?;
        Ok(created)
    }
}

// =============================================================================
// In-Memory Store
// =============================================================================

/// In-memory account store for tests and ephemeral development runs.
#[derive(Default)]
pub struct MemoryAccountStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    accounts: HashMap<i64, Account>,
    next_id: i64,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccountStore for MemoryAccountStore {
    fn find_by_email(&self, role: Role, email: &str) -> Result<Option<Account>, StoreError> {
        let email = normalize_email(email);
        let inner = self.inner.lock().expect("account store lock poisoned");
        Ok(inner
            .accounts
            .values()
            .find(|a| a.email == email && a.role == role)
            .cloned())
    }

    fn find_by_id(&self, role: Role, id: i64) -> Result<Option<Account>, StoreError> {
        let inner = self.inner.lock().expect("account store lock poisoned");
        Ok(inner
            .accounts
            .get(&id)
            .filter(|a| a.role == role)
            .cloned())
    }

    fn save(&self, account: NewAccount) -> Result<Account, StoreError> {
        let email = normalize_email(&account.email);
        let mut inner = self.inner.lock().expect("account store lock poisoned");

        if inner.accounts.values().any(|a| a.email == email) {
            return Err(StoreError::DuplicateEmail(email));
        }

        inner.next_id += 1;
        let created = Account {
            id: inner.next_id,
            email,
            name: account.name,
            role: account.role,
            is_enabled: account.is_enabled,
            bio: account.bio,
            grade: account.grade,
            classroom: account.classroom,
            student_number: account.student_number,
        };
        inner.accounts.insert(created.id, created.clone());
        Ok(created)
    }
}
