// SPDX-License-Identifier: AGPL-3.0-or-later

//! Account resolution: map a verified external identity onto a local
//! account, creating a student account on first login.
//!
//! Resolution checks roles in a fixed order (student, then teacher) so the
//! same email always resolves to the same account. Existing accounts are
//! returned unchanged; profile attributes are never synced on repeat login.

use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::error::AuthError;
use crate::auth::roles::Role;
use crate::config::NewStudentDefaults;
use crate::models::{Account, ExternalIdentity, NewAccount};
use crate::storage::{AccountStore, StoreError};

#[derive(Clone)]
pub struct IdentityResolver {
    store: Arc<dyn AccountStore>,
    student_defaults: NewStudentDefaults,
}

impl IdentityResolver {
    pub fn new(store: Arc<dyn AccountStore>, student_defaults: NewStudentDefaults) -> Self {
        Self {
            store,
            student_defaults,
        }
    }

    /// Resolve an external identity to a local account.
    ///
    /// Lookup order is student first, then teacher. An unknown email gets a
    /// fresh student account with the configured defaults. If a concurrent
    /// login creates the account between our lookup and our insert, the
    /// store rejects the duplicate and we return the winner's account.
    pub fn resolve(&self, identity: &ExternalIdentity) -> Result<Account, AuthError> {
        let email = identity.email.trim().to_lowercase();

        if let Some(account) = self.lookup(&email)? {
            return Ok(account);
        }

        let new_account = NewAccount {
            email: email.clone(),
            name: identity.name.clone(),
            role: Role::Student,
            is_enabled: true,
            bio: Some(self.student_defaults.bio.clone()),
            grade: Some(self.student_defaults.grade),
            classroom: Some(self.student_defaults.classroom),
            student_number: Some(self.student_defaults.student_number),
        };

        match self.store.save(new_account) {
            Ok(account) => {
                info!(account_id = account.id, %email, "created student account on first login");
                Ok(account)
            }
            Err(StoreError::DuplicateEmail(_)) => {
                warn!(%email, "lost account-creation race, re-reading winner");
                self.lookup(&email)?.ok_or(AuthError::DuplicateAccount)
            }
            Err(e) => Err(AuthError::Internal(e.to_string())),
        }
    }

    fn lookup(&self, email: &str) -> Result<Option<Account>, AuthError> {
        for role in [Role::Student, Role::Teacher] {
            if let Some(account) = self
                .store
                .find_by_email(role, email)
                .map_err(|e| AuthError::Internal(e.to_string()))?
            {
                return Ok(Some(account));
            }
        }
        Ok(None)
    }
}
