// SPDX-License-Identifier: AGPL-3.0-or-later

//! # Core Data Models
//!
//! Local accounts, the transient external identity produced by the OAuth
//! exchange, and the shared auth response DTOs.
//!
//! Students and teachers are not separate entities: a single [`Account`] is
//! tagged by [`Role`] with optional student-only attributes, so every lookup
//! path works on one concrete type.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::Role;

/// A local user account.
///
/// `id` is assigned by the account store at creation and is immutable, as is
/// the lowercase-normalized `email` and the `role`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub is_enabled: bool,
    pub bio: Option<String>,
    /// Student-only: grade (학년)
    pub grade: Option<i32>,
    /// Student-only: classroom (반)
    pub classroom: Option<i32>,
    /// Student-only: number within the classroom (번호)
    pub student_number: Option<i32>,
}

/// An account to be created; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub name: String,
    pub role: Role,
    pub is_enabled: bool,
    pub bio: Option<String>,
    pub grade: Option<i32>,
    pub classroom: Option<i32>,
    pub student_number: Option<i32>,
}

/// A verified identity returned by the external provider.
///
/// Transient: produced by the OAuth profile fetch (after the domain
/// allow-list check) and consumed once by the identity resolver. Never
/// persisted.
#[derive(Debug, Clone)]
pub struct ExternalIdentity {
    /// Provider-side user id
    pub provider_id: String,
    pub email: String,
    pub verified_email: bool,
    /// Display name
    pub name: String,
}

/// Account details embedded in auth responses.
///
/// Field names are camelCase to match the frontend contract.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub is_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classroom: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_number: Option<i32>,
}

impl From<Account> for AccountInfo {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            email: account.email,
            name: account.name,
            role: account.role,
            is_enabled: account.is_enabled,
            bio: account.bio,
            grade: account.grade,
            classroom: account.classroom,
            student_number: account.student_number,
        }
    }
}

/// Response for a successful OAuth login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access-token lifetime in seconds
    pub expires_in: i64,
    pub user_info: AccountInfo,
}
