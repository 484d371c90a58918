// SPDX-License-Identifier: AGPL-3.0-or-later

//! User roles for authorization.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Account roles.
///
/// The role is fixed when the account is created and never changes.
///
/// - `Student` - Created automatically on first OAuth login
/// - `Teacher` - Provisioned by staff
/// - `Admin` - Full administrative access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Student account (grade/classroom/number attributes)
    Student,
    /// Teacher account
    Teacher,
    /// Full administrative access
    Admin,
}

impl Role {
    /// Parse a role from its wire representation (case-insensitive).
    pub fn from_str(s: &str) -> Option<Role> {
        match s.to_uppercase().as_str() {
            "STUDENT" => Some(Role::Student),
            "TEACHER" => Some(Role::Teacher),
            "ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Student => write!(f, "STUDENT"),
            Role::Teacher => write!(f, "TEACHER"),
            Role::Admin => write!(f, "ADMIN"),
        }
    }
}
