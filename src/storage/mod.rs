// SPDX-License-Identifier: AGPL-3.0-or-later

//! # Account Storage
//!
//! Persistent account storage behind the [`AccountStore`] trait. The
//! production store is an embedded redb database (pure Rust, ACID); an
//! in-memory store backs tests and ephemeral development runs.
//!
//! Email uniqueness is enforced here, at the store, rather than by
//! in-process locking: concurrent first-logins with the same email race at
//! the index insert and the loser's transaction aborts with
//! [`StoreError::DuplicateEmail`].

pub mod accounts;

pub use accounts::{AccountStore, MemoryAccountStore, RedbAccountStore, StoreError};
