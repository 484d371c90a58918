// SPDX-License-Identifier: AGPL-3.0-or-later

//! # Equiplend Server
//!
//! Identity and session backend for the school equipment-lending platform.
//! Handles Google OAuth login for the school domain, account resolution
//! (students are created on first login), and self-issued JWT access/refresh
//! tokens for every subsequent API call.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod state;
pub mod storage;
