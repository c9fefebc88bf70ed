// SPDX-FileCopyrightText: 2026 Passvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Owner-scoped credential records for the Passvault credential vault.
//!
//! [`CredentialRepository`] is the single gateway between an authenticated
//! principal and the encrypted records it owns.

pub mod model;
pub mod repository;
pub mod validation;

pub use model::{CredentialChanges, CredentialRecord, NewCredential};
pub use repository::CredentialRepository;
