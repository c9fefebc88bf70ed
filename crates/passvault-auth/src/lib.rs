// SPDX-FileCopyrightText: 2026 Passvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Principal passwords and JWT sessions for the Passvault credential vault.
//!
//! Principals log in with email and password (Argon2id) and receive an
//! HS256 access/refresh pair. [`JwtAuthenticator`] implements
//! [`AuthAdapter`](passvault_core::AuthAdapter) for the gateway's bearer
//! middleware.

pub mod authenticator;
pub mod password;
pub mod principal;
pub mod tokens;

pub use authenticator::{JwtAuthenticator, BAD_CREDENTIALS};
pub use principal::{normalize_email, NewPrincipal, PrincipalDirectory};
pub use tokens::{Claims, TokenIssuer, TokenPair, TokenType};
