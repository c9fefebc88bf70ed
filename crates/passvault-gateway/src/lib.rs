// SPDX-FileCopyrightText: 2026 Passvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! REST gateway for the Passvault credential vault.
//!
//! Token endpoints issue JWTs; every `/api/passwords` route runs behind the
//! bearer middleware and is scoped to the authenticated principal.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;

pub use error::{ApiError, ApiResult};
pub use server::{build_router, start_server, GatewayState};
