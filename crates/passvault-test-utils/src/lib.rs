// SPDX-FileCopyrightText: 2026 Passvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Passvault integration tests.
//!
//! [`TestHarness`] wires a temp SQLite database, a fresh process key and a
//! JWT issuer into the real gateway router, and drives it in-process.

pub mod harness;

pub use harness::{TestHarness, TestHarnessBuilder, TestResponse};
