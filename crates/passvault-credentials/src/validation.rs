// SPDX-FileCopyrightText: 2026 Passvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Field rules for credential records.
//!
//! Text fields are trimmed before they are checked and stored. The secret is
//! never trimmed: it is kept exactly as supplied, but must not be blank.

use std::collections::BTreeMap;

use passvault_core::PassvaultError;
use secrecy::{ExposeSecret, SecretString};

pub const TITLE_MAX_CHARS: usize = 100;
pub const USERNAME_MAX_CHARS: usize = 100;
pub const SERVICE_URL_MAX_CHARS: usize = 200;

pub const REQUIRED: &str = "This field is required.";
const BLANK: &str = "This field may not be blank.";
const INVALID_URL: &str = "Enter a valid URL.";

/// Collects per-field problems so a client sees all of them at once.
#[derive(Debug, Default)]
pub(crate) struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub(crate) fn add(&mut self, field: &str, detail: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| detail.into());
    }

    pub(crate) fn into_result(self) -> Result<(), PassvaultError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self.into_error())
        }
    }

    pub(crate) fn into_error(self) -> PassvaultError {
        PassvaultError::invalid_fields(self.0)
    }
}

fn too_long(max: usize) -> String {
    format!("Ensure this field has no more than {max} characters.")
}

pub(crate) fn check_title(title: &str, errors: &mut FieldErrors) {
    if title.is_empty() {
        errors.add("title", BLANK);
    } else if title.chars().count() > TITLE_MAX_CHARS {
        errors.add("title", too_long(TITLE_MAX_CHARS));
    }
}

pub(crate) fn check_username(username: &str, errors: &mut FieldErrors) {
    if username.chars().count() > USERNAME_MAX_CHARS {
        errors.add("username", too_long(USERNAME_MAX_CHARS));
    }
}

/// An empty URL is allowed; anything else must be an absolute http(s) URL.
pub(crate) fn check_service_url(service_url: &str, errors: &mut FieldErrors) {
    if service_url.is_empty() {
        return;
    }
    if service_url.chars().count() > SERVICE_URL_MAX_CHARS {
        errors.add("service_url", too_long(SERVICE_URL_MAX_CHARS));
        return;
    }
    match url::Url::parse(service_url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => {}
        _ => errors.add("service_url", INVALID_URL),
    }
}

pub(crate) fn check_raw_password(raw_password: &SecretString, errors: &mut FieldErrors) {
    if raw_password.expose_secret().trim().is_empty() {
        errors.add("raw_password", BLANK);
    }
}
