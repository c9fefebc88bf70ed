// SPDX-FileCopyrightText: 2026 Passvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns figment extraction failures into miette reports.
//!
//! Every section of `passvault.toml` has a closed key set (see
//! [`SECTION_KEYS`](crate::model::SECTION_KEYS)), so the only errors a user
//! can cause are a stray section, a stray key, a value of the wrong type, a
//! TOML syntax error, or a value that fails [`validation`](crate::validation).

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use std::path::Path;

use figment::error::Kind;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::model::{section_keys, section_names};

/// Jaro-Winkler score above which a longer key counts as a typo.
const SIMILARITY_THRESHOLD: f64 = 0.75;

/// Edit distance (transpositions count once) that always counts as a typo.
/// Short keys like `key` or `port` never reach the similarity threshold.
const MAX_TYPO_EDITS: usize = 1;

/// A configuration problem, rendered by [`render_errors`].
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown configuration section `[{section}]`")]
    #[diagnostic(
        code(passvault::config::unknown_section),
        help("{}", suggestion_help(suggestion.as_deref(), valid))
    )]
    UnknownSection {
        section: String,
        /// Closest known section, if any.
        suggestion: Option<String>,
        valid: String,
        #[label("not a passvault section")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("unknown key `{key}` in `[{section}]`")]
    #[diagnostic(
        code(passvault::config::unknown_key),
        help("{}", suggestion_help(suggestion.as_deref(), valid))
    )]
    UnknownKey {
        section: String,
        key: String,
        /// Closest key in the same section, if any.
        suggestion: Option<String>,
        valid: String,
        #[label("this key is not recognized")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("invalid type for `{key}`: found {found}")]
    #[diagnostic(code(passvault::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        /// Dotted path, e.g. `server.port`.
        key: String,
        found: String,
        expected: String,
        #[label("wrong type here")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value that parsed but is not usable.
    #[error("validation error: {message}")]
    #[diagnostic(code(passvault::config::validation))]
    Validation { message: String },

    /// Syntax errors and anything else figment reports.
    #[error("configuration error: {0}")]
    #[diagnostic(code(passvault::config::other))]
    Other(String),
}

fn suggestion_help(suggestion: Option<&str>, valid: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid: {valid}"),
        None => format!("valid: {valid}"),
    }
}

/// Convert every error inside a `figment::Error`.
///
/// `toml_sources` holds `(path, content)` pairs for the files that were
/// loaded; they are used to point at the offending line.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| convert(&error, toml_sources))
        .collect()
}

fn convert(error: &figment::Error, toml_sources: &[(String, String)]) -> ConfigError {
    match &error.kind {
        Kind::UnknownField(field, _) => {
            let section = error.path.first().filter(|s| *s != field);
            match section.and_then(|s| section_keys(s).map(|keys| (s, keys))) {
                Some((section, keys)) => {
                    let suggestion =
                        closest(field, keys.iter().copied()).map(|k| format!("{section}.{k}"));
                    let (span, src) = locate_in_sources(error, Some(section), field, toml_sources);
                    ConfigError::UnknownKey {
                        section: section.clone(),
                        key: field.clone(),
                        suggestion,
                        valid: keys.join(", "),
                        span,
                        src,
                    }
                }
                None => {
                    let sections: Vec<&str> = section_names().collect();
                    let (span, src) = locate_in_sources(error, None, field, toml_sources);
                    ConfigError::UnknownSection {
                        section: field.clone(),
                        suggestion: closest(field, sections.iter().copied()).map(str::to_string),
                        valid: sections.join(", "),
                        span,
                        src,
                    }
                }
            }
        }
        Kind::InvalidType(found, expected) => {
            let (span, src) = match error.path.split_last() {
                Some((field, parents)) => {
                    locate_in_sources(error, parents.first(), field, toml_sources)
                }
                None => (None, None),
            };
            ConfigError::InvalidType {
                key: error.path.join("."),
                found: found.to_string(),
                expected: expected.to_string(),
                span,
                src,
            }
        }
        _ => ConfigError::Other(error.to_string()),
    }
}

/// The candidate that most plausibly is what the user meant to type.
pub fn closest<'a>(unknown: &str, candidates: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    candidates
        .map(|c| (c, strsim::jaro_winkler(unknown, c)))
        .filter(|&(c, score)| {
            score > SIMILARITY_THRESHOLD || strsim::damerau_levenshtein(unknown, c) <= MAX_TYPO_EDITS
        })
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(c, _)| c)
}

/// Pick the loaded file the error came from and point into it.
///
/// Falls back to the only source when the error carries no file path, which
/// is the case for inline TOML strings.
fn locate_in_sources(
    error: &figment::Error,
    section: Option<&String>,
    key: &str,
    toml_sources: &[(String, String)],
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let origin = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|s| match s {
            figment::Source::File(path) => Some(path.as_path()),
            _ => None,
        });

    let source = match origin {
        Some(origin) => toml_sources
            .iter()
            .find(|(path, _)| same_file(Path::new(path), origin)),
        None if toml_sources.len() == 1 => toml_sources.first(),
        None => None,
    };

    source
        .and_then(|(path, content)| {
            let offset = locate(content, section.map(String::as_str), key)?;
            Some((
                Some(SourceSpan::new(offset.into(), key.len())),
                Some(NamedSource::new(path, content.clone())),
            ))
        })
        .unwrap_or((None, None))
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Byte offset of `key` in `content`.
///
/// With `section` set, only lines under that `[section]` header are
/// considered. Without it, `key` is matched against section headers and
/// against keys that appear before the first header.
pub fn locate(content: &str, section: Option<&str>, key: &str) -> Option<usize> {
    let mut current: Option<&str> = None;
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        let indent = line.len() - trimmed.len();

        if let Some(header) = trimmed.strip_prefix('[') {
            let name = header.split(']').next().unwrap_or_default().trim();
            if section.is_none() && name == key {
                return header.find(key).map(|at| offset + indent + 1 + at);
            }
            current = Some(name);
        } else if current == section && assigns(trimmed, key) {
            return Some(offset + indent);
        }

        offset += line.len();
    }

    None
}

/// Whether `line` is `key = ...`.
fn assigns(line: &str, key: &str) -> bool {
    line.strip_prefix(key)
        .is_some_and(|rest| rest.trim_start().starts_with('='))
}

/// Render each error to stderr with miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut out = String::new();
        match handler.render_report(&mut out, error) {
            Ok(()) => eprint!("{out}"),
            Err(_) => eprintln!("Error: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_keys_get_suggestions_from_edit_distance() {
        let vault = section_keys("vault").unwrap();
        assert_eq!(closest("kye", vault.iter().copied()), Some("key"));
        let server = section_keys("server").unwrap();
        assert_eq!(closest("prot", server.iter().copied()), Some("port"));
    }

    #[test]
    fn long_keys_get_suggestions_from_similarity() {
        let auth = section_keys("auth").unwrap();
        assert_eq!(closest("jwt_secert", auth.iter().copied()), Some("jwt_secret"));
        assert_eq!(
            closest("access_ttl_secs", auth.iter().copied()),
            Some("access_token_ttl_secs")
        );
    }

    #[test]
    fn unrelated_keys_get_no_suggestion() {
        let server = section_keys("server").unwrap();
        assert_eq!(closest("zzzzzz", server.iter().copied()), None);
        assert_eq!(closest("telemetry", section_names()), None);
    }

    #[test]
    fn locate_stays_inside_the_named_section() {
        let content = "[storage]\nkey = 1\n\n[vault]\n  key = \"abc\"\n";
        let at = locate(content, Some("vault"), "key").unwrap();
        assert!(at > content.find("[vault]").unwrap());
        assert_eq!(&content[at..at + 3], "key");
    }

    #[test]
    fn locate_ignores_keys_that_only_share_a_prefix() {
        let content = "[auth]\njwt_secret_file = 1\njwt_secret = 2\n";
        let at = locate(content, Some("auth"), "jwt_secret").unwrap();
        assert!(content[at..].starts_with("jwt_secret = 2"));
    }

    #[test]
    fn locate_finds_section_headers() {
        let content = "[server]\nport = 1\n[ vualt ]\n";
        let at = locate(content, None, "vualt").unwrap();
        assert_eq!(&content[at..at + 5], "vualt");
    }

    #[test]
    fn locate_misses_absent_keys() {
        assert_eq!(locate("[vault]\nkey = 1\n", Some("auth"), "key"), None);
    }
}
