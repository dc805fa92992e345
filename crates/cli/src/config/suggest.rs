// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Name suggestions for config validation errors.

use crate::dimension::{Dimension, Scope};

/// Suggest a dimension name for a typo.
pub fn suggest_dimension(unknown: &str) -> Option<Dimension> {
    if unknown.is_empty() {
        return None;
    }

    let alias = match unknown.to_ascii_lowercase().as_str() {
        "fmt" | "formatting" | "formatter" | "prettier" | "style" => Some(Dimension::Format),
        "linting" | "linter" | "lints" | "check" | "checks" => Some(Dimension::Lint),
        "tests" | "testing" | "unit" | "spec" | "specs" => Some(Dimension::Test),
        "sec" | "audit" | "vuln" | "vulnerabilities" | "sast" => Some(Dimension::Security),
        "compile" | "typecheck" | "types" | "tsc" | "builds" => Some(Dimension::Build),
        _ => None,
    };

    // Prefix matches need two characters.
    alias.or_else(|| {
        (unknown.len() >= 2)
            .then(|| {
                Dimension::ALL.into_iter().find(|dim| {
                    dim.as_str().starts_with(unknown) || unknown.starts_with(dim.as_str())
                })
            })
            .flatten()
    })
}

/// Suggest a scope key for a typo.
pub fn suggest_scope(unknown: &str) -> Option<Scope> {
    if unknown.is_empty() {
        return None;
    }

    let alias = match unknown.to_ascii_lowercase().as_str() {
        "fe" | "front" | "web" | "ui" | "client" => Some(Scope::Frontend),
        "be" | "back" | "api" | "server" => Some(Scope::Backend),
        "infra" | "ops" | "deploy" | "iac" => Some(Scope::Infrastructure),
        "test" | "tests" => Some(Scope::Testing),
        "doc" | "documentation" | "markdown" => Some(Scope::Docs),
        "*" | "any" | "default" => Some(Scope::All),
        _ => None,
    };

    alias.or_else(|| {
        (unknown.len() >= 2)
            .then(|| {
                Scope::ALL
                    .into_iter()
                    .find(|scope| scope.as_str().starts_with(unknown))
            })
            .flatten()
    })
}

/// Append a "did you mean" hint to a message.
pub fn with_hint(message: String, suggestion: Option<impl std::fmt::Display>) -> String {
    match suggestion {
        Some(s) => format!("{message} (did you mean `{s}`?)"),
        None => message,
    }
}

#[cfg(test)]
#[path = "suggest_tests.rs"]
mod tests;
