// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Section parsers for qgate.toml.
//!
//! Each parser returns a message without the file path; the caller
//! attaches the path when building the config error.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use super::duration;
use super::suggest::{suggest_dimension, suggest_scope, with_hint};
use super::{DimensionEntry, DodProfile, FastConfig, RunConfig, ToolDef};
use crate::dimension::{Dimension, Scope};

type ParseResult<T> = std::result::Result<T, String>;

/// Key inside `[dimensions.<dim>]` naming the dimension-aggregate adapter.
const AGGREGATE_KEY: &str = "aggregate";

pub(super) fn warn_unknown_key(path: &Path, key: &str) {
    eprintln!(
        "qgate: warning: {}: unrecognized field `{}` (ignored)",
        path.display(),
        key
    );
}

pub(super) fn parse_run(value: toml::Value) -> ParseResult<RunConfig> {
    value.try_into().map_err(|e| format!("run: {e}"))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFast {
    #[serde(default)]
    dimensions: Option<Vec<String>>,
    #[serde(default)]
    disabled_checks: Option<Vec<String>>,
    #[serde(default)]
    timeouts: Option<RawTimeouts>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTimeouts {
    #[serde(default, deserialize_with = "duration::deserialize_timeout")]
    simple: Option<Duration>,
    #[serde(default, deserialize_with = "duration::deserialize_timeout")]
    standard: Option<Duration>,
    #[serde(default, deserialize_with = "duration::deserialize_timeout")]
    heavy: Option<Duration>,
}

/// Overlay `[fast]` onto the defaults. Absent keys keep their default.
pub(super) fn parse_fast(value: toml::Value, fast: &mut FastConfig) -> ParseResult<()> {
    let raw: RawFast = value.try_into().map_err(|e| format!("fast: {e}"))?;

    if let Some(names) = raw.dimensions {
        fast.dimensions = parse_dimension_list("fast.dimensions", &names)?;
    }
    if let Some(checks) = raw.disabled_checks {
        fast.disabled_checks = checks;
    }
    if let Some(timeouts) = raw.timeouts {
        if let Some(d) = timeouts.simple {
            fast.timeouts.simple = d;
        }
        if let Some(d) = timeouts.standard {
            fast.timeouts.standard = d;
        }
        if let Some(d) = timeouts.heavy {
            fast.timeouts.heavy = d;
        }
    }
    Ok(())
}

/// Parse `[dimensions.*]` into typed entries, rejecting unknown keys.
pub(super) fn parse_dimensions(
    value: toml::Value,
) -> ParseResult<Vec<(Dimension, DimensionEntry)>> {
    let toml::Value::Table(table) = value else {
        return Err("dimensions: expected a table".to_string());
    };

    let mut entries = Vec::with_capacity(table.len());
    for (key, value) in table {
        let dimension = parse_dimension_name("dimensions", &key)?;
        let toml::Value::Table(scopes) = value else {
            return Err(format!("dimensions.{key}: expected a table"));
        };

        let mut entry = DimensionEntry::default();
        for (scope_key, value) in scopes {
            if scope_key == AGGREGATE_KEY {
                let name = value
                    .as_str()
                    .ok_or_else(|| format!("dimensions.{key}.aggregate: expected a tool name"))?;
                entry.aggregate = Some(name.to_string());
                continue;
            }
            let scope = scope_key.parse::<Scope>().map_err(|_| {
                with_hint(
                    format!("dimensions.{key}: unknown scope `{scope_key}`"),
                    suggest_scope(&scope_key),
                )
            })?;
            let names = string_list(&value).ok_or_else(|| {
                format!("dimensions.{key}.{scope_key}: expected an array of tool names")
            })?;
            entry.tools.insert(scope, names);
        }
        entries.push((dimension, entry));
    }
    Ok(entries)
}

pub(super) fn parse_tools(value: toml::Value) -> ParseResult<BTreeMap<String, ToolDef>> {
    let toml::Value::Table(table) = value else {
        return Err("tools: expected a table".to_string());
    };
    table
        .into_iter()
        .map(|(name, value)| {
            let def: ToolDef = value.try_into().map_err(|e| format!("tools.{name}: {e}"))?;
            Ok((name, def))
        })
        .collect()
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDod {
    dimensions: Vec<String>,
}

pub(super) fn parse_dod(value: toml::Value) -> ParseResult<BTreeMap<String, DodProfile>> {
    let toml::Value::Table(table) = value else {
        return Err("dod: expected a table".to_string());
    };
    table
        .into_iter()
        .map(|(label, value)| {
            let raw: RawDod = value.try_into().map_err(|e| format!("dod.{label}: {e}"))?;
            let dimensions =
                parse_dimension_list(&format!("dod.{label}.dimensions"), &raw.dimensions)?;
            Ok((label, DodProfile { dimensions }))
        })
        .collect()
}

fn parse_dimension_name(section: &str, name: &str) -> ParseResult<Dimension> {
    name.parse::<Dimension>().map_err(|_| {
        with_hint(
            format!("{section}: unknown dimension `{name}`"),
            suggest_dimension(name),
        )
    })
}

/// Parse a dimension list into canonical order without duplicates.
fn parse_dimension_list(key: &str, names: &[String]) -> ParseResult<Vec<Dimension>> {
    let mut dims = names
        .iter()
        .map(|name| parse_dimension_name(key, name))
        .collect::<ParseResult<Vec<_>>>()?;
    dims.sort();
    dims.dedup();
    Ok(dims)
}

fn string_list(value: &toml::Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(String::from))
        .collect()
}
