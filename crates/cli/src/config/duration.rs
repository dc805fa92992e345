// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Timeout strings: `500ms`, `30s`, `1.5s`, `2m`, `1h`, and compound
//! forms such as `2m30s`.

use std::time::Duration;

use serde::{Deserialize, Deserializer};

/// Parse a duration string. Segments are summed left to right.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration".to_string());
    }

    let mut total = 0.0_f64;
    let mut rest = s;
    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_end);
        let value: f64 = number
            .parse()
            .map_err(|_| format!("invalid duration `{s}`"))?;

        let tail = tail.trim_start();
        let unit_end = tail
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(tail.len());
        let (unit, next) = tail.split_at(unit_end);
        let scale = match unit {
            "ms" => 0.001,
            "s" => 1.0,
            "m" => 60.0,
            "h" => 3600.0,
            "" => return Err(format!("missing unit in `{s}` (use ms, s, m or h)")),
            other => return Err(format!("unknown unit `{other}` in `{s}`")),
        };
        total += value * scale;
        rest = next.trim_start();
    }

    Ok(Duration::from_secs_f64(total))
}

/// Parse a timeout. Zero is rejected since it would kill every tool.
pub fn parse_timeout(s: &str) -> Result<Duration, String> {
    let duration = parse_duration(s)?;
    if duration.is_zero() {
        return Err(format!("timeout `{}` must be greater than zero", s.trim()));
    }
    Ok(duration)
}

/// Deserialize an optional timeout string.
pub fn deserialize_timeout<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|s| parse_timeout(&s).map_err(serde::de::Error::custom))
        .transpose()
}

#[cfg(test)]
#[path = "duration_tests.rs"]
mod tests;
