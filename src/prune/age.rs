// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Age cutoff parsing and filtering
//!
//! Durations are written as an integer followed by `h` (hours), `d` (days)
//! or `m` (minutes). The cutoff is computed once per run as `now - duration`.

use chrono::{DateTime, Duration, Utc};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use super::PruneError;

/// Parse an age spec into a cutoff instant relative to the current time.
/// An empty spec means no age filter.
pub fn parse_age(spec: &str) -> Result<Option<DateTime<Utc>>, PruneError> {
    parse_age_at(spec, Utc::now())
}

/// Parse an age spec into a cutoff instant relative to `now`
pub fn parse_age_at(spec: &str, now: DateTime<Utc>) -> Result<Option<DateTime<Utc>>, PruneError> {
    if spec.is_empty() {
        return Ok(None);
    }

    let invalid = |reason| PruneError::InvalidAge {
        input: spec.to_string(),
        reason,
    };

    let unit_len = spec.chars().last().map_or(0, char::len_utf8);
    let (magnitude, unit) = spec.split_at(spec.len() - unit_len);
    let to_duration: fn(i64) -> Option<Duration> = match unit {
        "h" => Duration::try_hours,
        "d" => Duration::try_days,
        "m" => Duration::try_minutes,
        _ => return Err(invalid("use h for hours, d for days, m for minutes")),
    };

    let magnitude: i64 = magnitude
        .parse()
        .map_err(|_| invalid("magnitude must be an integer"))?;
    let duration = to_duration(magnitude).ok_or_else(|| invalid("duration out of range"))?;

    now.checked_sub_signed(duration)
        .map(Some)
        .ok_or_else(|| invalid("duration out of range"))
}

/// Creation time of an object, treating a missing timestamp as the epoch
pub fn created_at(meta: &ObjectMeta) -> DateTime<Utc> {
    meta.creation_timestamp
        .as_ref()
        .map(|t| t.0)
        .unwrap_or(DateTime::UNIX_EPOCH)
}

/// An object passes when no cutoff is set or it was created at or before the cutoff
pub fn passes_cutoff(created: DateTime<Utc>, cutoff: Option<DateTime<Utc>>) -> bool {
    cutoff.is_none_or(|cutoff| created <= cutoff)
}
