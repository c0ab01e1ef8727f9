// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit columns and timestamp handling.
//!
//! Timestamps are stored as UTC text in the fixed form
//! `YYYY-MM-DDTHH:MM:SSZ`, which keeps lexical ordering identical to
//! chronological ordering so range filters can compare strings directly.

use crate::error::DomainError;
use chrono_tz::Tz;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

const STORAGE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z");

const DATE_ONLY_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Display format used in API responses.
pub const DISPLAY_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Timezone used when none is configured.
pub const DEFAULT_TIMEZONE: &str = "America/Chicago";

/// Creation and modification stamps shared by every mutable entity.
///
/// `created_*` is set once; `modified_*` stays `None` until the first update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditFields {
    pub created_at: String,
    pub created_by: String,
    pub modified_at: Option<String>,
    pub modified_by: Option<String>,
}

impl AuditFields {
    /// Builds the audit fields for a freshly created record.
    #[must_use]
    pub fn created(stamp: &AuditStamp) -> Self {
        Self {
            created_at: stamp.timestamp.clone(),
            created_by: stamp.actor.clone(),
            modified_at: None,
            modified_by: None,
        }
    }

    /// Records a modification. Creation stamps are left untouched.
    pub fn stamp_modification(&mut self, stamp: &AuditStamp) {
        self.modified_at = Some(stamp.timestamp.clone());
        self.modified_by = Some(stamp.actor.clone());
    }
}

/// Who performed a write, and when.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditStamp {
    /// Storage-format UTC timestamp.
    pub timestamp: String,
    /// Login code of the acting user.
    pub actor: String,
}

impl AuditStamp {
    /// Creates a stamp for `actor` at the current instant.
    #[must_use]
    pub fn now(actor: &str) -> Self {
        Self {
            timestamp: now_timestamp(),
            actor: actor.to_string(),
        }
    }
}

/// Returns the current UTC instant in storage format.
#[must_use]
pub fn now_timestamp() -> String {
    format_timestamp(OffsetDateTime::now_utc())
}

/// Formats an instant in storage format, normalizing it to UTC first.
#[must_use]
pub fn format_timestamp(value: OffsetDateTime) -> String {
    // The storage format has no fallible components.
    value
        .to_offset(UtcOffset::UTC)
        .format(STORAGE_FORMAT)
        .unwrap_or_default()
}

/// Parses a storage-format timestamp.
///
/// # Errors
///
/// Returns `DomainError::InvalidTimestamp` if the value is not in storage format.
pub fn parse_timestamp(value: &str) -> Result<OffsetDateTime, DomainError> {
    PrimitiveDateTime::parse(value, STORAGE_FORMAT)
        .map(PrimitiveDateTime::assume_utc)
        .map_err(|e| DomainError::InvalidTimestamp {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

/// Parses a date-range bound supplied by a client.
///
/// Accepts either a bare date (`YYYY-MM-DD`) or a full RFC 3339 instant. A
/// bare date expands to the start of the day, or to `23:59:59` when
/// `end_of_day` is set, so both bounds are inclusive.
///
/// # Errors
///
/// Returns `DomainError::InvalidTimestamp` if neither form parses.
pub fn parse_filter_bound(input: &str, end_of_day: bool) -> Result<String, DomainError> {
    let trimmed = input.trim();
    if let Ok(date) = time::Date::parse(trimmed, DATE_ONLY_FORMAT) {
        let (hour, minute, second) = if end_of_day { (23, 59, 59) } else { (0, 0, 0) };
        let time_of_day =
            time::Time::from_hms(hour, minute, second).map_err(|e| DomainError::InvalidTimestamp {
                value: input.to_string(),
                reason: e.to_string(),
            })?;
        return Ok(format_timestamp(
            PrimitiveDateTime::new(date, time_of_day).assume_utc(),
        ));
    }

    OffsetDateTime::parse(trimmed, &time::format_description::well_known::Rfc3339)
        .map(format_timestamp)
        .map_err(|e| DomainError::InvalidTimestamp {
            value: input.to_string(),
            reason: e.to_string(),
        })
}

/// Resolves an IANA timezone name.
///
/// # Errors
///
/// Returns `DomainError::InvalidTimezone` for an unknown name.
pub fn parse_timezone(name: &str) -> Result<Tz, DomainError> {
    name.parse::<Tz>()
        .map_err(|_| DomainError::InvalidTimezone(name.to_string()))
}

/// Renders a storage-format timestamp as `DD/MM/YYYY HH:mm:ss` in `tz`.
///
/// # Errors
///
/// Returns `DomainError::InvalidTimestamp` if `value` cannot be parsed.
pub fn format_for_display(value: &str, tz: Tz) -> Result<String, DomainError> {
    let parsed = parse_timestamp(value)?;
    let utc = chrono::DateTime::<chrono::Utc>::from_timestamp(parsed.unix_timestamp(), 0)
        .ok_or_else(|| DomainError::InvalidTimestamp {
            value: value.to_string(),
            reason: "out of range".to_string(),
        })?;
    Ok(utc.with_timezone(&tz).format(DISPLAY_FORMAT).to_string())
}
