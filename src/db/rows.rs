//! Row validation helpers.
//!
//! Every row read from the store is parsed into a typed struct right after
//! the fetch. Values that do not match the expected shape are rejected with
//! `AppError::Schema`, never coerced.

use crate::errors::{AppError, AppResult};
use chrono::{DateTime, FixedOffset, NaiveDate};
use rusqlite::types::Type;
use serde_json::Value;
use std::fmt::Display;

pub(crate) fn invalid(table: &'static str, column: &str, value: impl Display) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        Type::Text,
        Box::new(AppError::Schema {
            table,
            detail: format!("{column}: unexpected value '{value}'"),
        }),
    )
}

pub(crate) fn timestamp(
    table: &'static str,
    column: &str,
    raw: &str,
) -> rusqlite::Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw).map_err(|_| invalid(table, column, raw))
}

pub(crate) fn opt_timestamp(
    table: &'static str,
    column: &str,
    raw: Option<String>,
) -> rusqlite::Result<Option<DateTime<FixedOffset>>> {
    raw.map(|r| timestamp(table, column, &r)).transpose()
}

pub(crate) fn date(table: &'static str, column: &str, raw: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| invalid(table, column, raw))
}

pub(crate) fn json(
    table: &'static str,
    column: &str,
    raw: Option<String>,
) -> rusqlite::Result<Option<Value>> {
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => serde_json::from_str(&s)
            .map(Some)
            .map_err(|_| invalid(table, column, s)),
    }
}

/// Bring a shape mismatch wrapped by rusqlite back to the surface.
pub(crate) fn surface(e: rusqlite::Error) -> AppError {
    match e {
        rusqlite::Error::FromSqlConversionFailure(idx, ty, inner) => {
            match inner.downcast::<AppError>() {
                Ok(app) => *app,
                Err(other) => AppError::Db(rusqlite::Error::FromSqlConversionFailure(idx, ty, other)),
            }
        }
        other => AppError::Db(other),
    }
}

/// Collect mapped rows, surfacing the first failure.
pub(crate) fn collect<T, I>(rows: I) -> AppResult<Vec<T>>
where
    I: Iterator<Item = rusqlite::Result<T>>,
{
    rows.map(|r| r.map_err(surface)).collect()
}
