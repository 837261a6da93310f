//! Typed queries, one module per table group.

pub mod assets;
pub mod attendance;
pub mod org;
pub mod parts;
pub mod profiles;
pub mod schedules;
pub mod tickets;

use crate::errors::{AppError, AppResult};
use rusqlite::Connection;

/// Turn an empty `query_row` result into a `NotFound` error.
pub(crate) fn found<T>(
    res: rusqlite::Result<T>,
    entity: &'static str,
    id: i64,
) -> AppResult<T> {
    match res {
        Ok(v) => Ok(v),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(AppError::NotFound { entity, id }),
        Err(e) => Err(crate::db::rows::surface(e)),
    }
}

/// Run a row write and its audit entry as one unit. Joins the caller's
/// transaction when one is already open.
pub(crate) fn atomic<T>(
    conn: &Connection,
    f: impl FnOnce(&Connection) -> AppResult<T>,
) -> AppResult<T> {
    if !conn.is_autocommit() {
        return f(conn);
    }

    let tx = conn.unchecked_transaction()?;
    let out = f(&tx)?;
    tx.commit()?;
    Ok(out)
}
