// src/export/logic.rs

use crate::db::pool::DbPool;
use crate::db::queries::{assets, attendance, parts, tickets};
use crate::db::settings;
use crate::errors::{AppError, AppResult};
use crate::export::fs_utils::ensure_writable;
use crate::export::json_csv::{export_csv, export_json};
use crate::export::model::{AssetExport, AttendanceExport, ExportRow, PartExport, TicketExport};
use crate::export::range::parse_range;
use crate::export::xlsx::export_xlsx;
use crate::export::{ExportFormat, ExportTarget};
use crate::reports::ASSET_LIST_HEALTH;
use crate::ui::messages::warning;
use crate::utils::path::expand_tilde;
use chrono::NaiveDate;
use std::path::Path;

/// Logica di alto livello per l'export.
pub struct ExportLogic;

impl ExportLogic {
    /// Export of one view model.
    ///
    /// - `file`: output path, absolute (`~/` is expanded)
    /// - `range`: `None`, `"all"` or one of `YYYY`, `YYYY-MM`, `YYYY-MM-DD`
    ///   and their `start:end` intervals. Applied to creation dates;
    ///   assets and parts are exported whole.
    ///
    /// Returns the number of rows written.
    pub fn export(
        pool: &DbPool,
        what: ExportTarget,
        format: ExportFormat,
        file: &str,
        range: Option<&str>,
        force: bool,
    ) -> AppResult<usize> {
        let path = expand_tilde(file);

        if !path.is_absolute() {
            return Err(AppError::Export(format!(
                "output file path must be absolute: {file}"
            )));
        }

        let bounds: Option<(NaiveDate, NaiveDate)> = match range {
            None => None,
            Some(r) if r.eq_ignore_ascii_case("all") => None,
            Some(r) => Some(parse_range(r)?),
        };

        ensure_writable(&path, force)?;

        let conn = &pool.conn;
        match what {
            ExportTarget::Tickets => {
                let filter = tickets::TicketFilter {
                    created_between: bounds,
                    ..Default::default()
                };
                let rows: Vec<TicketExport> = tickets::list_tickets(conn, &filter)?
                    .iter()
                    .map(TicketExport::from)
                    .collect();
                write(&rows, format, &path)
            }
            ExportTarget::Assets => {
                let counts = assets::ticket_counts(conn)?;
                let rows: Vec<AssetExport> = assets::list_assets(conn, None)?
                    .iter()
                    .map(|a| {
                        let n = counts.get(&a.id).copied().unwrap_or(0);
                        AssetExport::new(a, n, ASSET_LIST_HEALTH.score(n))
                    })
                    .collect();
                write(&rows, format, &path)
            }
            ExportTarget::Attendance => {
                let rows: Vec<AttendanceExport> = attendance::list_attendance(conn, None, bounds)?
                    .iter()
                    .map(AttendanceExport::from)
                    .collect();
                write(&rows, format, &path)
            }
            ExportTarget::Parts => {
                let threshold = settings::low_stock_threshold(conn)?;
                let rows: Vec<PartExport> = parts::list_parts(conn)?
                    .iter()
                    .map(|p| PartExport::new(p, threshold))
                    .collect();
                write(&rows, format, &path)
            }
        }
    }
}

fn write<T: ExportRow>(rows: &[T], format: ExportFormat, path: &Path) -> AppResult<usize> {
    if rows.is_empty() {
        warning("No rows found for the selected range.");
        return Ok(0);
    }

    match format {
        ExportFormat::Csv => export_csv(rows, path)?,
        ExportFormat::Json => export_json(rows, path)?,
        ExportFormat::Xlsx => export_xlsx(rows, path)?,
    }

    Ok(rows.len())
}
