//! Dashboard statistics: one load per command, no cache.

use crate::db::pool::DbPool;
use crate::db::queries::parts::list_parts;
use crate::db::queries::profiles::get_profile;
use crate::db::queries::tickets::{TicketFilter, list_tickets};
use crate::db::settings::{low_stock_threshold, sla_threshold_hours};
use crate::db::stats::{StatusCountRow, dashboard_stats};
use crate::errors::{AppError, AppResult};
use crate::models::spare_part::SparePart;
use crate::reports::{SlaBreach, StatsSummary, low_stock, sla_breaches};
use crate::ui::messages::error;
use chrono::{DateTime, FixedOffset, NaiveDate};
use tokio_util::sync::CancellationToken;
use tracing::{error as log_error, info};

#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    pub summary: StatsSummary,
    pub by_status: Vec<StatusCountRow>,
    pub sla_threshold_hours: i64,
    pub sla_breaches: Vec<SlaBreach>,
    pub low_stock_threshold: i64,
    pub low_stock: Vec<SparePart>,
}

impl Dashboard {
    pub fn is_empty(&self) -> bool {
        self.summary.is_empty() && self.low_stock.is_empty()
    }
}

pub struct DashboardRequest {
    pub user_id: i64,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub now: DateTime<FixedOffset>,
}

pub struct DashboardLogic;

impl DashboardLogic {
    /// Load every figure of the dashboard.
    ///
    /// Returns `Ok(None)` when `cancel` fired before the result was
    /// committed; the partial data is dropped.
    pub fn load(
        pool: &DbPool,
        req: &DashboardRequest,
        cancel: &CancellationToken,
    ) -> AppResult<Option<Dashboard>> {
        let conn = &pool.conn;
        let profile = get_profile(conn, req.user_id)?;

        let filter = TicketFilter {
            assigned_to: (!profile.role.sees_everything()).then_some(profile.id),
            created_between: Some((req.from, req.to)),
            ..Default::default()
        };
        let tickets = list_tickets(conn, &filter)?;
        if cancel.is_cancelled() {
            return Ok(None);
        }

        let by_status = dashboard_stats(conn, req.user_id, req.from, req.to)?;
        let sla = sla_threshold_hours(conn)?;
        let stock = low_stock_threshold(conn)?;
        let parts = list_parts(conn)?;

        let today = req.now.format("%Y-%m-%d").to_string();
        let dashboard = Dashboard {
            summary: StatsSummary::from_tickets(&tickets, &today),
            by_status,
            sla_threshold_hours: sla,
            sla_breaches: sla_breaches(&tickets, sla, req.now),
            low_stock_threshold: stock,
            low_stock: low_stock(&parts, stock).into_iter().cloned().collect(),
        };

        if cancel.is_cancelled() {
            info!("dashboard load cancelled, result dropped");
            return Ok(None);
        }
        Ok(Some(dashboard))
    }

    /// Like [`DashboardLogic::load`], but a store failure renders as an
    /// empty dashboard after a generic message. Input errors (unknown user)
    /// still propagate.
    pub fn load_or_empty(
        pool: &DbPool,
        req: &DashboardRequest,
        cancel: &CancellationToken,
    ) -> AppResult<Option<Dashboard>> {
        match Self::load(pool, req, cancel) {
            Err(e @ (AppError::Db(_) | AppError::Schema { .. })) => {
                log_error!(error = %e, "dashboard load failed");
                error("Could not load statistics, showing an empty dashboard.");
                Ok(Some(Dashboard::default()))
            }
            other => other,
        }
    }
}
