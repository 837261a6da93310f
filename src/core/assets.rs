use crate::db::log::oplog_quiet;
use crate::db::pool::DbPool;
use crate::db::queries::assets::{self, NewAsset};
use crate::db::queries::org::get_branch;
use crate::db::queries::tickets::history_for_asset;
use crate::errors::AppResult;
use crate::models::asset::{Asset, parse_specification};
use crate::models::org::Branch;
use crate::models::ticket::Ticket;
use crate::reports::{
    ASSET_DETAIL_HEALTH, ASSET_DETAIL_RECURRENCE, ASSET_HISTORY_RECURRENCE, ASSET_LIST_HEALTH,
    mtbf_days,
};
use chrono::{DateTime, FixedOffset};

/// Asset with the figures shown in the detail view.
#[derive(Debug, Clone)]
pub struct AssetDetail {
    pub asset: Asset,
    pub branch: Branch,
    /// Newest first.
    pub history: Vec<Ticket>,
    pub mtbf_days: f64,
    pub health: u32,
    /// Detail-view warning (30 days, at least 3 tickets).
    pub recurring_fault: bool,
    /// History-view warning (60 days, more than 3 tickets).
    pub history_recurring_fault: bool,
}

/// Row of the asset list, scored with the list-view heuristic.
#[derive(Debug, Clone)]
pub struct AssetListEntry {
    pub asset: Asset,
    pub tickets: usize,
    pub health: u32,
}

pub struct AssetLogic;

impl AssetLogic {
    /// Register an asset. A specification, when given, must be a JSON
    /// object and is checked before anything is written.
    pub fn create(
        pool: &DbPool,
        new: NewAsset,
        specification: Option<&str>,
        by: Option<i64>,
    ) -> AppResult<Asset> {
        let spec = specification.map(parse_specification).transpose()?;
        let new = NewAsset {
            specification: spec.as_ref(),
            ..new
        };

        // the branch must exist before we bother the audit trail
        get_branch(&pool.conn, new.branch_id)?;

        let id = assets::insert_asset(&pool.conn, &new, by)?;
        let asset = assets::get_asset(&pool.conn, id)?;
        oplog_quiet(
            &pool.conn,
            "asset_add",
            &format!("#{id}"),
            &format!("{} ({})", asset.name, asset.category),
        );
        Ok(asset)
    }

    pub fn update(
        pool: &DbPool,
        id: i64,
        status: Option<&str>,
        specification: Option<&str>,
        by: Option<i64>,
    ) -> AppResult<Asset> {
        let spec = specification.map(parse_specification).transpose()?;

        let mut asset = assets::get_asset(&pool.conn, id)?;
        if let Some(s) = status {
            asset.status = s.trim().to_lowercase();
        }
        if spec.is_some() {
            asset.specification = spec;
        }
        assets::update_asset(&pool.conn, &asset, by)?;

        oplog_quiet(&pool.conn, "asset_update", &format!("#{id}"), &asset.name);
        assets::get_asset(&pool.conn, id)
    }

    pub fn list(pool: &DbPool, branch_id: Option<i64>) -> AppResult<Vec<AssetListEntry>> {
        let counts = assets::ticket_counts(&pool.conn)?;
        Ok(assets::list_assets(&pool.conn, branch_id)?
            .into_iter()
            .map(|asset| {
                let tickets = counts.get(&asset.id).copied().unwrap_or(0);
                AssetListEntry {
                    health: ASSET_LIST_HEALTH.score(tickets),
                    asset,
                    tickets,
                }
            })
            .collect())
    }

    pub fn detail(pool: &DbPool, id: i64, now: DateTime<FixedOffset>) -> AppResult<AssetDetail> {
        let asset = assets::get_asset(&pool.conn, id)?;
        let branch = get_branch(&pool.conn, asset.branch_id)?;
        let history = history_for_asset(&pool.conn, id)?;

        let created: Vec<DateTime<FixedOffset>> = history.iter().map(|t| t.created_at).collect();

        Ok(AssetDetail {
            mtbf_days: mtbf_days(&created),
            health: ASSET_DETAIL_HEALTH.score(history.len()),
            recurring_fault: ASSET_DETAIL_RECURRENCE.is_recurring(&created, now),
            history_recurring_fault: ASSET_HISTORY_RECURRENCE.is_recurring(&created, now),
            asset,
            branch,
            history,
        })
    }
}
