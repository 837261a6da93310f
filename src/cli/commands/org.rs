//! Organisation structure: brands, branches, sectors and areas.

use crate::cli::commands::{opt, print_or_empty};
use crate::cli::parser::{AreaAction, BranchAction, Commands, NamedAction};
use crate::config::Config;
use crate::db::log::oplog_quiet;
use crate::db::pool::DbPool;
use crate::db::queries::org::{self, NewBranch};
use crate::errors::{AppError, AppResult};
use crate::geofence::format_distance;
use crate::models::coordinates::Coordinates;
use crate::ui::messages::{info, success};
use crate::utils::table::Table;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let pool = DbPool::open(&cfg.database)?;

    match cmd {
        Commands::Brand { action } => brand(&pool, action),
        Commands::Branch { action } => branch(&pool, cfg, action),
        Commands::Sector { action } => sector(&pool, action),
        Commands::Area { action } => area(&pool, action),
        _ => Ok(()),
    }
}

fn require_name(name: &str) -> AppResult<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput("name cannot be empty".into()));
    }
    Ok(name)
}

fn brand(pool: &DbPool, action: &NamedAction) -> AppResult<()> {
    match action {
        NamedAction::Add { name } => {
            let id = org::insert_brand(&pool.conn, require_name(name)?)?;
            oplog_quiet(&pool.conn, "brand_add", &format!("#{id}"), name);
            success(format!("Brand #{id} '{name}' added."));
        }
        NamedAction::List => {
            let mut t = Table::new(["ID", "Brand"]);
            for b in org::list_brands(&pool.conn)? {
                t.add_row(vec![b.id.to_string(), b.name]);
            }
            print_or_empty(&t, "No brands yet.");
        }
    }
    Ok(())
}

fn branch(pool: &DbPool, cfg: &Config, action: &BranchAction) -> AppResult<()> {
    match action {
        BranchAction::Add {
            name,
            brand,
            lat,
            lng,
            radius,
        } => {
            if let Some(r) = radius
                && (!r.is_finite() || *r < 0.0)
            {
                return Err(AppError::InvalidInput(
                    "radius must be a non-negative number of meters".into(),
                ));
            }

            let location = Coordinates::from_columns(*lat, *lng);
            let id = org::insert_branch(
                &pool.conn,
                &NewBranch {
                    brand_id: *brand,
                    name: require_name(name)?,
                    location,
                    geofence_radius_meters: *radius,
                },
            )?;
            oplog_quiet(&pool.conn, "branch_add", &format!("#{id}"), name);
            success(format!("Branch #{id} '{name}' added."));
            if location.is_none() {
                info("No coordinates given: geofenced actions at this branch need them.");
            }
        }
        BranchAction::List => {
            let default_radius = format_distance(cfg.default_geofence_radius_meters);
            let mut t = Table::new(["ID", "Branch", "Brand", "Location", "Radius"]);
            for b in org::list_branches(&pool.conn)? {
                t.add_row(vec![
                    b.id.to_string(),
                    b.name,
                    opt(b.brand_id),
                    b.location
                        .map(|c| format!("{:.5}, {:.5}", c.lat, c.lng))
                        .unwrap_or_else(|| "--".into()),
                    b.geofence_radius_meters
                        .map(format_distance)
                        .unwrap_or_else(|| format!("{default_radius} (default)")),
                ]);
            }
            print_or_empty(&t, "No branches yet.");
        }
    }
    Ok(())
}

fn sector(pool: &DbPool, action: &NamedAction) -> AppResult<()> {
    match action {
        NamedAction::Add { name } => {
            let id = org::insert_sector(&pool.conn, require_name(name)?)?;
            success(format!("Sector #{id} '{name}' added."));
        }
        NamedAction::List => {
            let mut t = Table::new(["ID", "Sector"]);
            for s in org::list_sectors(&pool.conn)? {
                t.add_row(vec![s.id.to_string(), s.name]);
            }
            print_or_empty(&t, "No sectors yet.");
        }
    }
    Ok(())
}

fn area(pool: &DbPool, action: &AreaAction) -> AppResult<()> {
    match action {
        AreaAction::Add { sector, name } => {
            let id = org::insert_area(&pool.conn, *sector, require_name(name)?)?;
            success(format!("Area #{id} '{name}' added to sector #{sector}."));
        }
        AreaAction::List { sector } => {
            let mut t = Table::new(["ID", "Sector", "Area"]);
            for a in org::list_areas(&pool.conn, *sector)? {
                t.add_row(vec![a.id.to_string(), a.sector_id.to_string(), a.name]);
            }
            print_or_empty(&t, "No areas found.");
        }
    }
    Ok(())
}
