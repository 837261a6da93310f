use crate::config::Config;
use crate::core::site::{SiteCheck, require_on_site};
use crate::db::log::oplog_quiet;
use crate::db::pool::DbPool;
use crate::db::queries::profiles::get_profile;
use crate::db::queries::tickets::{self, NewTicket};
use crate::errors::{AppError, AppResult};
use crate::models::coordinates::PositionSample;
use crate::models::profile::Role;
use crate::models::ticket::{Ticket, TicketPriority, TicketStatus};

/// High-level business logic for the `ticket` command.
pub struct TicketLogic;

impl TicketLogic {
    pub fn open(pool: &DbPool, new: &NewTicket) -> AppResult<Ticket> {
        if new.title.trim().is_empty() {
            return Err(AppError::InvalidInput("ticket title cannot be empty".into()));
        }
        let id = tickets::insert_ticket(&pool.conn, new)?;
        let ticket = tickets::get_ticket(&pool.conn, id)?;

        oplog_quiet(
            &pool.conn,
            "ticket_open",
            &format!("#{id}"),
            &format!(
                "'{}' on asset #{} ({})",
                ticket.title,
                ticket.asset_id,
                ticket.priority.to_db_str()
            ),
        );
        Ok(ticket)
    }

    /// Assign a ticket to a technician. Open tickets move to `assigned`.
    pub fn assign(
        pool: &DbPool,
        ticket_id: i64,
        technician_id: i64,
        by: Option<i64>,
    ) -> AppResult<Ticket> {
        let tech = get_profile(&pool.conn, technician_id)?;
        if tech.role != Role::Technician {
            return Err(AppError::InvalidRole(format!(
                "{} is a {}, tickets go to technicians",
                tech.name,
                tech.role.to_db_str()
            )));
        }

        let mut ticket = tickets::get_ticket(&pool.conn, ticket_id)?;
        ensure_active(&ticket)?;

        ticket.assigned_to = Some(tech.id);
        if ticket.status == TicketStatus::Open {
            ticket.status = TicketStatus::Assigned;
        }
        tickets::update_ticket(&pool.conn, &ticket, by)?;

        oplog_quiet(
            &pool.conn,
            "ticket_assign",
            &format!("#{ticket_id}"),
            &format!("assigned to {} (#{})", tech.name, tech.id),
        );
        tickets::get_ticket(&pool.conn, ticket_id)
    }

    /// Move a ticket to any non-closing status. Closing goes through
    /// [`TicketLogic::close`], which checks the technician is on site.
    pub fn set_status(
        pool: &DbPool,
        ticket_id: i64,
        status: TicketStatus,
        priority: Option<TicketPriority>,
        by: Option<i64>,
    ) -> AppResult<Ticket> {
        if status == TicketStatus::Closed {
            return Err(AppError::InvalidStatus(
                "use `ticket close` to close a ticket".into(),
            ));
        }

        let mut ticket = tickets::get_ticket(&pool.conn, ticket_id)?;
        ensure_active(&ticket)?;

        let from = ticket.status;
        ticket.status = status;
        if let Some(p) = priority {
            ticket.priority = p;
        }
        tickets::update_ticket(&pool.conn, &ticket, by)?;

        oplog_quiet(
            &pool.conn,
            "ticket_status",
            &format!("#{ticket_id}"),
            &format!("{} → {}", from.to_db_str(), status.to_db_str()),
        );
        tickets::get_ticket(&pool.conn, ticket_id)
    }

    /// Close a ticket from the asset's branch.
    pub fn close(
        pool: &DbPool,
        cfg: &Config,
        ticket_id: i64,
        by: Option<i64>,
        sample: Option<&PositionSample>,
        cost: Option<f64>,
    ) -> AppResult<(Ticket, SiteCheck)> {
        let mut ticket = tickets::get_ticket(&pool.conn, ticket_id)?;
        ensure_active(&ticket)?;

        if let Some(c) = cost
            && (!c.is_finite() || c < 0.0)
        {
            return Err(AppError::InvalidInput("cost must be a non-negative number".into()));
        }

        let check = require_on_site(&pool.conn, cfg, ticket.branch_id, sample)?;

        ticket.status = TicketStatus::Closed;
        if let Some(c) = cost {
            ticket.cost = c;
        }
        tickets::update_ticket(&pool.conn, &ticket, by)?;

        oplog_quiet(
            &pool.conn,
            "ticket_close",
            &format!("#{ticket_id}"),
            &format!(
                "closed at {} ({})",
                check.branch.name,
                check.decision.distance_label()
            ),
        );
        Ok((tickets::get_ticket(&pool.conn, ticket_id)?, check))
    }

    pub fn add_part(
        pool: &DbPool,
        ticket_id: i64,
        part_id: i64,
        quantity: i64,
        by: Option<i64>,
    ) -> AppResult<()> {
        tickets::add_part(&pool.conn, ticket_id, part_id, quantity, by)?;
        oplog_quiet(
            &pool.conn,
            "ticket_part",
            &format!("#{ticket_id}"),
            &format!("{quantity} × part #{part_id}"),
        );
        Ok(())
    }
}

fn ensure_active(ticket: &Ticket) -> AppResult<()> {
    if ticket.status.is_terminal() {
        return Err(AppError::InvalidStatus(format!(
            "ticket #{} is already {}",
            ticket.id,
            ticket.status.to_db_str()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::audit::load_for_record;
    use crate::db::queries::assets::{NewAsset, insert_asset};
    use crate::db::queries::org::{NewBranch, insert_branch};
    use crate::db::queries::profiles::insert_profile;
    use crate::models::coordinates::Coordinates;

    struct Fixture {
        pool: DbPool,
        asset: i64,
        tech: i64,
        manager: i64,
    }

    fn fixture() -> Fixture {
        let pool = DbPool::in_memory().unwrap();
        let c = &pool.conn;
        let branch = insert_branch(
            c,
            &NewBranch {
                brand_id: None,
                name: "Downtown",
                location: Some(Coordinates::new(30.0444, 31.2357)),
                geofence_radius_meters: None,
            },
        )
        .unwrap();
        let asset = insert_asset(
            c,
            &NewAsset {
                branch_id: branch,
                area_id: None,
                name: "Chiller 1",
                category: "hvac",
                serial: None,
                specification: None,
            },
            None,
        )
        .unwrap();
        let tech = insert_profile(c, "Karim", Role::Technician).unwrap();
        let manager = insert_profile(c, "Mona", Role::Manager).unwrap();
        Fixture {
            pool,
            asset,
            tech,
            manager,
        }
    }

    fn open(f: &Fixture) -> Ticket {
        TicketLogic::open(
            &f.pool,
            &NewTicket {
                asset_id: f.asset,
                title: "No cooling",
                category: "HVAC",
                priority: TicketPriority::High,
                created_by: Some(f.manager),
                created_at: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn assign_moves_open_ticket_to_assigned() {
        let f = fixture();
        let t = open(&f);
        assert_eq!(t.category, "hvac");

        let t = TicketLogic::assign(&f.pool, t.id, f.tech, Some(f.manager)).unwrap();
        assert_eq!(t.status, TicketStatus::Assigned);
        assert_eq!(t.assigned_to, Some(f.tech));

        let err = TicketLogic::assign(&f.pool, t.id, f.manager, None).unwrap_err();
        assert!(matches!(err, AppError::InvalidRole(_)));
    }

    #[test]
    fn close_requires_being_on_site() {
        let f = fixture();
        let cfg = Config::default();
        let t = open(&f);

        let far = PositionSample::new(30.0544, 31.2357);
        assert!(TicketLogic::close(&f.pool, &cfg, t.id, Some(f.tech), Some(&far), None).is_err());
        assert_eq!(
            tickets::get_ticket(&f.pool.conn, t.id).unwrap().status,
            TicketStatus::Open
        );

        let near = PositionSample::new(30.0454, 31.2357);
        let (closed, check) =
            TicketLogic::close(&f.pool, &cfg, t.id, Some(f.tech), Some(&near), Some(80.0))
                .unwrap();
        assert_eq!(closed.status, TicketStatus::Closed);
        assert!(closed.closed_at.is_some());
        assert_eq!(closed.cost, 80.0);
        assert!(check.decision.distance_meters.unwrap() < 205.0);

        // closed tickets stay closed
        let err = TicketLogic::set_status(&f.pool, t.id, TicketStatus::OnHold, None, None)
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidStatus(_)));
    }

    #[test]
    fn status_changes_are_audited() {
        let f = fixture();
        let t = open(&f);
        TicketLogic::set_status(
            &f.pool,
            t.id,
            TicketStatus::InProgress,
            Some(TicketPriority::Emergency),
            Some(f.manager),
        )
        .unwrap();

        let rows = load_for_record(&f.pool.conn, "tickets", t.id).unwrap();
        assert_eq!(rows.len(), 2);
        let last = rows.last().unwrap();
        assert_eq!(last.changed_by, Some(f.manager));
        assert_eq!(last.new_data.as_ref().unwrap()["status"], "in_progress");
        assert_eq!(last.new_data.as_ref().unwrap()["priority"], "emergency");
    }

    #[test]
    fn closing_through_status_is_refused() {
        let f = fixture();
        let t = open(&f);
        let err =
            TicketLogic::set_status(&f.pool, t.id, TicketStatus::Closed, None, None).unwrap_err();
        assert!(matches!(err, AppError::InvalidStatus(_)));
    }
}
