use crate::export::{ExportFormat, ExportTarget};
use clap::{Args, Parser, Subcommand};

/// Command-line interface definition for maintdesk
/// Maintenance ticketing for multi-branch sites, backed by SQLite
#[derive(Parser)]
#[command(
    name = "maintdesk",
    version = env!("CARGO_PKG_VERSION"),
    about = "Maintenance ticketing CLI: assets, tickets, spare parts, technicians and geofenced check-ins on SQLite",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    /// Profile id the command acts as (recorded in the audit trail)
    #[arg(global = true, long = "as", value_name = "PROFILE_ID")]
    pub acting_as: Option<i64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Manage the configuration file (view, check, migrate or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,

        #[arg(long = "check", help = "Check configuration file for missing fields")]
        check: bool,

        #[arg(long = "migrate", help = "Add missing fields with their default values")]
        migrate: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print the internal operation log
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,

        #[arg(long = "op", help = "Only rows for this operation (e.g. ticket_close)")]
        operation: Option<String>,
    },

    /// Brands owning branches
    Brand {
        #[command(subcommand)]
        action: NamedAction,
    },

    /// Branches (sites) with their location and geofence radius
    Branch {
        #[command(subcommand)]
        action: BranchAction,
    },

    /// Sectors grouping areas
    Sector {
        #[command(subcommand)]
        action: NamedAction,
    },

    /// Areas inside a sector
    Area {
        #[command(subcommand)]
        action: AreaAction,
    },

    /// Technicians, managers and admins
    Tech {
        #[command(subcommand)]
        action: TechAction,
    },

    /// Assets installed at branches
    Asset {
        #[command(subcommand)]
        action: AssetAction,
    },

    /// Maintenance tickets
    Ticket {
        #[command(subcommand)]
        action: TicketAction,
    },

    /// Spare parts inventory
    Part {
        #[command(subcommand)]
        action: PartAction,
    },

    /// Check in at a branch (must be within its geofence)
    Checkin(AttendanceArgs),

    /// Check out of a branch (must be within its geofence)
    Checkout(AttendanceArgs),

    /// Replay position samples through the live geofence of a branch
    Track {
        #[arg(long)]
        branch: i64,

        #[arg(long, value_name = "FILE", help = "JSON lines of {lat, lng[, accuracy]} or {error}")]
        file: Option<String>,

        #[arg(long = "cadence-ms", help = "Delay between samples (default: geofence_poll_secs)")]
        cadence_ms: Option<u64>,
    },

    /// Passive location ping updating a technician's last known position
    Ping {
        #[arg(long)]
        tech: i64,

        #[arg(long, value_name = "FILE", help = "JSON lines of {lat, lng[, accuracy]} or {error}")]
        file: Option<String>,

        #[arg(long = "every-ms", help = "Ping period (default: location_ping_secs)")]
        every_ms: Option<u64>,

        #[arg(long = "cadence-ms", help = "Delay between samples (default: geofence_poll_secs)")]
        cadence_ms: Option<u64>,
    },

    /// Preventive maintenance schedules
    Schedule {
        #[command(subcommand)]
        action: ScheduleAction,
    },

    /// Dashboard summary for the acting user
    Stats {
        #[arg(long, value_name = "RANGE", help = "Creation-date range (default: current month)")]
        range: Option<String>,
    },

    /// Aggregate reports
    Report {
        #[command(subcommand)]
        kind: ReportKind,
    },

    /// Audit trail of a record, with field diffs
    Audit {
        #[arg(long, help = "Table name (tickets, assets, spare_parts)")]
        table: Option<String>,

        #[arg(long, requires = "table")]
        id: Option<i64>,

        #[arg(long, default_value_t = 20, help = "Number of recent rows when no record is given")]
        recent: usize,
    },

    /// Application settings (geofence, SLA and stock thresholds)
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Export tickets, assets, attendance or parts
    Export {
        #[arg(long, value_enum, default_value = "tickets")]
        what: ExportTarget,

        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,

        #[arg(long, value_name = "FILE")]
        file: String,

        #[arg(
            long,
            value_name = "RANGE",
            help = "Filter export by year/month/day or a custom range"
        )]
        range: Option<String>,

        #[arg(long, short = 'f')]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum NamedAction {
    Add { name: String },
    List,
}

#[derive(Subcommand)]
pub enum BranchAction {
    Add {
        name: String,

        #[arg(long)]
        brand: Option<i64>,

        #[arg(long, requires = "lng", allow_hyphen_values = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lng: Option<f64>,

        #[arg(long, help = "Geofence radius in meters (default from settings)")]
        radius: Option<f64>,
    },
    List,
}

#[derive(Subcommand)]
pub enum AreaAction {
    Add {
        #[arg(long)]
        sector: i64,

        name: String,
    },
    List {
        #[arg(long)]
        sector: Option<i64>,
    },
}

#[derive(Subcommand)]
pub enum TechAction {
    Add {
        name: String,

        #[arg(long, default_value = "technician", help = "admin, manager or technician")]
        role: String,
    },
    List {
        #[arg(long)]
        role: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum AssetAction {
    Add {
        name: String,

        #[arg(long)]
        branch: i64,

        #[arg(long)]
        area: Option<i64>,

        #[arg(long, default_value = "general")]
        category: String,

        #[arg(long)]
        serial: Option<String>,

        #[arg(long = "spec", help = "Specification as a JSON object")]
        specification: Option<String>,
    },
    Update {
        id: i64,

        #[arg(long)]
        status: Option<String>,

        #[arg(long = "spec", help = "Specification as a JSON object")]
        specification: Option<String>,
    },
    List {
        #[arg(long)]
        branch: Option<i64>,
    },
    /// Asset detail: history, MTBF, recurring faults, health
    Show { id: i64 },
    /// Health score of every asset
    Health {
        #[arg(long)]
        branch: Option<i64>,
    },
}

#[derive(Subcommand)]
pub enum TicketAction {
    Open {
        title: String,

        #[arg(long)]
        asset: i64,

        #[arg(long, default_value = "general")]
        category: String,

        #[arg(long, default_value = "medium", help = "low, medium, high or emergency")]
        priority: String,

        #[arg(long = "at", help = "Backdate creation (YYYY-MM-DD[THH:MM] or RFC 3339)")]
        created_at: Option<String>,
    },
    List {
        #[arg(long)]
        status: Option<String>,

        #[arg(long)]
        branch: Option<i64>,

        #[arg(long)]
        asset: Option<i64>,

        #[arg(long = "assigned")]
        assigned_to: Option<i64>,

        #[arg(long, value_name = "RANGE")]
        range: Option<String>,
    },
    Assign {
        id: i64,

        #[arg(long)]
        tech: i64,
    },
    Status {
        id: i64,

        status: String,

        #[arg(long)]
        priority: Option<String>,
    },
    /// Close a ticket from the asset's branch
    Close {
        id: i64,

        #[arg(long, requires = "lng", allow_hyphen_values = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lng: Option<f64>,

        #[arg(long)]
        cost: Option<f64>,
    },
    /// List parts used on a ticket, or consume one with --add
    Parts {
        id: i64,

        #[arg(long = "add", value_name = "PART_ID")]
        part: Option<i64>,

        #[arg(long = "qty", default_value_t = 1, requires = "part")]
        quantity: i64,
    },
}

#[derive(Subcommand)]
pub enum PartAction {
    Add {
        name: String,

        #[arg(long)]
        sku: String,

        #[arg(long, default_value_t = 0)]
        stock: i64,

        #[arg(long = "cost", default_value_t = 0.0)]
        unit_cost: f64,
    },
    List {
        #[arg(long = "low", help = "Only parts at or below the low-stock threshold")]
        low_only: bool,
    },
    Restock {
        id: i64,

        quantity: i64,
    },
}

#[derive(Args)]
pub struct AttendanceArgs {
    #[arg(long)]
    pub tech: i64,

    #[arg(long)]
    pub branch: i64,

    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    #[arg(long, allow_hyphen_values = true)]
    pub lng: f64,

    #[arg(long, help = "Reported accuracy in meters")]
    pub accuracy: Option<f64>,
}

#[derive(Subcommand)]
pub enum ScheduleAction {
    Add {
        title: String,

        #[arg(long)]
        asset: i64,

        #[arg(long = "every", value_name = "DAYS")]
        frequency_days: i64,

        #[arg(long = "first", value_name = "YYYY-MM-DD", help = "First due date (default: today)")]
        first_due: Option<String>,
    },
    List {
        #[arg(long)]
        asset: Option<i64>,
    },
    /// Open tickets for every due schedule
    Run {
        #[arg(long = "date", value_name = "YYYY-MM-DD", help = "Run as of this date (default: today)")]
        date: Option<String>,
    },
    Pause { id: i64 },
    Resume { id: i64 },
}

#[derive(Subcommand)]
pub enum ReportKind {
    /// Monthly parts and ticket spending
    Spending {
        #[arg(long, value_name = "RANGE")]
        range: Option<String>,
    },
    /// Closed tickets and resolution time per technician
    Performance {
        #[arg(long, value_name = "RANGE")]
        range: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum SettingsAction {
    Get { key: String },
    Set { key: String, value: String },
    List,
}
