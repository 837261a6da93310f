#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use std::env;
use std::fs;
use std::path::PathBuf;

/// Branch used by every seeded dataset (downtown Cairo).
pub const SITE_LAT: &str = "30.0444";
pub const SITE_LNG: &str = "31.2357";

/// ~111 m north of the site: inside the default 200 m radius.
pub const NEAR_LAT: &str = "30.0454";
/// ~1.1 km north of the site.
pub const FAR_LAT: &str = "30.0544";

/// Profile ids created by [`init_db_with_data`].
pub const ADMIN: &str = "1";
pub const TECH: &str = "2";

pub fn mdk() -> Command {
    cargo_bin_cmd!("maintdesk")
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_maintdesk.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Create a temporary output file path inside tempdir and ensure it's removed
pub fn temp_out(name: &str, ext: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_out.{}", name, ext));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

/// Run a command against `db_path`, expecting success.
pub fn ok(db_path: &str, args: &[&str]) {
    mdk().arg("--db").arg(db_path).args(args).assert().success();
}

/// Initialize DB and add a small dataset useful for many tests:
/// admin #1, technician #2, brand #1, branch #1 (with location),
/// asset #1 and ticket #1 on it.
pub fn init_db_with_data(db_path: &str) {
    ok(db_path, &["--test", "init"]);

    ok(db_path, &["tech", "add", "Mona", "--role", "admin"]);
    ok(db_path, &["tech", "add", "Karim"]);
    ok(db_path, &["brand", "add", "Koshary House"]);
    ok(
        db_path,
        &[
            "branch", "add", "Downtown", "--brand", "1", "--lat", SITE_LAT, "--lng", SITE_LNG,
        ],
    );
    ok(
        db_path,
        &[
            "--as", ADMIN, "asset", "add", "Walk-in freezer", "--branch", "1", "--category",
            "refrigeration", "--serial", "WF-001",
        ],
    );
    ok(
        db_path,
        &[
            "--as", ADMIN, "ticket", "open", "Freezer not cooling", "--asset", "1", "--priority",
            "high", "--category", "refrigeration",
        ],
    );
}
