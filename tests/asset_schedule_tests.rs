use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

mod common;
use common::{ADMIN, init_db_with_data, mdk, ok, setup_test_db};

/// Asset #2 on branch #1 with two tickets ten days apart, long ago.
fn add_old_asset(db_path: &str) {
    ok(
        db_path,
        &[
            "--as", ADMIN, "asset", "add", "Fryer", "--branch", "1", "--category", "kitchen",
            "--spec", r#"{"brand": "Frymaster", "oil_litres": 25}"#,
        ],
    );
    for at in ["2024-01-01T09:00:00+00:00", "2024-01-11T09:00:00+00:00"] {
        ok(
            db_path,
            &[
                "--as", ADMIN, "ticket", "open", "Oil leak", "--asset", "2", "--at", at,
            ],
        );
    }
}

#[test]
fn test_asset_show_mtbf_and_health() {
    let db_path = setup_test_db("asset_show");
    init_db_with_data(&db_path);
    add_old_asset(&db_path);

    mdk()
        .args(["--db", &db_path, "asset", "show", "2"])
        .assert()
        .success()
        .stdout(contains("Asset #2 Fryer"))
        .stdout(contains("Branch      : Downtown (#1)"))
        .stdout(contains("MTBF        : 10.0 days"))
        // detail view: 100 - 10 per ticket
        .stdout(contains("80"))
        .stdout(contains("oil_litres: 25"))
        .stdout(contains("Oil leak"))
        .stdout(contains("Recurring fault").not());
}

#[test]
fn test_asset_list_and_health_use_list_score() {
    let db_path = setup_test_db("asset_health");
    init_db_with_data(&db_path);
    add_old_asset(&db_path);

    // list view: 100 - 5 per ticket
    mdk()
        .args(["--db", &db_path, "asset", "list"])
        .assert()
        .success()
        .stdout(contains("Walk-in freezer"))
        .stdout(contains("95"))
        .stdout(contains("90"));

    let out = mdk()
        .args(["--db", &db_path, "asset", "health"])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&out.stdout);
    let fryer = stdout.find("Fryer").unwrap();
    let freezer = stdout.find("Walk-in freezer").unwrap();
    assert!(fryer < freezer, "worst asset first:\n{stdout}");
}

#[test]
fn test_asset_show_recurring_fault() {
    let db_path = setup_test_db("asset_recurring");
    init_db_with_data(&db_path);

    for title in ["Door seal torn", "Compressor noise"] {
        ok(
            &db_path,
            &["--as", ADMIN, "ticket", "open", title, "--asset", "1"],
        );
    }

    mdk()
        .args(["--db", &db_path, "asset", "show", "1"])
        .assert()
        .success()
        .stdout(contains(
            "Recurring fault: 3 or more tickets in the last 30 days.",
        ))
        // three is not more than three
        .stdout(contains("in the last 60 days").not());
}

#[test]
fn test_asset_bad_specification() {
    let db_path = setup_test_db("asset_bad_spec");
    init_db_with_data(&db_path);

    for spec in ["[1, 2]", "{not json"] {
        mdk()
            .args([
                "--db", &db_path, "asset", "add", "Oven", "--branch", "1", "--spec", spec,
            ])
            .assert()
            .failure()
            .stderr(contains("Invalid specification JSON"));
    }

    mdk()
        .args(["--db", &db_path, "asset", "list"])
        .assert()
        .success()
        .stdout(contains("Oven").not());
}

#[test]
fn test_asset_update_status() {
    let db_path = setup_test_db("asset_update");
    init_db_with_data(&db_path);

    mdk()
        .args(["--db", &db_path, "asset", "update", "1", "--status", "Out_Of_Service"])
        .assert()
        .success()
        .stdout(contains("updated (out_of_service)"));

    mdk()
        .args(["--db", &db_path, "asset", "show", "99"])
        .assert()
        .failure()
        .stderr(contains("#99 not found"));
}

#[test]
fn test_schedule_run_opens_preventive_ticket() {
    let db_path = setup_test_db("schedule_run");
    init_db_with_data(&db_path);

    mdk()
        .args([
            "--db", &db_path, "schedule", "add", "Clean condenser coils", "--asset", "1",
            "--every", "30", "--first", "2024-01-01",
        ])
        .assert()
        .success()
        .stdout(contains("Schedule #1 added, first due 2024-01-01."));

    // two periods were missed: next due lands after the run date
    mdk()
        .args(["--db", &db_path, "schedule", "run", "--date", "2024-02-15"])
        .assert()
        .success()
        .stdout(contains("Schedule #1 → ticket #2 (next due 2024-03-01)."));

    mdk()
        .args(["--db", &db_path, "ticket", "list", "--asset", "1"])
        .assert()
        .success()
        .stdout(contains("Clean condenser coils"))
        .stdout(contains("preventive"));

    mdk()
        .args(["--db", &db_path, "schedule", "run", "--date", "2024-02-15"])
        .assert()
        .success()
        .stdout(contains("Nothing due."));

    mdk()
        .args(["--db", &db_path, "schedule", "list"])
        .assert()
        .success()
        .stdout(contains("2024-03-01"))
        .stdout(contains("2024-02-15"))
        .stdout(contains("30d"));
}

#[test]
fn test_schedule_pause_and_resume() {
    let db_path = setup_test_db("schedule_pause");
    init_db_with_data(&db_path);

    ok(
        &db_path,
        &[
            "schedule", "add", "Descale", "--asset", "1", "--every", "7", "--first", "2024-01-01",
        ],
    );

    mdk()
        .args(["--db", &db_path, "schedule", "pause", "1"])
        .assert()
        .success()
        .stdout(contains("Schedule #1 paused."));

    mdk()
        .args(["--db", &db_path, "schedule", "run", "--date", "2024-01-10"])
        .assert()
        .success()
        .stdout(contains("Nothing due."));

    ok(&db_path, &["schedule", "resume", "1"]);

    mdk()
        .args(["--db", &db_path, "schedule", "run", "--date", "2024-01-10"])
        .assert()
        .success()
        .stdout(contains("ticket #2"));
}

#[test]
fn test_schedule_unknown_asset() {
    let db_path = setup_test_db("schedule_unknown");
    init_db_with_data(&db_path);

    mdk()
        .args([
            "--db", &db_path, "schedule", "add", "Descale", "--asset", "42", "--every", "7",
        ])
        .assert()
        .failure()
        .stderr(contains("#42 not found"));
}

#[test]
fn test_db_check_and_info() {
    let db_path = setup_test_db("db_check");
    init_db_with_data(&db_path);

    mdk()
        .args(["--db", &db_path, "db", "--check"])
        .assert()
        .success()
        .stdout(contains("Integrity check passed."));

    mdk()
        .args(["--db", &db_path, "db", "--migrate"])
        .assert()
        .success()
        .stdout(contains("(0 applied)"));

    mdk()
        .args(["--db", &db_path, "db", "--info"])
        .assert()
        .success()
        .stdout(contains("Tickets:"));
}

#[test]
fn test_asset_history_orders_by_instant_across_offsets() {
    let db_path = setup_test_db("asset_mixed_offsets");
    init_db_with_data(&db_path);

    ok(
        &db_path,
        &["--as", ADMIN, "asset", "add", "Ice machine", "--branch", "1"],
    );
    // 20:00Z, opened from a +05:00 device
    ok(
        &db_path,
        &[
            "--as", ADMIN, "ticket", "open", "Scale build-up", "--asset", "2", "--at",
            "2025-03-10T01:00:00+05:00",
        ],
    );
    // 22:00Z, two hours later
    ok(
        &db_path,
        &[
            "--as", ADMIN, "ticket", "open", "Water leak", "--asset", "2", "--at",
            "2025-03-09T22:00:00+00:00",
        ],
    );

    let out = mdk()
        .args(["--db", &db_path, "asset", "show", "2"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);

    assert!(stdout.contains("MTBF        : 0.1 days"), "{stdout}");
    assert!(!stdout.contains("MTBF        : -"), "{stdout}");

    let newer = stdout.find("Water leak").unwrap();
    let older = stdout.find("Scale build-up").unwrap();
    assert!(newer < older, "newest first:\n{stdout}");
}
