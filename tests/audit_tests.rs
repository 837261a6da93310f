mod common;
use common::{ADMIN, TECH, init_db_with_data, mdk, ok, setup_test_db};
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

#[test]
fn test_audit_trail_of_ticket_shows_field_changes() {
    let db_path = setup_test_db("audit_ticket");
    init_db_with_data(&db_path);

    ok(&db_path, &["--as", ADMIN, "ticket", "assign", "1", "--tech", TECH]);

    mdk()
        .args(["--db", &db_path, "audit", "--table", "tickets", "--id", "1"])
        .assert()
        .success()
        .stdout(contains("full insert"))
        .stdout(contains("assigned_to: null → 2"))
        .stdout(contains(r#"status: "open" → "assigned""#));
}

#[test]
fn test_audit_recent_lists_change_summaries() {
    let db_path = setup_test_db("audit_recent");
    init_db_with_data(&db_path);

    ok(&db_path, &["asset", "update", "1", "--status", "retired"]);

    mdk()
        .args(["--db", &db_path, "audit", "--table", "assets"])
        .assert()
        .success()
        .stdout(contains("assets").and(contains("update")))
        .stdout(contains("status"));
}

#[test]
fn test_audit_unknown_record_is_empty() {
    let db_path = setup_test_db("audit_unknown");
    init_db_with_data(&db_path);

    mdk()
        .args(["--db", &db_path, "audit", "--table", "tickets", "--id", "42"])
        .assert()
        .success()
        .stdout(contains("No audit rows for this record."));
}
