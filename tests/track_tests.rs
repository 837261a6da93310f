use predicates::str::contains;
use std::fs;

mod common;
use common::{FAR_LAT, NEAR_LAT, SITE_LNG, init_db_with_data, mdk, setup_test_db, temp_out};

fn recording(name: &str, lines: &[String]) -> String {
    let path = temp_out(name, "jsonl");
    fs::write(&path, lines.join("\n")).unwrap();
    path
}

fn sample(lat: &str) -> String {
    format!(r#"{{"lat": {lat}, "lng": {SITE_LNG}, "accuracy": 6.0}}"#)
}

#[test]
fn test_track_ends_outside() {
    let db_path = setup_test_db("track_outside");
    init_db_with_data(&db_path);
    let file = recording("track_outside", &[sample(NEAR_LAT), sample(FAR_LAT)]);

    mdk()
        .args([
            "--db", &db_path, "track", "--branch", "1", "--file", &file, "--cadence-ms", "5",
        ])
        .assert()
        .success()
        .stdout(contains("Replaying 2 position update(s)"))
        .stdout(contains("Outside the branch area."));
}

#[test]
fn test_track_ends_on_site() {
    let db_path = setup_test_db("track_inside");
    init_db_with_data(&db_path);
    let file = recording(
        "track_inside",
        &[
            sample(FAR_LAT),
            r#"{"error": "timeout"}"#.to_string(),
            sample(NEAR_LAT),
        ],
    );

    mdk()
        .args([
            "--db", &db_path, "track", "--branch", "1", "--file", &file, "--cadence-ms", "5",
        ])
        .assert()
        .success()
        .stdout(contains("On site"))
        .stdout(contains("from site (radius 200 m)"));
}

#[test]
fn test_track_prints_every_decision_at_zero_cadence() {
    let db_path = setup_test_db("track_zero_cadence");
    init_db_with_data(&db_path);
    let file = recording(
        "track_zero_cadence",
        &[sample(NEAR_LAT), sample(FAR_LAT), sample(NEAR_LAT)],
    );

    let out = mdk()
        .args([
            "--db", &db_path, "track", "--branch", "1", "--file", &file, "--cadence-ms", "0",
        ])
        .output()
        .unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);

    let decisions: Vec<&str> = stdout
        .lines()
        .filter(|l| l.contains("from site (radius 200 m)"))
        .collect();
    assert_eq!(decisions.len(), 3, "{stdout}");
    assert!(decisions[0].contains("allowed"), "{stdout}");
    assert!(decisions[1].contains("denied"), "{stdout}");
    assert!(decisions[2].contains("allowed"), "{stdout}");
    assert!(stdout.contains("On site"), "{stdout}");
}

#[test]
fn test_track_permission_denied() {
    let db_path = setup_test_db("track_denied");
    init_db_with_data(&db_path);
    let file = recording(
        "track_denied",
        &[r#"{"error": "permission_denied"}"#.to_string(), sample(NEAR_LAT)],
    );

    mdk()
        .args([
            "--db", &db_path, "track", "--branch", "1", "--file", &file, "--cadence-ms", "1",
        ])
        .assert()
        .failure()
        .stderr(contains("Location permission denied"));
}

#[test]
fn test_track_without_recording() {
    let db_path = setup_test_db("track_no_file");
    init_db_with_data(&db_path);

    mdk()
        .args(["--db", &db_path, "track", "--branch", "1"])
        .assert()
        .failure()
        .stderr(contains("Geolocation is not available"));
}

#[test]
fn test_track_bad_recording() {
    let db_path = setup_test_db("track_bad_file");
    init_db_with_data(&db_path);
    let file = recording("track_bad_file", &[r#"{"error": "solar_flare"}"#.to_string()]);

    mdk()
        .args(["--db", &db_path, "track", "--branch", "1", "--file", &file])
        .assert()
        .failure()
        .stderr(contains("unknown location error 'solar_flare'"));
}

#[test]
fn test_ping_stores_last_position() {
    let db_path = setup_test_db("ping_store");
    init_db_with_data(&db_path);
    let file = recording("ping_store", &[sample(FAR_LAT), sample(NEAR_LAT)]);

    mdk()
        .args([
            "--db", &db_path, "ping", "--tech", "2", "--file", &file, "--every-ms", "200",
            "--cadence-ms", "1",
        ])
        .assert()
        .success()
        .stdout(contains("position(s) stored for profile #2."));

    mdk()
        .args(["--db", &db_path, "tech", "list"])
        .assert()
        .success()
        .stdout(contains("30.04540, 31.23570"));
}

#[test]
fn test_ping_unknown_tech() {
    let db_path = setup_test_db("ping_unknown");
    init_db_with_data(&db_path);
    let file = recording("ping_unknown", &[sample(NEAR_LAT)]);

    mdk()
        .args(["--db", &db_path, "ping", "--tech", "9", "--file", &file])
        .assert()
        .failure()
        .stderr(contains("Profile #9 not found"));
}
