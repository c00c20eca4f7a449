//! Integration tests for the `examsched` CLI binary.
//!
//! Every test runs against the JSON tables in `tests/fixtures` through
//! `--offline`, with the user config directory pointed at an empty temp dir.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Helper: directory holding one JSON file per table.
fn fixtures_dir() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures")
}

/// Helper: the binary with an isolated environment, not yet pointed at any store.
fn bare(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("examsched").unwrap();
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path())
        .env_remove("RUST_LOG")
        .env_remove("EXAMSCHED_STORE__URL")
        .env_remove("EXAMSCHED_STORE__API_KEY")
        .env("EXAMSCHED_SCHEDULE__TIMEZONE", "Asia/Manila");
    cmd
}

/// Helper: the binary reading the fixture tables.
fn examsched(home: &TempDir) -> Command {
    let mut cmd = bare(home);
    cmd.args(["--offline", fixtures_dir()]);
    cmd
}

// ─────────────────────────────────────────────────────────────────────────────
// Occupancy
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn occupancy_merges_overlapping_exams() {
    let home = TempDir::new().unwrap();
    examsched(&home)
        .args(["occupancy", "--date", "2025-06-02"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "BCL-101 BCL 101 (Lecture) occupied 120 min, free 690 min",
        ))
        .stdout(predicate::str::contains("  07:30-09:00  free"))
        .stdout(predicate::str::contains("  09:00-11:00  occupied"))
        .stdout(predicate::str::contains("  11:00-21:00  free"))
        // Laboratories are hidden by the default room type.
        .stdout(predicate::str::contains("ICT-LAB1").not());
}

#[test]
fn occupancy_raw_keeps_exams_as_stored() {
    let home = TempDir::new().unwrap();
    examsched(&home)
        .args(["occupancy", "--date", "2025-06-02", "--room", "BCL-101", "--raw"])
        .assert()
        .success()
        .stdout(predicate::str::contains("  09:00-10:00  occupied"))
        .stdout(predicate::str::contains("  09:30-11:00  occupied"))
        .stdout(predicate::str::contains("BCL-102").not());
}

#[test]
fn occupancy_of_an_empty_room_is_one_free_interval() {
    let home = TempDir::new().unwrap();
    examsched(&home)
        .args(["occupancy", "--date", "2025-06-02", "--room", "BCL-102"])
        .assert()
        .success()
        .stdout(predicate::str::contains("occupied 0 min, free 810 min"))
        .stdout(predicate::str::contains("  07:30-21:00  free"));
}

#[test]
fn occupancy_of_a_named_room_ignores_the_default_room_type() {
    let home = TempDir::new().unwrap();
    examsched(&home)
        .args(["occupancy", "--date", "2025-06-02", "--room", "ICT-LAB1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ICT-LAB1 ICT Lab 1 (Laboratory)"))
        .stdout(predicate::str::contains("No rooms match.").not());
}

#[test]
fn occupancy_of_a_named_room_honors_an_explicit_room_type() {
    let home = TempDir::new().unwrap();
    examsched(&home)
        .args(["occupancy", "--date", "2025-06-02", "--room", "ICT-LAB1", "--room-type", "Lecture"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No rooms match."));
}

#[test]
fn occupancy_json_lists_every_room_type() {
    let home = TempDir::new().unwrap();
    let output = examsched(&home)
        .args(["occupancy", "--date", "2025-06-02", "--room-type", "any", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let rooms: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let ids: Vec<&str> = rooms
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["room"]["room_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["BCL-101", "BCL-102", "ICT-LAB1"]);
    assert_eq!(rooms[2]["timeline"]["occupied_minutes"], 120);
}

#[test]
fn config_file_changes_the_exam_day() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("short-day.toml");
    std::fs::write(&config, "[schedule]\nday_end = \"18:00\"\n").unwrap();

    examsched(&home)
        .args(["occupancy", "--date", "2025-06-02", "--room", "BCL-102"])
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("  07:30-18:00  free"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Slots and conflicts
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn slots_list_free_rooms_per_exam_length() {
    let home = TempDir::new().unwrap();
    examsched(&home)
        .args(["slots", "--duration", "90", "--date", "2025-06-02"])
        .assert()
        .success()
        .stdout(predicate::str::contains("07:30-09:00  BCL-101, BCL-102"))
        .stdout(predicate::str::contains("09:00-10:30  BCL-102\n"))
        .stdout(predicate::str::contains("19:30-21:00  BCL-101, BCL-102"));
}

#[test]
fn slots_reject_non_positive_duration() {
    let home = TempDir::new().unwrap();
    examsched(&home)
        .args(["slots", "--duration", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--duration must be a positive"));
}

#[test]
fn slots_longer_than_the_exam_day_are_empty() {
    let home = TempDir::new().unwrap();
    examsched(&home)
        .args(["slots", "--duration", "1000000000000", "--date", "2025-06-02"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No slot fits in the exam day."));
}

#[test]
fn conflicts_report_double_bookings() {
    let home = TempDir::new().unwrap();
    examsched(&home)
        .args(["conflicts", "--date", "2025-06-02"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "BCL-101: IT111 1A 09:00-10:00 overlaps IT112 09:30-11:00 by 30 min",
        ));
}

#[test]
fn no_conflicts_on_a_quiet_day() {
    let home = TempDir::new().unwrap();
    examsched(&home)
        .args(["conflicts", "--date", "2025-06-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No double bookings."));
}

// ─────────────────────────────────────────────────────────────────────────────
// Calendar
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn calendar_lists_period_headlines() {
    let home = TempDir::new().unwrap();
    examsched(&home)
        .args(["calendar", "--year", "2025", "--month", "6"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("June 2025\nSun Mon Tue Wed Thu Fri Sat\n"))
        .stdout(predicate::str::contains("Jun 09  Final 2024-2025 1st Semester [CITC]"))
        .stdout(predicate::str::contains("Jun 10  Final 2024-2025 1st Semester [CITC, CSM]"))
        .stdout(predicate::str::contains("Jun 14").not())
        .stdout(predicate::str::contains("Jun 23  Midterm 2024-2025 Unknown Term"));
}

#[test]
fn calendar_filters_by_category_and_college() {
    let home = TempDir::new().unwrap();
    examsched(&home)
        .args(["calendar", "--year", "2025", "--month", "6", "--category", "Final", "--college", "CSM"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Jun 09").not())
        .stdout(predicate::str::contains("Jun 10  Final 2024-2025 1st Semester [CSM]"))
        .stdout(predicate::str::contains("Midterm").not());
}

#[test]
fn calendar_filters_by_department() {
    let home = TempDir::new().unwrap();
    examsched(&home)
        .args(["calendar", "--year", "2025", "--month", "6", "--department", "MATH"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Jun 10  Final 2024-2025 1st Semester [CSM]"))
        .stdout(predicate::str::contains("Jun 09").not())
        .stdout(predicate::str::contains("Midterm").not());
}

#[test]
fn calendar_rejects_invalid_month() {
    let home = TempDir::new().unwrap();
    examsched(&home)
        .args(["calendar", "--year", "2025", "--month", "13"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("2025-13"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Approvals
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn requests_list_shows_both_lists_with_file_links() {
    let home = TempDir::new().unwrap();
    examsched(&home)
        .env("EXAMSCHED_STORE__URL", "https://demo.supabase.co")
        .args(["requests", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pending (2)"))
        .stdout(predicate::str::contains("History (1)"))
        .stdout(predicate::str::contains(
            "file: https://demo.supabase.co/storage/v1/object/public/schedule-pdfs/finals/citc.pdf",
        ));
}

#[test]
fn approving_a_pending_request() {
    let home = TempDir::new().unwrap();
    examsched(&home)
        .args(["requests", "approve", "00000000-0000-4000-8000-000000000001"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Request 00000000-0000-4000-8000-000000000001 is now approved",
        ));
}

#[test]
fn deciding_a_settled_request_fails() {
    let home = TempDir::new().unwrap();
    examsched(&home)
        .args(["requests", "reject", "00000000-0000-4000-8000-000000000002"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not pending"));
}

#[test]
fn malformed_request_id_is_a_usage_error() {
    let home = TempDir::new().unwrap();
    examsched(&home)
        .args(["requests", "approve", "not-a-uuid"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Notifications
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn notifications_for_one_user() {
    let home = TempDir::new().unwrap();
    examsched(&home)
        .args(["notifications", "list", "--user", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 notifications, 2 unread"))
        .stdout(predicate::str::contains("from Dean Reyes"))
        .stdout(predicate::str::contains("Someone else's notice").not());
}

#[test]
fn marking_a_notification_read() {
    let home = TempDir::new().unwrap();
    examsched(&home)
        .args(["notifications", "read", "1", "--user", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Marked notification 1 as read (1 unread left)"));
}

#[test]
fn marking_someone_elses_notification_fails() {
    let home = TempDir::new().unwrap();
    examsched(&home)
        .args(["notifications", "read", "2", "--user", "7"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to mark notification 2 as read"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Setup errors
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn missing_store_url_is_reported() {
    let home = TempDir::new().unwrap();
    bare(&home)
        .args(["calendar"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("store.url is not set"));
}

#[test]
fn missing_offline_directory_is_reported() {
    let home = TempDir::new().unwrap();
    bare(&home)
        .args(["--offline", "/nonexistent/examsched-fixtures", "calendar"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load tables"));
}

#[test]
fn help_lists_subcommands() {
    Command::cargo_bin("examsched")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("occupancy"))
        .stdout(predicate::str::contains("slots"))
        .stdout(predicate::str::contains("calendar"))
        .stdout(predicate::str::contains("requests"))
        .stdout(predicate::str::contains("watch"));
}
