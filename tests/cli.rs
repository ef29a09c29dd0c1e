#![forbid(unsafe_code)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn cli(rota: &std::path::Path, templates: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("roulement-cli").unwrap();
    cmd.arg("--rota")
        .arg(rota)
        .arg("--templates")
        .arg(templates);
    cmd
}

#[test]
fn import_assign_generate_roundtrip() {
    let dir = tempdir().unwrap();
    let rota = dir.path().join("rota.json");
    let templates = dir.path().join("templates");

    let staff_csv = dir.path().join("staff.csv");
    fs::write(&staff_csv, "handle,display_name\naline,Aline Dupont\n").unwrap();

    let template_file = dir.path().join("lundis.json");
    fs::write(
        &template_file,
        r#"{
  "id": "lundis",
  "name": "Lundis de jour",
  "rotation_cycle_weeks": 1,
  "days": [
    { "week_number": 1, "weekday": 1, "start_time": "09:00:00", "end_time": "17:00:00" }
  ]
}"#,
    )
    .unwrap();

    cli(&rota, &templates)
        .args(["import-staff", "--csv"])
        .arg(&staff_csv)
        .assert()
        .success();

    cli(&rota, &templates)
        .args(["template-import", "--file"])
        .arg(&template_file)
        .assert()
        .success()
        .stdout(predicate::str::contains("'lundis' saved"));

    cli(&rota, &templates)
        .args([
            "assign",
            "--staff",
            "aline",
            "--template",
            "lundis",
            "--start",
            "2025-03-03",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Assigned aline"));

    // deux lundis dans l'intervalle
    cli(&rota, &templates)
        .args([
            "generate",
            "--staff",
            "aline",
            "--from",
            "2025-03-03",
            "--to",
            "2025-03-16",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 created, 0 skipped, 0 error(s)"));

    let saved = fs::read_to_string(&rota).unwrap();
    assert!(saved.contains("\"from_pattern\": true"));

    // une nouvelle passe voit les vacations générées comme conflits
    cli(&rota, &templates)
        .args([
            "preview",
            "--staff",
            "aline",
            "--from",
            "2025-03-03",
            "--to",
            "2025-03-16",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Found 2 conflict(s)"))
        .stdout(predicate::str::contains("other_pattern"));
}

#[test]
fn preview_without_conflicts_exits_cleanly() {
    let dir = tempdir().unwrap();
    let rota = dir.path().join("rota.json");
    let templates = dir.path().join("templates");

    let staff_csv = dir.path().join("staff.csv");
    fs::write(&staff_csv, "handle,display_name\nbruno,Bruno Caron\n").unwrap();

    let template_file = dir.path().join("lundis.json");
    fs::write(
        &template_file,
        r#"{
  "id": "lundis",
  "name": "Lundis de jour",
  "rotation_cycle_weeks": 1,
  "days": [
    { "week_number": 1, "weekday": 1, "start_time": "09:00:00", "end_time": "17:00:00" }
  ]
}"#,
    )
    .unwrap();

    cli(&rota, &templates)
        .args(["import-staff", "--csv"])
        .arg(&staff_csv)
        .assert()
        .success();
    cli(&rota, &templates)
        .args(["template-import", "--file"])
        .arg(&template_file)
        .assert()
        .success();
    cli(&rota, &templates)
        .args([
            "assign", "--staff", "bruno", "--template", "lundis", "--start", "2025-03-03",
        ])
        .assert()
        .success();

    cli(&rota, &templates)
        .args([
            "preview", "--staff", "bruno", "--from", "2025-03-03", "--to", "2025-03-16",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("OK: no conflicts"));
}

#[test]
fn unknown_staff_handle_fails() {
    let dir = tempdir().unwrap();
    let rota = dir.path().join("rota.json");
    let templates = dir.path().join("templates");

    cli(&rota, &templates)
        .args([
            "preview", "--staff", "nadia", "--from", "2025-03-03", "--to", "2025-03-16",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown staff handle"));
}
