//! Integration tests for the `sr` command-line commands.
#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A temp directory with an actor, a target, and a few items.
fn table() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("adolin.json"),
        r#"{
    "name": "Adolin",
    "attributes": { "str": { "value": 3 }, "spd": { "value": 2 } },
    "skills": { "hwp": { "rank": 2, "attribute": "str" } },
    "resources": {
        "hea": { "value": 20, "max": 20 },
        "foc": { "value": 3, "max": 5 }
    }
}
"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("warrior.json"),
        r#"{
    "name": "Parshendi Warrior",
    "resources": {
        "hea": { "value": 18, "max": 18 },
        "foc": { "value": 2, "max": 3 }
    }
}
"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("blade.json"),
        r#"{
    "name": "Shardblade",
    "type": "weapon",
    "activation": { "type": "skill_test", "skill": "hwp" },
    "attack": { "type": "melee" },
    "damage": { "formula": "2d8", "type": "spirit" }
}
"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("surge.json"),
        r#"{
    "name": "Gravitation Surge",
    "type": "power",
    "activation": {
        "type": "skill_test",
        "skill": "ath",
        "consume": { "type": "resource", "resource": "foc", "value": 2 },
        "uses": { "value": 1, "max": 1 }
    }
}
"#,
    )
    .unwrap();
    dir
}

fn stormroll() -> Command {
    Command::cargo_bin("stormroll").unwrap()
}

fn file(dir: &TempDir, name: &str) -> PathBuf {
    dir.path().join(name)
}

fn json_output(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

fn save_json(cmd: &mut Command, path: &Path) {
    let output = cmd.output().unwrap();
    assert!(output.status.success());
    fs::write(path, output.stdout).unwrap();
}

// ---------------------------------------------------------------------------
// roll
// ---------------------------------------------------------------------------

#[test]
fn roll_max_is_deterministic() {
    stormroll()
        .args(["roll", "2d6+3", "--max"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2d6 + 3 ="))
        .stdout(predicate::str::contains("15"));
}

#[test]
fn roll_min_json() {
    let value = json_output(stormroll().args(["--json", "roll", "1d20 + 5", "--min"]));
    assert_eq!(value["total"], 6);
    assert_eq!(value["formula"], "1d20 + 5");
}

#[test]
fn same_seed_same_roll() {
    let first = stormroll()
        .args(["--seed", "7", "roll", "4d6kh3"])
        .output()
        .unwrap();
    let second = stormroll()
        .args(["--seed", "7", "roll", "4d6kh3"])
        .output()
        .unwrap();
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn bad_formula_points_at_error() {
    stormroll()
        .args(["roll", "1d20 + * 3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid formula"))
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn roll_past_the_total_range_fails() {
    stormroll()
        .args(["roll", "9223372036854775807 + 1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("total out of range"));
}

// ---------------------------------------------------------------------------
// test
// ---------------------------------------------------------------------------

#[test]
fn skill_test_uses_sheet_modifier() {
    let dir = table();
    let value = json_output(stormroll().args([
        "--json",
        "--seed",
        "1",
        "test",
        "hwp",
        "--actor",
    ]).arg(file(&dir, "adolin.json")));
    assert_eq!(value["formula"], "1d20 + 5");
    assert_eq!(value["kind"], "skill_test");
}

#[test]
fn skill_test_with_advantage_and_plot() {
    let dir = table();
    let value = json_output(
        stormroll()
            .args(["--json", "test", "heavy-weaponry", "--advantage", "--plot", "--actor"])
            .arg(file(&dir, "adolin.json")),
    );
    assert_eq!(value["formula"], "2d20kh + 5 + 1dp");
}

#[test]
fn unknown_skill_is_rejected() {
    let dir = table();
    stormroll()
        .args(["test", "juggling", "--actor"])
        .arg(file(&dir, "adolin.json"))
        .assert()
        .failure();
}

// ---------------------------------------------------------------------------
// damage / attack
// ---------------------------------------------------------------------------

#[test]
fn critical_damage_is_maximised() {
    let dir = table();
    let value = json_output(
        stormroll()
            .args(["--json", "damage", "--critical", "--actor"])
            .arg(file(&dir, "adolin.json"))
            .arg("--item")
            .arg(file(&dir, "blade.json")),
    );
    assert_eq!(value["formula"], "2d8 + 5");
    assert_eq!(value["total"], 21);
    assert_eq!(value["graze"]["total"], 16);
    assert_eq!(value["is_critical"], true);
}

#[test]
fn attack_rolls_test_and_damage() {
    let dir = table();
    stormroll()
        .args(["attack", "--actor"])
        .arg(file(&dir, "adolin.json"))
        .arg("--item")
        .arg(file(&dir, "blade.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Shardblade"))
        .stdout(predicate::str::contains("1d20 + 5"))
        .stdout(predicate::str::contains("2d8 + 5"));
}

// ---------------------------------------------------------------------------
// use
// ---------------------------------------------------------------------------

#[test]
fn use_saves_cost_and_uses() {
    let dir = table();
    stormroll()
        .args(["use", "--save", "--actor"])
        .arg(file(&dir, "adolin.json"))
        .arg("--item")
        .arg(file(&dir, "surge.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("focus -> 1"));

    let actor: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(file(&dir, "adolin.json")).unwrap()).unwrap();
    assert_eq!(actor["resources"]["foc"]["value"], 1);
    let item: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(file(&dir, "surge.json")).unwrap()).unwrap();
    assert_eq!(item["activation"]["uses"]["value"], 0);

    stormroll()
        .args(["use", "--no-consume", "--actor"])
        .arg(file(&dir, "adolin.json"))
        .arg("--item")
        .arg(file(&dir, "surge.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("no uses left"));
}

#[test]
fn use_without_enough_focus_fails() {
    let dir = table();
    fs::write(
        file(&dir, "adolin.json"),
        r#"{ "name": "Adolin", "resources": { "foc": { "value": 1, "max": 5 } } }"#,
    )
    .unwrap();
    stormroll()
        .args(["use", "--actor"])
        .arg(file(&dir, "adolin.json"))
        .arg("--item")
        .arg(file(&dir, "surge.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("not enough focus"));
}

#[test]
fn use_can_skip_the_cost() {
    let dir = table();
    let value = json_output(
        stormroll()
            .args(["--json", "use", "--no-consume", "--actor"])
            .arg(file(&dir, "adolin.json"))
            .arg("--item")
            .arg(file(&dir, "surge.json")),
    );
    assert_eq!(value["commits"].as_array().unwrap().len(), 1);
    assert_eq!(value["commits"][0]["action"], "set_uses");
}

// ---------------------------------------------------------------------------
// apply / retro
// ---------------------------------------------------------------------------

#[test]
fn apply_saved_damage() {
    let dir = table();
    let rolls = file(&dir, "rolls.json");
    save_json(
        stormroll()
            .args(["--json", "damage", "--critical", "--actor"])
            .arg(file(&dir, "adolin.json"))
            .arg("--item")
            .arg(file(&dir, "blade.json")),
        &rolls,
    );

    stormroll()
        .args(["apply", "--graze", "--save", "--target"])
        .arg(file(&dir, "warrior.json"))
        .arg("--rolls")
        .arg(&rolls)
        .assert()
        .success()
        .stdout(predicate::str::contains("health 2/18"));

    let value = json_output(
        stormroll()
            .args(["--json", "apply", "--multiplier", "-1", "--target"])
            .arg(file(&dir, "warrior.json"))
            .arg("--rolls")
            .arg(&rolls),
    );
    assert_eq!(value["value"], 18);
}

#[test]
fn apply_reduces_focus() {
    let dir = table();
    let value = json_output(
        stormroll()
            .args(["--json", "apply", "--focus", "--target"])
            .arg(file(&dir, "warrior.json")),
    );
    assert_eq!(value["value"], 1);
}

#[test]
fn retro_critical_and_repeat() {
    let dir = table();
    let rolls = file(&dir, "attack.json");
    save_json(
        stormroll()
            .args(["--json", "--seed", "3", "attack", "--actor"])
            .arg(file(&dir, "adolin.json"))
            .arg("--item")
            .arg(file(&dir, "blade.json")),
        &rolls,
    );

    let value = json_output(
        stormroll()
            .args(["--json", "retro", "critical", "--rolls"])
            .arg(&rolls),
    );
    assert_eq!(value[1]["total"], 21);
    assert_eq!(value[1]["is_critical"], true);

    let value = json_output(
        stormroll()
            .args(["--json", "retro", "advantage", "--rolls"])
            .arg(&rolls),
    );
    assert!(value[0]["formula"].as_str().unwrap().starts_with("2d20kh"));

    let value = json_output(
        stormroll()
            .args(["--json", "retro", "repeat", "--rolls"])
            .arg(&rolls),
    );
    assert_eq!(value.as_array().unwrap().len(), 2);
    assert_eq!(value[1]["formula"], "2d8 + 5");
}

#[test]
fn retro_advantage_adds_a_kept_d20() {
    let dir = table();
    let saved = file(&dir, "test.json");
    save_json(
        stormroll()
            .args(["--json", "--seed", "11", "test", "hwp", "--actor"])
            .arg(file(&dir, "adolin.json")),
        &saved,
    );

    let upgraded = file(&dir, "upgraded.json");
    save_json(
        stormroll()
            .args(["--json", "--seed", "12", "retro", "advantage", "--rolls"])
            .arg(&saved),
        &upgraded,
    );
    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&upgraded).unwrap()).unwrap();
    let test = &value[0];
    assert_eq!(test["formula"], "2d20kh + 5");
    assert_eq!(test["advantage_mode"], "advantage");
    let dice = test["dice"].as_array().unwrap();
    assert_eq!(dice.len(), 2);
    assert_eq!(dice.iter().filter(|d| d["discarded"] == true).count(), 1);
    let kept = dice.iter().find(|d| d["discarded"] == false).unwrap();
    assert_eq!(test["total"], kept["face"].as_i64().unwrap() + 5);

    stormroll()
        .args(["retro", "advantage", "--rolls"])
        .arg(&upgraded)
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot apply retroactive advantage"));
}

#[test]
fn retro_disadvantage_keeps_the_lower_d20() {
    let dir = table();
    let saved = file(&dir, "test.json");
    save_json(
        stormroll()
            .args(["--json", "test", "hwp", "--actor"])
            .arg(file(&dir, "adolin.json")),
        &saved,
    );
    let value = json_output(
        stormroll()
            .args(["--json", "retro", "disadvantage", "--rolls"])
            .arg(&saved),
    );
    assert_eq!(value[0]["formula"], "2d20kl + 5");
    let faces: Vec<i64> = value[0]["dice"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["face"].as_i64().unwrap())
        .collect();
    assert_eq!(value[0]["total"], faces.iter().min().unwrap() + 5);
}

#[test]
fn apply_huge_modifier_floors_health() {
    let dir = table();
    let rolls = file(&dir, "rolls.json");
    save_json(
        stormroll()
            .args(["--json", "damage", "--actor"])
            .arg(file(&dir, "adolin.json"))
            .arg("--item")
            .arg(file(&dir, "blade.json")),
        &rolls,
    );
    let value = json_output(
        stormroll()
            .args(["--json", "apply", "--modifier", "9223372036854775807", "--target"])
            .arg(file(&dir, "warrior.json"))
            .arg("--rolls")
            .arg(&rolls),
    );
    assert_eq!(value["value"], 0);
}

#[test]
fn missing_actor_file() {
    stormroll()
        .args(["test", "ath", "--actor", "nowhere.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read"));
}
