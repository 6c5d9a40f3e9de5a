mod common;

use std::fs;

use assert_cmd::Command;
use common::{git_add_and_commit_in_year, init_git_repo, is_git_available, write_file};
use predicates::prelude::*;
use tempfile::tempdir;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn keeper() -> Result<Command, Box<dyn std::error::Error>> {
  let mut cmd = Command::cargo_bin("copyright-keeper")?;
  cmd.arg("--colors=never").env_remove("COPYRIGHT_KEEPER_CONFIG").env_remove("RUST_LOG");
  Ok(cmd)
}

#[test]
fn test_dry_run_reports_outdated_and_exits_nonzero() -> TestResult {
  let temp_dir = tempdir()?;
  let original = "/* Copyright (c) 2019 Acme */\nint main(void) { return 0; }\n";
  write_file(temp_dir.path(), "src/main.c", original)?;

  keeper()?
    .current_dir(temp_dir.path())
    .args(["--year", "2023", "src"])
    .assert()
    .code(1)
    .stdout(predicate::str::contains("1 file with outdated year"))
    .stdout(predicate::str::contains("2019 -> 2019-2023"))
    .stdout(predicate::str::contains("Run with --modify"));

  assert_eq!(fs::read_to_string(temp_dir.path().join("src/main.c"))?, original);
  Ok(())
}

#[test]
fn test_modify_rewrites_and_exits_zero() -> TestResult {
  let temp_dir = tempdir()?;
  write_file(temp_dir.path(), "src/main.c", "/* Copyright (c) 2019 Acme */\n")?;
  write_file(temp_dir.path(), "tool.py", "# Copyright 2020-2021 Acme\n")?;

  keeper()?
    .current_dir(temp_dir.path())
    .args(["--modify", "--year", "2023", "."])
    .assert()
    .success()
    .stdout(predicate::str::contains("Updated year in 2 files"));

  assert_eq!(
    fs::read_to_string(temp_dir.path().join("src/main.c"))?,
    "/* Copyright (c) 2019-2023 Acme */\n"
  );
  assert_eq!(
    fs::read_to_string(temp_dir.path().join("tool.py"))?,
    "# Copyright 2020-2023 Acme\n"
  );
  Ok(())
}

#[test]
fn test_up_to_date_tree_succeeds() -> TestResult {
  let temp_dir = tempdir()?;
  write_file(temp_dir.path(), "tool.py", "# Copyright 2020-2021 Acme\n")?;
  write_file(temp_dir.path(), "README.md", "no notice here\n")?;

  keeper()?
    .current_dir(temp_dir.path())
    .args(["--year", "2021", "."])
    .assert()
    .success()
    .stdout(predicate::str::contains("All copyright years are up to date."))
    .stdout(predicate::str::contains("0 outdated, 1 unchanged, 1 skipped, 0 failed"));
  Ok(())
}

#[test]
fn test_parse_failure_is_reported_with_kind() -> TestResult {
  let temp_dir = tempdir()?;
  write_file(temp_dir.path(), "bad.c", "/* Copyright (c) ABCD Acme */\n")?;

  keeper()?
    .current_dir(temp_dir.path())
    .args(["--modify", "--year", "2023", "."])
    .assert()
    .code(1)
    .stderr(predicate::str::contains("bad.c: ParseError"))
    .stdout(predicate::str::contains("ParseError: 1"));
  Ok(())
}

#[test]
fn test_quiet_mode_prints_bare_paths() -> TestResult {
  let temp_dir = tempdir()?;
  write_file(temp_dir.path(), "a.sh", "#!/bin/sh\n# Copyright 2019 Acme\n")?;

  let output = keeper()?
    .current_dir(temp_dir.path())
    .args(["-q", "--year", "2024", "a.sh"])
    .output()?;

  assert_eq!(output.status.code(), Some(1));
  assert_eq!(String::from_utf8(output.stdout)?, "a.sh\n");
  Ok(())
}

#[test]
fn test_dialect_flag_adds_extension() -> TestResult {
  let temp_dir = tempdir()?;
  write_file(temp_dir.path(), "init.lua", "-- Copyright 2018 Acme\nreturn {}\n")?;

  keeper()?
    .current_dir(temp_dir.path())
    .args(["--modify", "--year", "2020", "--dialect", "lua=--", "init.lua"])
    .assert()
    .success();

  assert_eq!(
    fs::read_to_string(temp_dir.path().join("init.lua"))?,
    "-- Copyright 2018-2020 Acme\nreturn {}\n"
  );
  Ok(())
}

#[test]
fn test_invalid_dialect_flag_fails() -> TestResult {
  let temp_dir = tempdir()?;
  write_file(temp_dir.path(), "a.c", "// Copyright 2019\n")?;

  keeper()?
    .current_dir(temp_dir.path())
    .args(["--dialect", "lua", "a.c"])
    .assert()
    .code(1)
    .stderr(predicate::str::contains("expected EXT=TOKEN"));
  Ok(())
}

#[test]
fn test_config_file_dialects_and_ignores() -> TestResult {
  let temp_dir = tempdir()?;
  write_file(
    temp_dir.path(),
    ".copyright-keeper.toml",
    "[dialects.sql]\nline = \"--\"\n\n[files]\nignore = [\"vendor/**\"]\n",
  )?;
  write_file(temp_dir.path(), "schema.sql", "-- Copyright 2017 Acme\nCREATE TABLE t (id INT);\n")?;
  write_file(temp_dir.path(), "vendor/lib.c", "// Copyright 2010 Other\n")?;

  keeper()?
    .current_dir(temp_dir.path())
    .args(["--modify", "--year", "2019", "."])
    .assert()
    .success();

  assert_eq!(
    fs::read_to_string(temp_dir.path().join("schema.sql"))?,
    "-- Copyright 2017-2019 Acme\nCREATE TABLE t (id INT);\n"
  );
  assert_eq!(
    fs::read_to_string(temp_dir.path().join("vendor/lib.c"))?,
    "// Copyright 2010 Other\n"
  );
  Ok(())
}

#[test]
fn test_no_config_ignores_config_file() -> TestResult {
  let temp_dir = tempdir()?;
  write_file(temp_dir.path(), ".copyright-keeper.toml", "[files]\nignore = [\"*.c\"]\n")?;
  write_file(temp_dir.path(), "a.c", "// Copyright 2019 Acme\n")?;

  keeper()?
    .current_dir(temp_dir.path())
    .args(["--no-config", "--modify", "--year", "2020", "a.c"])
    .assert()
    .success();

  assert_eq!(
    fs::read_to_string(temp_dir.path().join("a.c"))?,
    "// Copyright 2019-2020 Acme\n"
  );
  Ok(())
}

#[test]
fn test_reports_and_saved_diff() -> TestResult {
  let temp_dir = tempdir()?;
  write_file(temp_dir.path(), "a.c", "// Copyright 2019 Acme\n")?;

  keeper()?
    .current_dir(temp_dir.path())
    .args([
      "--year",
      "2022",
      "--report-json",
      "report.json",
      "--report-csv",
      "report.csv",
      "--save-diff",
      "changes.diff",
      "a.c",
    ])
    .assert()
    .code(1);

  let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(temp_dir.path().join("report.json"))?)?;
  assert_eq!(json["summary"]["updated"], 1);
  assert_eq!(json["files"][0]["status"], "updated");
  assert_eq!(json["files"][0]["written"], false);
  assert_eq!(json["files"][0]["to"]["end"], 2022);

  let csv = fs::read_to_string(temp_dir.path().join("report.csv"))?;
  assert!(csv.starts_with("file_path,status,from,to,modification_year,notes\n"));
  assert!(csv.contains("a.c,outdated,2019,2019-2022,2022,"));

  let diff = fs::read_to_string(temp_dir.path().join("changes.diff"))?;
  assert!(diff.contains("-// Copyright 2019 Acme"));
  assert!(diff.contains("+// Copyright 2019-2022 Acme"));
  Ok(())
}

#[test]
fn test_strict_stops_with_error() -> TestResult {
  let temp_dir = tempdir()?;
  write_file(temp_dir.path(), "a.c", "// Copyright 3000 Acme\n")?;

  keeper()?
    .current_dir(temp_dir.path())
    .args(["--strict", "--modify", "--year", "2022", "a.c"])
    .assert()
    .code(1)
    .stderr(predicate::str::contains("--strict"));
  Ok(())
}

#[test]
fn test_missing_patterns_is_an_error() -> TestResult {
  keeper()?
    .assert()
    .code(1)
    .stderr(predicate::str::contains("Missing required argument"));
  Ok(())
}

#[test]
fn test_git_history_year_is_used() -> TestResult {
  if !is_git_available() {
    println!("Skipping test_git_history_year_is_used: git not available");
    return Ok(());
  }

  let temp_dir = tempdir()?;
  init_git_repo(temp_dir.path())?;
  write_file(temp_dir.path(), "lib.ts", "// Copyright 2018 Acme\nexport const a = 1;\n")?;
  git_add_and_commit_in_year(temp_dir.path(), "lib.ts", 2020, "initial")?;

  keeper()?
    .current_dir(temp_dir.path())
    .args(["--modify", "lib.ts"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Git repository detected"));

  assert_eq!(
    fs::read_to_string(temp_dir.path().join("lib.ts"))?,
    "// Copyright 2018-2020 Acme\nexport const a = 1;\n"
  );
  Ok(())
}

#[test]
fn test_file_in_other_repository_keeps_its_commit_year() -> TestResult {
  if !is_git_available() {
    println!("Skipping test_file_in_other_repository_keeps_its_commit_year: git not available");
    return Ok(());
  }

  let temp_dir = tempdir()?;
  let repo_a = temp_dir.path().join("a");
  let repo_b = temp_dir.path().join("b");
  fs::create_dir_all(&repo_a)?;
  fs::create_dir_all(&repo_b)?;
  init_git_repo(&repo_a)?;
  init_git_repo(&repo_b)?;
  write_file(&repo_b, "f.c", "// Copyright 2015 Acme\n")?;
  git_add_and_commit_in_year(&repo_b, "f.c", 2015, "add f")?;

  keeper()?
    .current_dir(&repo_a)
    .arg(repo_b.join("f.c"))
    .assert()
    .success()
    .stdout(predicate::str::contains("0 outdated, 1 unchanged"));

  assert_eq!(fs::read_to_string(repo_b.join("f.c"))?, "// Copyright 2015 Acme\n");
  Ok(())
}
