//! Console output and exit status of the `morphometry` binary, run against a
//! shell script standing in for `saga_cmd`.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::Mutex;

use tempfile::TempDir;

// Spawning while another test still holds a freshly written script open can
// fail with ETXTBSY.
static SERIAL: Mutex<()> = Mutex::new(());

const SCRIPT: &str = r#"#!/bin/sh
DIR="$(dirname "$0")"
if [ "$1" = "--version" ]; then
  echo "SAGA Version: 2.1.4"
  exit 0
fi
if [ $# -eq 1 ]; then
  printf 'Available modules:\n [0]\tSlope, Aspect, Curvature\n [4]\tCurvature Classification\n'
  exit 0
fi
if [ -f "$DIR/fail" ] && [ "$(cat "$DIR/fail")" = "$2" ]; then
  exit 1
fi
shift 2
while [ $# -gt 1 ]; do
  case "$2" in
    *.sgrd) [ "$1" = "-ELEVATION" ] || [ "$1" = "-DEM" ] || { cp "$DIR/template.sgrd" "$2"; : > "${2%.sgrd}.sdat"; } ;;
  esac
  shift 2
done
exit 0
"#;

const HEADER: &str = "POSITION_XMIN\t= 0.0\n\
    POSITION_YMIN\t= 0.0\n\
    CELLCOUNT_X\t= 8\n\
    CELLCOUNT_Y\t= 6\n\
    CELLSIZE\t= 25.0\n";

struct Setup {
    root: TempDir,
}

impl Setup {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        for dir in ["bin", "modules", "work"] {
            fs::create_dir(root.path().join(dir)).unwrap();
        }

        let script = root.path().join("bin").join("saga_cmd");
        fs::write(&script, SCRIPT).unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        fs::write(root.path().join("bin").join("template.sgrd"), HEADER).unwrap();
        fs::write(root.path().join("modules").join("libta_morphometry.so"), b"").unwrap();

        Self { root }
    }

    fn work(&self) -> PathBuf {
        self.root.path().join("work")
    }

    fn write_dem(&self, stem: &str) -> PathBuf {
        let header = self.work().join(format!("{}.sgrd", stem));
        fs::write(&header, HEADER).unwrap();
        fs::write(self.work().join(format!("{}.sdat", stem)), [0u8; 16]).unwrap();
        header
    }

    fn fail(&self, index: usize) {
        fs::write(self.root.path().join("bin").join("fail"), index.to_string()).unwrap();
    }

    fn run(&self, args: &[&Path]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_morphometry"))
            .args(args)
            .current_dir(self.work())
            .env("SAGA_CMD", self.root.path().join("bin").join("saga_cmd"))
            .env("SAGA_MLB", self.root.path().join("modules"))
            .output()
            .unwrap()
    }
}

fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}

fn position(lines: &[String], text: &str) -> usize {
    lines
        .iter()
        .position(|l| l == text)
        .unwrap_or_else(|| panic!("{:?} not in {:?}", text, lines))
}

#[test]
fn test_success_prints_banner_and_success() {
    let _guard = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let setup = Setup::new();
    let dem = setup.write_dem("dem");

    let output = setup.run(&[dem.as_path()]);
    let lines = stdout_lines(&output);

    assert_eq!(output.status.code(), Some(0), "{:?}", lines);
    assert_eq!(
        lines,
        vec![
            format!("morphometry {}", env!("CARGO_PKG_VERSION")),
            "SAGA Version: 2.1.4".to_string(),
            String::new(),
            "success".to_string(),
        ]
    );
    for name in ["slope", "aspect", "hcurv", "vcurv", "ccurv"] {
        assert!(setup.work().join(format!("{}.sgrd", name)).is_file(), "{}", name);
    }
}

#[test]
fn test_no_arguments_prints_usage_before_fallback_load() {
    let _guard = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let setup = Setup::new();

    let output = setup.run(&[]);
    let lines = stdout_lines(&output);

    assert_eq!(output.status.code(), Some(1));
    let usage = position(&lines, "Usage: morphometry.py <in: elevation>");
    let notice = position(&lines, "... trying to run with test_data");
    let error = position(&lines, "ERROR: loading grid [./test.sgrd]");
    assert!(usage < notice && notice < error, "{:?}", lines);
    assert!(!lines.iter().any(|l| l == "success"));
}

#[test]
fn test_fallback_dem_is_used() {
    let _guard = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let setup = Setup::new();
    setup.write_dem("test");

    let output = setup.run(&[]);
    let lines = stdout_lines(&output);

    assert_eq!(output.status.code(), Some(0), "{:?}", lines);
    assert!(position(&lines, "Usage: morphometry.py <in: elevation>") < position(&lines, "success"));
    assert!(setup.work().join("ccurv.sgrd").is_file());
}

#[test]
fn test_load_failure_prints_error_and_exits_one() {
    let _guard = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let setup = Setup::new();
    let dem = setup.work().join("absent.sgrd");

    let output = setup.run(&[dem.as_path()]);
    let lines = stdout_lines(&output);

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        lines.last().map(String::as_str),
        Some(format!("ERROR: loading grid [{}]", dem.display()).as_str())
    );
    assert!(!lines.iter().any(|l| l.starts_with("Usage:")));
    assert!(!setup.work().join("slope.sgrd").exists());
}

#[test]
fn test_module_failure_prints_module_name() {
    let _guard = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let setup = Setup::new();
    let dem = setup.write_dem("dem");
    setup.fail(4);

    let output = setup.run(&[dem.as_path()]);
    let lines = stdout_lines(&output);

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        lines.last().map(String::as_str),
        Some("ERROR: executing module [Curvature Classification]")
    );
    assert!(setup.work().join("slope.sgrd").is_file());
    assert!(!setup.work().join("ccurv.sgrd").exists());
}
