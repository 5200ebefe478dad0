use serde_json::Value;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

struct TempDirGuard {
    path: PathBuf,
}

impl TempDirGuard {
    fn new(prefix: &str) -> Self {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "opsig-cli-{prefix}-{}-{unique}",
            std::process::id()
        ));
        fs::create_dir_all(&path).expect("temp dir should be created");
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path.join(name);
        fs::write(&path, contents).expect("fixture should be written");
        path
    }
}

impl Drop for TempDirGuard {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn run_opsig<I, S>(args: I) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bin = env!("CARGO_BIN_EXE_opsig");
    Command::new(bin)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("opsig command should execute")
}

fn assert_success(output: &Output) {
    if !output.status.success() {
        panic!(
            "command failed with status {:?}\nstdout:\n{}\nstderr:\n{}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
    }
}

fn assert_failure(output: &Output) {
    if output.status.success() {
        panic!(
            "command unexpectedly succeeded\nstdout:\n{}\nstderr:\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
    }
}

fn stdout_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn parse_json_stdout(output: &Output) -> Value {
    serde_json::from_slice::<Value>(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout should be valid json: {e}\nstdout:\n{}",
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

const GOOD_MANIFEST: &str = r#"[
  {
    "name": "foo",
    "isMethod": true,
    "arguments": [
      {"name": "self", "type": "Value"},
      {"name": "n", "type": "int"},
      {"name": "precision", "type": "PrecisionKind?", "default": "None"},
      {"name": "layout", "type": "LayoutKind?", "default": "None"},
      {"name": "device", "type": "DeviceKind?", "default": "None"},
      {"name": "pinned", "type": "bool?", "default": "None"}
    ],
    "returns": [{"type": "Value"}]
  },
  {
    "name": "add.Scalar",
    "arguments": [
      {"name": "self", "type": "Value"},
      {"name": "other", "type": "Scalar"}
    ],
    "returns": [{"type": "Value"}]
  }
]"#;

const PARTIAL_MANIFEST: &str = r#"[
  {
    "name": "ok",
    "arguments": [{"name": "x", "type": "Value"}],
    "returns": [{"type": "Value"}]
  },
  {
    "name": "broken",
    "arguments": [
      {"name": "precision", "type": "PrecisionKind?", "default": "None"},
      {"name": "device", "type": "DeviceKind?", "default": "None"}
    ],
    "returns": [{"type": "Value"}]
  }
]"#;

#[test]
fn derive_text_prints_every_surface() {
    let tmp = TempDirGuard::new("derive-text");
    let manifest = tmp.write("ops.json", GOOD_MANIFEST);

    let output = run_opsig([OsStr::new("derive"), manifest.as_os_str()]);
    assert_success(&output);

    let text = stdout_text(&output);
    assert!(text.contains("Front: Value foo(Int64 n, ResourceOptions options={})"));
    assert!(text.contains(
        "Faithful: Value foo(Int64 n, Optional<PrecisionKind> precision, \
         Optional<LayoutKind> layout, Optional<DeviceKind> device, Optional<bool> pinned)"
    ));
    assert!(text.contains("add_Scalar"));
    assert!(text.contains("Digest: sig1_"));
}

#[test]
fn derive_json_emits_report_array() {
    let tmp = TempDirGuard::new("derive-json");
    let manifest = tmp.write("ops.json", GOOD_MANIFEST);

    let output = run_opsig([
        OsStr::new("derive"),
        manifest.as_os_str(),
        OsStr::new("--json"),
    ]);
    assert_success(&output);

    let payload = parse_json_stdout(&output);
    let reports = payload.as_array().expect("reports should be an array");
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0]["schema"], "foo");
    assert!(reports[0]["faithful"].is_object());
    assert_eq!(reports[1]["dispatch"]["name"], "add_Scalar");
    assert!(reports[1].get("faithful").is_none_or(Value::is_null));
}

#[test]
fn derive_fails_on_partial_group_and_keeps_good_entries() {
    let tmp = TempDirGuard::new("derive-partial");
    let manifest = tmp.write("ops.json", PARTIAL_MANIFEST);

    let output = run_opsig([
        OsStr::new("derive"),
        manifest.as_os_str(),
        OsStr::new("--json"),
    ]);
    assert_failure(&output);
    assert_eq!(output.status.code(), Some(1));

    let payload = parse_json_stdout(&output);
    assert_eq!(payload.as_array().map(Vec::len), Some(1));
    assert!(stderr_text(&output).contains("error: broken: partial resource-options group"));
}

#[test]
fn check_json_summarizes_failures() {
    let tmp = TempDirGuard::new("check-json");
    let manifest = tmp.write("ops.json", PARTIAL_MANIFEST);

    let output = run_opsig([
        OsStr::new("check"),
        manifest.as_os_str(),
        OsStr::new("--json"),
    ]);
    assert_failure(&output);

    let payload = parse_json_stdout(&output);
    assert_eq!(payload["entryCount"], 2);
    assert_eq!(payload["derivedCount"], 1);
    assert_eq!(payload["ok"], false);
    assert_eq!(payload["failures"][0]["schema"], "broken");
    assert_eq!(
        payload["failures"][0]["kind"],
        "partial_resource_options_group"
    );
}

#[test]
fn check_text_passes_clean_manifest() {
    let tmp = TempDirGuard::new("check-text");
    let manifest = tmp.write("ops.json", GOOD_MANIFEST);

    let output = run_opsig([OsStr::new("check"), manifest.as_os_str()]);
    assert_success(&output);

    let text = stdout_text(&output);
    assert!(text.contains("Entries: 2"));
    assert!(text.contains("Failed: 0"));
}

#[test]
fn config_renames_resource_options_bundle() {
    let tmp = TempDirGuard::new("config");
    let manifest = tmp.write("ops.json", GOOD_MANIFEST);
    let config = tmp.write(
        "opsig.toml",
        r#"
[resource_options]
type_name = "AllocOptions"
name = "alloc"
"#,
    );

    let output = run_opsig([
        OsStr::new("derive"),
        manifest.as_os_str(),
        OsStr::new("--config"),
        config.as_os_str(),
    ]);
    assert_success(&output);
    assert!(stdout_text(&output).contains("Value foo(Int64 n, AllocOptions alloc={})"));
}

#[test]
fn invalid_config_is_rejected() {
    let tmp = TempDirGuard::new("bad-config");
    let manifest = tmp.write("ops.json", GOOD_MANIFEST);
    let config = tmp.write("opsig.toml", "[unknown]\nkey = 1\n");

    let output = run_opsig([
        OsStr::new("derive"),
        manifest.as_os_str(),
        OsStr::new("--config"),
        config.as_os_str(),
    ]);
    assert_failure(&output);
    assert!(stderr_text(&output).contains("error:"));
}

#[test]
fn missing_manifest_reports_read_error() {
    let tmp = TempDirGuard::new("missing");
    let manifest = tmp.path().join("absent.json");

    let output = run_opsig([OsStr::new("check"), manifest.as_os_str()]);
    assert_failure(&output);
    assert!(stderr_text(&output).contains("failed to read"));
}
