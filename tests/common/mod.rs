//! Shared test infrastructure for integration tests.

use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

/// Environment inputs the binary reads; cleared so a CI host cannot leak them in.
const INPUT_VARS: &[&str] = &[
    "OUTPUT_PATH",
    "CONFIG_PATH",
    "CIRCLE_SHA1",
    "BASE_REVISION",
    "TAG_REFERENCE",
    "CIRCLE_TAG",
    "MAPPING",
    "FILTERED_CONFIG_LIST",
    "PATH_FILTER_LOG",
    "RUST_LOG",
];

pub const DEFAULT_CONFIG: &str = ".circleci/continue_config.yml";

/// Check if git is available; skip test if not.
pub fn skip_if_git_missing() -> bool {
    let missing = Command::new("git")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_err();
    if missing {
        eprintln!("Skipping: git not available");
    }
    missing
}

/// Throwaway git repository with deterministic commit dates.
pub struct TestRepo {
    dir: TempDir,
    commits: u32,
}

impl TestRepo {
    pub fn init() -> Self {
        let dir = TempDir::new().expect("create repo dir");
        let repo = Self { dir, commits: 0 };
        repo.git(&["init", "-q"]);
        repo.git(&["symbolic-ref", "HEAD", "refs/heads/main"]);
        repo.git(&["config", "user.name", "Path Filter Tests"]);
        repo.git(&["config", "user.email", "tests@example.com"]);
        repo.git(&["config", "commit.gpgsign", "false"]);
        repo.git(&["config", "tag.gpgsign", "false"]);
        repo
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn git(&self, args: &[&str]) -> String {
        let date = format!("2024-01-01T00:00:{:02}+00:00", self.commits);
        let output = Command::new("git")
            .args(args)
            .current_dir(self.path())
            .env("GIT_TERMINAL_PROMPT", "0")
            .env("GIT_AUTHOR_DATE", &date)
            .env("GIT_COMMITTER_DATE", &date)
            .output()
            .unwrap_or_else(|e| panic!("failed to run git {:?}: {}", args, e));
        if !output.status.success() {
            panic!(
                "git {:?} failed: {}",
                args,
                String::from_utf8_lossy(&output.stderr)
            );
        }
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    /// Write `files` and commit them, returning the new commit id.
    pub fn commit(&mut self, message: &str, files: &[&str]) -> String {
        for file in files {
            let path = self.path().join(file);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).expect("create parent directory");
            }
            std::fs::write(&path, format!("{message}\n")).expect("write file");
        }
        self.commits += 1;
        self.git(&["add", "-A"]);
        self.git(&["commit", "-q", "-m", message]);
        self.git(&["rev-parse", "HEAD"])
    }

    pub fn tag(&self, name: &str) {
        self.git(&["tag", name]);
    }

    pub fn annotated_tag(&self, name: &str) {
        self.git(&["tag", "-a", name, "-m", name]);
    }
}

/// Inputs for one run of the binary.
pub struct Invocation<'a> {
    pub head: &'a str,
    pub base: &'a str,
    pub mapping: &'a str,
    pub tag_reference: Option<&'a str>,
    pub head_tag: Option<&'a str>,
    pub output_path: Option<&'a str>,
}

impl<'a> Invocation<'a> {
    pub fn new(head: &'a str, base: &'a str, mapping: &'a str) -> Self {
        Self {
            head,
            base,
            mapping,
            tag_reference: None,
            head_tag: None,
            output_path: None,
        }
    }
}

/// Result of running the binary, with its artifacts read back.
pub struct RunResult {
    pub output: Output,
    pub parameters: Option<serde_json::Value>,
    pub config_list: Option<String>,
}

impl RunResult {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }
}

/// Run path-filter against `repo`, writing artifacts under a fresh temp dir.
pub fn run(repo: &TestRepo, invocation: &Invocation<'_>) -> RunResult {
    let out_dir = TempDir::new().expect("create output dir");
    let default_output = out_dir.path().join("pipeline-parameters.json");
    let output_path = invocation
        .output_path
        .map(PathBuf::from)
        .unwrap_or(default_output);
    let config_list_path = out_dir.path().join("filtered-config-list");

    let mut command = Command::new(env!("CARGO_BIN_EXE_path-filter"));
    for var in INPUT_VARS {
        command.env_remove(var);
    }
    command
        .current_dir(repo.path())
        .env("CIRCLE_SHA1", invocation.head)
        .env("BASE_REVISION", invocation.base)
        .env("MAPPING", invocation.mapping)
        .env("CONFIG_PATH", DEFAULT_CONFIG)
        .env("OUTPUT_PATH", &output_path)
        .env("FILTERED_CONFIG_LIST", &config_list_path);
    if let Some(reference) = invocation.tag_reference {
        command.env("TAG_REFERENCE", reference);
    }
    if let Some(tag) = invocation.head_tag {
        command.env("CIRCLE_TAG", tag);
    }
    let output = command.output().expect("run path-filter");

    let parameters = std::fs::read_to_string(&output_path)
        .ok()
        .map(|text| serde_json::from_str(&text).expect("parameter document is JSON"));
    let config_list = std::fs::read_to_string(&config_list_path).ok();
    RunResult {
        output,
        parameters,
        config_list,
    }
}
