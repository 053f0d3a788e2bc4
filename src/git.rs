//! Version-control gateway.
//!
//! Every operation the resolver needs goes through [`Vcs`], so the working-tree
//! mutations (`checkout`) are visible at the call site instead of hidden in a
//! global. [`GitRepo`] is the production implementation.
use crate::error::{FilterError, FilterResult};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

pub trait Vcs {
    /// Check out `revision`, mutating the working tree.
    fn checkout(&mut self, revision: &str) -> FilterResult<()>;

    fn merge_base(&self, base: &str, head: &str) -> FilterResult<String>;

    /// First parent of `head`; [`FilterError::NoParentCommit`] for a root commit.
    fn parent_commit(&self, head: &str) -> FilterResult<String>;

    /// Tags reachable from the checked-out commit, oldest first.
    fn list_tags(&self) -> FilterResult<Vec<String>>;

    /// Commit a tag points at, peeling annotated tags.
    fn resolve_tag_to_commit(&self, tag: &str) -> FilterResult<String>;

    fn changed_files(&self, base: &str, head: &str) -> FilterResult<Vec<String>>;
}

/// A git working copy driven through the `git` executable.
pub struct GitRepo {
    root: PathBuf,
}

struct GitOutput {
    success: bool,
    stdout: String,
    stderr: String,
}

impl GitRepo {
    pub fn open(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn exec(&self, args: &[&str]) -> FilterResult<GitOutput> {
        let start = Instant::now();
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .map_err(|err| FilterError::Vcs {
                command: args.join(" "),
                detail: err.to_string(),
            })?;
        tracing::debug!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            command = %args.join(" "),
            status = %output.status,
            "git command complete"
        );
        Ok(GitOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn run(&self, args: &[&str]) -> FilterResult<String> {
        let output = self.exec(args)?;
        if !output.success {
            let stderr_line = output.stderr.trim().lines().next().unwrap_or_default();
            let detail = if stderr_line.is_empty() {
                "non-zero exit status".to_string()
            } else {
                stderr_line.to_string()
            };
            return Err(FilterError::Vcs {
                command: args.join(" "),
                detail,
            });
        }
        Ok(output.stdout)
    }
}

impl Vcs for GitRepo {
    fn checkout(&mut self, revision: &str) -> FilterResult<()> {
        self.run(&["-c", "advice.detachedHead=false", "checkout", revision])?;
        Ok(())
    }

    fn merge_base(&self, base: &str, head: &str) -> FilterResult<String> {
        Ok(self.run(&["merge-base", base, head])?.trim().to_string())
    }

    fn parent_commit(&self, head: &str) -> FilterResult<String> {
        let spec = format!("{head}~1^{{commit}}");
        let output = self.exec(&["rev-parse", "--verify", "--quiet", &spec])?;
        let parent = output.stdout.trim();
        if !output.success || parent.is_empty() {
            return Err(FilterError::NoParentCommit(head.to_string()));
        }
        Ok(parent.to_string())
    }

    fn list_tags(&self) -> FilterResult<Vec<String>> {
        let stdout = self.run(&["tag", "--sort=creatordate", "--merged"])?;
        Ok(non_empty_lines(&stdout))
    }

    fn resolve_tag_to_commit(&self, tag: &str) -> FilterResult<String> {
        let spec = format!("refs/tags/{tag}^{{commit}}");
        let commit = self.run(&["rev-parse", "--verify", &spec])?.trim().to_string();
        if commit.is_empty() {
            return Err(FilterError::Vcs {
                command: format!("rev-parse --verify {spec}"),
                detail: "no commit id reported".to_string(),
            });
        }
        Ok(commit)
    }

    fn changed_files(&self, base: &str, head: &str) -> FilterResult<Vec<String>> {
        let stdout = self.run(&["-c", "core.quotepath=false", "diff", "--name-only", base, head])?;
        Ok(non_empty_lines(&stdout))
    }
}

fn non_empty_lines(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
