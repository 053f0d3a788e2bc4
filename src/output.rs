//! Output staging for the parameter document and filtered config list.
//!
//! Both artifacts are written to temp siblings first and only renamed into
//! place once every artifact has been staged. A failed rename rolls back the
//! artifacts already published and restores the files they replaced.
use crate::mapping::FilterOutcome;
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Default location of the filtered config list read by the continuation step.
pub const FILTERED_CONFIG_LIST_PATH: &str = "/tmp/filtered-config-list";

pub(crate) struct WriteOutputsArgs<'a> {
    pub(crate) outcome: &'a FilterOutcome,
    pub(crate) output_path: &'a Path,
    pub(crate) config_list_path: &'a Path,
}

/// Write both artifacts, or neither.
pub fn write_outputs(args: &WriteOutputsArgs<'_>) -> Result<Vec<PathBuf>> {
    let parameters =
        serde_json::to_vec(&args.outcome.parameters).context("serialize parameter document")?;
    let config_list = render_config_list(args.outcome);

    let mut staged = Vec::new();
    for (dest, bytes) in [
        (args.output_path, parameters),
        (args.config_list_path, config_list.into_bytes()),
    ] {
        match stage_file(dest, &bytes) {
            Ok(tmp) => staged.push((tmp, dest.to_path_buf())),
            Err(err) => {
                discard_staged(&staged);
                return Err(err);
            }
        }
    }

    let mut published = Vec::new();
    let mut backups = Vec::new();
    for (index, (tmp, dest)) in staged.iter().enumerate() {
        if let Err(err) = publish_file(tmp, dest, &mut backups) {
            rollback_publish(&published, &backups);
            discard_staged(&staged[index..]);
            return Err(err);
        }
        published.push(dest.clone());
    }
    for (_, backup) in &backups {
        let _ = fs::remove_file(backup);
    }
    Ok(published)
}

pub fn render_config_list(outcome: &FilterOutcome) -> String {
    outcome
        .config_files
        .iter()
        .map(|path| format!("{path}\n"))
        .collect()
}

fn stage_file(dest: &Path, bytes: &[u8]) -> Result<PathBuf> {
    if let Some(parent) = dest.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let file_name = dest
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("output path {} has no file name", dest.display()))?;
    let tmp_path = dest
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(format!(".{file_name}.tmp"));
    fs::write(&tmp_path, bytes).with_context(|| format!("write {}", tmp_path.display()))?;
    Ok(tmp_path)
}

fn discard_staged(staged: &[(PathBuf, PathBuf)]) {
    for (tmp, _) in staged {
        if tmp.exists() {
            let _ = fs::remove_file(tmp);
        }
    }
}

/// Move `tmp` over `dest`, first moving an existing `dest` file aside.
fn publish_file(tmp: &Path, dest: &Path, backups: &mut Vec<(PathBuf, PathBuf)>) -> Result<()> {
    if dest.is_file() {
        let backup = tmp.with_extension("bak");
        fs::rename(dest, &backup).with_context(|| format!("backup {}", dest.display()))?;
        backups.push((dest.to_path_buf(), backup));
    }
    fs::rename(tmp, dest).with_context(|| format!("publish {}", dest.display()))?;
    Ok(())
}

fn rollback_publish(published: &[PathBuf], backups: &[(PathBuf, PathBuf)]) {
    for path in published {
        if path.is_file() {
            let _ = fs::remove_file(path);
        }
    }
    for (dest, backup) in backups {
        let _ = fs::rename(backup, dest);
    }
}
