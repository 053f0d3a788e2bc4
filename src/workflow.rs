//! End-to-end parameter generation: resolve, diff, filter, write.
use crate::cli::RootArgs;
use crate::error::FilterError;
use crate::git::{GitRepo, Vcs};
use crate::mapping::{filter_changes, load_mapping_text, FilterOutcome, MappingTable};
use crate::output::{write_outputs, WriteOutputsArgs};
use crate::resolve::{resolve_range, RevisionInputs};
use crate::tag::is_valid_reference_pattern;
use anyhow::{Context, Result};
use std::path::Path;

/// Everything needed to compute one parameter document.
pub struct CreateParameters<'a> {
    pub revisions: RevisionInputs,
    pub mapping: &'a str,
    pub config_path: &'a str,
}

pub fn run(args: RootArgs) -> Result<()> {
    if args.output_path.is_empty() {
        return Err(FilterError::MissingOutputPath.into());
    }
    if let Some(reference) = args.tag_reference.as_deref().filter(|r| !r.is_empty()) {
        if !is_valid_reference_pattern(reference) {
            tracing::warn!(
                reference,
                "reference tag is not a valid /regex/ pattern; tagged builds will fail"
            );
        }
    }
    let mut repo = GitRepo::open(&args.repo);
    tracing::debug!(repo = %repo.root().display(), "opened repository");

    let request = CreateParameters {
        revisions: RevisionInputs {
            head: args.head,
            base: args.base_revision,
            tag_reference: args.tag_reference,
            head_tag: args.head_tag,
        },
        mapping: &args.mapping,
        config_path: &args.config_path,
    };
    let outcome = create_parameters(&mut repo, &request)?;

    let published = write_outputs(&WriteOutputsArgs {
        outcome: &outcome,
        output_path: Path::new(&args.output_path),
        config_list_path: &args.filtered_config_list,
    })?;
    for path in published {
        println!("wrote {}", path.display());
    }
    Ok(())
}

/// Resolve the revision range, diff it, and apply the mapping.
///
/// Leaves `repo` checked out at head. Nothing is written.
pub fn create_parameters<V: Vcs>(repo: &mut V, request: &CreateParameters<'_>) -> Result<FilterOutcome> {
    let range = resolve_range(repo, &request.revisions).context("resolve base revision")?;
    println!("Comparing {}...{}", range.base, range.head);
    let changes = repo
        .changed_files(&range.base, &range.head)
        .context("list changed files")?;
    tracing::info!(changed = changes.len(), "collected change set");

    let text = load_mapping_text(request.mapping).context("load mapping")?;
    let table = MappingTable::parse(&text)?;
    tracing::debug!(rules = table.rules().len(), shape = ?table.shape(), "parsed mapping");
    let outcome = filter_changes(&table, changes.as_slice(), request.config_path);
    if outcome.is_empty() {
        println!("No change detected in the paths defined in the mapping parameter");
    }
    Ok(outcome)
}
