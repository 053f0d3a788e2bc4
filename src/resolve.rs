//! Base revision resolution.
//!
//! Tagged release builds diff against the previous matching release tag; every
//! other build diffs against the merge base of the supplied base and head.
use crate::error::{FilterError, FilterResult};
use crate::git::Vcs;
use crate::tag::ReferencePattern;

/// Object id of git's empty tree. Diffing against it lists every file in head.
pub const EMPTY_TREE_SHA: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

/// Revision inputs as supplied by the CI environment.
#[derive(Debug, Clone, Default)]
pub struct RevisionInputs {
    pub head: String,
    pub base: String,
    pub tag_reference: Option<String>,
    pub head_tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedCommit {
    pub commit: String,
    pub tag: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRange {
    pub base: String,
    pub head: String,
}

/// Find the newest tag before the head tag that matches `pattern`.
///
/// The newest reachable tag belongs to the head commit itself and is skipped.
/// `Ok(None)` means no earlier tag exists or none matches.
pub fn previous_matching_tag<V: Vcs>(
    repo: &V,
    pattern: &ReferencePattern,
) -> FilterResult<Option<TaggedCommit>> {
    let mut tags = repo.list_tags()?;
    tags.pop();
    if tags.is_empty() {
        tracing::info!("no earlier tags reachable from this branch");
        return Ok(None);
    }

    let Some(tag) = pattern.latest_match(&tags) else {
        tracing::info!(
            reference = pattern.as_str(),
            "no commit found with a tag matching the reference"
        );
        return Ok(None);
    };

    let commit = repo.resolve_tag_to_commit(tag)?;
    Ok(Some(TaggedCommit {
        commit,
        tag: tag.to_string(),
    }))
}

/// Resolve the revision range to diff.
///
/// Mutates the working tree: `base` is checked out first so it is available
/// locally for `merge-base`, then `head` is checked out again. The repository
/// is left on `head`.
pub fn resolve_range<V: Vcs>(repo: &mut V, inputs: &RevisionInputs) -> FilterResult<ResolvedRange> {
    let head = inputs.head.as_str();
    let mut base = inputs.base.clone();

    if let Some(pattern) = tagged_build_pattern(inputs)? {
        tracing::info!(
            head_tag = inputs.head_tag.as_deref().unwrap_or_default(),
            reference = pattern.as_str(),
            "head tag matches the reference; looking up the previous matching tag"
        );
        match previous_matching_tag(repo, &pattern)? {
            Some(previous) => {
                tracing::info!(
                    base = %previous.commit,
                    tag = %previous.tag,
                    "base set from previous matching tag"
                );
                base = previous.commit;
            }
            None => {
                tracing::info!(
                    base = %base,
                    "no previous matching tag; continuing with the supplied base"
                );
            }
        }
    }

    repo.checkout(&base)?;
    repo.checkout(head)?;
    base = repo.merge_base(&base, head)?;

    if base == head {
        base = match repo.parent_commit(head) {
            Ok(parent) => parent,
            Err(FilterError::NoParentCommit(_)) => {
                tracing::info!(head, "head is a root commit; diffing against the empty tree");
                EMPTY_TREE_SHA.to_string()
            }
            Err(err) => return Err(err),
        };
    }

    Ok(ResolvedRange {
        base,
        head: head.to_string(),
    })
}

/// The reference pattern, when this is a tagged build matching it.
fn tagged_build_pattern(inputs: &RevisionInputs) -> FilterResult<Option<ReferencePattern>> {
    let (Some(head_tag), Some(reference)) = (
        non_empty(inputs.head_tag.as_deref()),
        non_empty(inputs.tag_reference.as_deref()),
    ) else {
        return Ok(None);
    };
    let pattern = ReferencePattern::parse(reference)?;
    Ok(pattern.matches_any(&[head_tag]).then_some(pattern))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

#[cfg(test)]
#[path = "resolve_tests.rs"]
mod tests;
