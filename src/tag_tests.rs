use super::{is_valid_reference_pattern, ReferencePattern};
use crate::error::{FilterError, FilterResult};

#[test]
fn valid_patterns_require_slash_delimiters() {
    assert!(is_valid_reference_pattern("/^release.*/"));
    assert!(is_valid_reference_pattern("/v[0-9]+/"));
    assert!(is_valid_reference_pattern("//"));
    assert!(!is_valid_reference_pattern("^release.*"));
    assert!(!is_valid_reference_pattern("/^release.*"));
    assert!(!is_valid_reference_pattern("^release.*/"));
    assert!(!is_valid_reference_pattern(""));
}

#[test]
fn delimited_text_must_compile() {
    assert!(!is_valid_reference_pattern("/release-(/"));
    assert!(!is_valid_reference_pattern("/[v/"));
}

#[test]
fn matching_is_anchored_at_start_only() {
    let pattern = ReferencePattern::parse("/release/").expect("parse pattern");
    assert!(pattern.matches("release"));
    assert!(pattern.matches("release-1.2.0"));
    assert!(!pattern.matches("pre-release"));
}

#[test]
fn alternation_stays_anchored() {
    let pattern = ReferencePattern::parse("/v1|v2/").expect("parse pattern");
    assert!(pattern.matches("v2.0.0"));
    assert!(!pattern.matches("xv2.0.0"));
}

fn matches_any<S: AsRef<str>>(reference: &str, tags: &[S]) -> FilterResult<bool> {
    Ok(ReferencePattern::parse(reference)?.matches_any(tags))
}

#[test]
fn surrounding_slashes_are_all_stripped() {
    let any = ReferencePattern::parse("/").expect("lone slash");
    assert!(any.matches("anything"));
    assert!(ReferencePattern::parse("//").expect("empty pattern").matches(""));

    let doubled = ReferencePattern::parse("//v1//").expect("doubled slashes");
    assert!(doubled.matches("v1.0.0"));
    assert!(!doubled.matches("release-v1"));
}

#[test]
fn matches_any_reports_hits_and_misses() {
    let tags = ["nightly-3", "v1.4.0", "docs-2"];
    assert!(matches_any("/^v1\\./", &tags).expect("valid pattern"));
    assert!(!matches_any("/^v2\\./", &tags).expect("valid pattern"));
}

#[test]
fn matches_any_validates_even_without_tags() {
    let empty: [&str; 0] = [];
    let err = matches_any("release", &empty).expect_err("missing delimiters");
    assert!(matches!(err, FilterError::InvalidReferenceTag(ref raw) if raw == "release"));
    assert!(err.to_string().contains("/some_regex/"));
}

#[test]
fn latest_match_prefers_newest_tag() {
    let pattern = ReferencePattern::parse("/^v/").expect("parse pattern");
    let tags = ["v1.0.0", "nightly-1", "v1.1.0", "nightly-2"];
    assert_eq!(pattern.latest_match(&tags), Some("v1.1.0"));

    let none = ["nightly-1", "nightly-2"];
    assert_eq!(pattern.latest_match(&none), None);
}
