//! Error types for parameter generation.

/// Fatal conditions raised while resolving revisions or applying the mapping.
///
/// "No previous matching tag" and "no change detected" are deliberately absent:
/// both are informational outcomes that still produce valid outputs.
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error(
        "invalid regex provided in reference tag \"{0}\". The reference tag should be in the \
         format /some_regex/. Example: /^release.*/ would match all tags starting with \
         \"release\" followed by any characters"
    )]
    InvalidReferenceTag(String),

    #[error("mapping cannot be empty")]
    EmptyMapping,

    #[error("invalid mapping length of {0} (expected 3 or 4 fields)")]
    InvalidMappingLength(usize),

    #[error("expected {expected} fields but found {found} in mapping line \"{line}\"")]
    MappingLengthMismatch {
        expected: usize,
        found: usize,
        line: String,
    },

    #[error("cannot parse pipeline value {value} from mapping: {source}")]
    ParameterValueParse {
        value: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(
        "pipeline parameters can only be integer, string or boolean type; found {value} of type {kind}"
    )]
    UnsupportedParameterType { value: String, kind: &'static str },

    #[error("invalid path pattern \"{pattern}\" in mapping: {source}")]
    InvalidPathPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("output path is not set")]
    MissingOutputPath,

    #[error("{0} has no parent commit")]
    NoParentCommit(String),

    #[error("git {command} failed: {detail}")]
    Vcs { command: String, detail: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type FilterResult<T> = Result<T, FilterError>;
