//! CLI argument parsing.
//!
//! Every input doubles as an environment variable so the binary can run as a
//! CI step with no flags at all.
use crate::output::FILTERED_CONFIG_LIST_PATH;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "path-filter",
    version,
    about = "Derive pipeline parameters from the paths changed between two revisions",
    after_help = "Mapping lines:\n  <path-regex> <parameter> <json-value> [config-file]\n\nExamples:\n  path-filter --head $CIRCLE_SHA1 --base-revision main --mapping '.circleci/mapping.conf' \\\n      --output-path /tmp/pipeline-parameters.json --config-path .circleci/continue_config.yml\n  MAPPING='src/.* build-src true' path-filter"
)]
pub struct RootArgs {
    /// Where to write the parameter document (JSON object)
    #[arg(long, env = "OUTPUT_PATH", value_name = "PATH", default_value = "")]
    pub output_path: String,

    /// Config file listed when no mapping rule selects one
    #[arg(long, env = "CONFIG_PATH", value_name = "PATH")]
    pub config_path: String,

    /// Head commit to diff
    #[arg(long, env = "CIRCLE_SHA1", value_name = "REV")]
    pub head: String,

    /// Candidate base revision; narrowed to its merge base with head
    #[arg(long, env = "BASE_REVISION", value_name = "REV")]
    pub base_revision: String,

    /// Reference tag pattern in the form /regex/
    #[arg(long, env = "TAG_REFERENCE", value_name = "/REGEX/")]
    pub tag_reference: Option<String>,

    /// Tag of the head commit when the build was triggered by a tag
    #[arg(long, env = "CIRCLE_TAG", value_name = "TAG")]
    pub head_tag: Option<String>,

    /// Mapping file path, or the mapping text itself
    #[arg(long, env = "MAPPING", value_name = "PATH|TEXT")]
    pub mapping: String,

    /// Where to write the filtered config list
    #[arg(
        long,
        env = "FILTERED_CONFIG_LIST",
        value_name = "PATH",
        default_value = FILTERED_CONFIG_LIST_PATH
    )]
    pub filtered_config_list: PathBuf,

    /// Repository working directory
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub repo: PathBuf,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, env = "PATH_FILTER_LOG", value_name = "FILTER", default_value = "info")]
    pub log_level: String,
}
