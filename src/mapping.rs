//! Mapping table parsing and change-set filtering.
//!
//! Each mapping line reads
//! `path-regex pipeline-parameter pipeline-parameter-value [config-file]`.
//! The first rule fixes the field count for the whole table.
use crate::error::{FilterError, FilterResult};
use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// A decoded pipeline parameter value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Integer(serde_json::Number),
    String(String),
    Boolean(bool),
}

impl ParameterValue {
    pub fn parse(raw: &str) -> FilterResult<Self> {
        let value: Value =
            serde_json::from_str(raw).map_err(|source| FilterError::ParameterValueParse {
                value: raw.to_string(),
                source,
            })?;
        match value {
            Value::Bool(flag) => Ok(Self::Boolean(flag)),
            Value::String(text) => Ok(Self::String(text)),
            Value::Number(number) if is_integer_literal(&number) => Ok(Self::Integer(number)),
            other => Err(FilterError::UnsupportedParameterType {
                value: other.to_string(),
                kind: json_kind(&other),
            }),
        }
    }
}

/// Integers of any magnitude; numbers keep their source literal.
fn is_integer_literal(number: &serde_json::Number) -> bool {
    !number.to_string().contains(['.', 'e', 'E'])
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "float",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Path pattern compiled to match a whole repository-relative path.
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    regex: Regex,
}

impl PathPattern {
    pub fn parse(source: &str) -> FilterResult<Self> {
        let regex = Regex::new(&format!("^(?:{source})$")).map_err(|source_err| {
            FilterError::InvalidPathPattern {
                pattern: source.to_string(),
                source: source_err,
            }
        })?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }
}

#[derive(Debug, Clone)]
pub enum MappingRule {
    ThreeField {
        path: PathPattern,
        parameter: String,
        value: ParameterValue,
    },
    FourField {
        path: PathPattern,
        parameter: String,
        value: ParameterValue,
        config_file: String,
    },
}

impl MappingRule {
    pub fn path(&self) -> &PathPattern {
        match self {
            Self::ThreeField { path, .. } | Self::FourField { path, .. } => path,
        }
    }

    pub fn parameter(&self) -> &str {
        match self {
            Self::ThreeField { parameter, .. } | Self::FourField { parameter, .. } => parameter,
        }
    }

    pub fn value(&self) -> &ParameterValue {
        match self {
            Self::ThreeField { value, .. } | Self::FourField { value, .. } => value,
        }
    }

    pub fn config_file(&self) -> Option<&str> {
        match self {
            Self::ThreeField { .. } => None,
            Self::FourField { config_file, .. } => Some(config_file),
        }
    }
}

/// Field layout shared by every rule in a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleShape {
    ThreeField,
    FourField,
}

impl RuleShape {
    fn from_field_count(count: usize) -> FilterResult<Self> {
        match count {
            3 => Ok(Self::ThreeField),
            4 => Ok(Self::FourField),
            other => Err(FilterError::InvalidMappingLength(other)),
        }
    }

    fn field_count(self) -> usize {
        match self {
            Self::ThreeField => 3,
            Self::FourField => 4,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MappingTable {
    shape: RuleShape,
    rules: Vec<MappingRule>,
}

impl MappingTable {
    pub fn parse(text: &str) -> FilterResult<Self> {
        let lines: Vec<&str> = text.lines().filter(|line| is_mapping_line(line)).collect();
        let Some(first) = lines.first() else {
            return Err(FilterError::EmptyMapping);
        };
        let shape = RuleShape::from_field_count(first.split_whitespace().count())?;

        let rules = lines
            .iter()
            .map(|line| parse_rule(line, shape))
            .collect::<FilterResult<Vec<_>>>()?;
        Ok(Self { shape, rules })
    }

    pub fn shape(&self) -> RuleShape {
        self.shape
    }

    pub fn rules(&self) -> &[MappingRule] {
        &self.rules
    }
}

fn is_mapping_line(line: &str) -> bool {
    let trimmed = line.trim();
    !(trimmed.is_empty() || trimmed.starts_with('#'))
}

fn parse_rule(line: &str, shape: RuleShape) -> FilterResult<MappingRule> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != shape.field_count() {
        return Err(FilterError::MappingLengthMismatch {
            expected: shape.field_count(),
            found: fields.len(),
            line: line.trim().to_string(),
        });
    }
    let value = ParameterValue::parse(fields[2])?;
    let path = PathPattern::parse(fields[0])?;
    let parameter = fields[1].to_string();
    Ok(match shape {
        RuleShape::ThreeField => MappingRule::ThreeField {
            path,
            parameter,
            value,
        },
        RuleShape::FourField => MappingRule::FourField {
            path,
            parameter,
            value,
            config_file: fields[3].to_string(),
        },
    })
}

/// Read the mapping from `source` when it names an existing file, otherwise
/// treat `source` itself as the mapping text.
pub fn load_mapping_text(source: &str) -> FilterResult<String> {
    let path = Path::new(source);
    if !source.is_empty() && path.exists() {
        return Ok(fs::read_to_string(path)?);
    }
    Ok(source.to_string())
}

/// Parameter name to value; keys keep the order they were first triggered.
pub type ParameterDocument = IndexMap<String, ParameterValue>;

#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    pub parameters: ParameterDocument,
    pub config_files: BTreeSet<String>,
}

impl FilterOutcome {
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

/// Apply `table` to the change set.
///
/// A rule triggers on the first changed path its pattern matches. When two
/// triggered rules set the same parameter, the later rule's value wins.
/// An empty config set falls back to `default_config`.
pub fn filter_changes<S: AsRef<str>>(
    table: &MappingTable,
    changes: &[S],
    default_config: &str,
) -> FilterOutcome {
    let mut outcome = FilterOutcome::default();
    for rule in table.rules() {
        let Some(changed) = changes
            .iter()
            .map(AsRef::as_ref)
            .find(|change| rule.path().is_match(change))
        else {
            continue;
        };
        tracing::debug!(
            pattern = rule.path().as_str(),
            path = changed,
            parameter = rule.parameter(),
            "mapping rule triggered"
        );
        outcome
            .parameters
            .insert(rule.parameter().to_string(), rule.value().clone());
        if let Some(config_file) = rule.config_file() {
            outcome.config_files.insert(config_file.to_string());
        }
    }

    if outcome.config_files.is_empty() {
        outcome.config_files.insert(default_config.to_string());
    }
    outcome
}

#[cfg(test)]
#[path = "mapping_tests.rs"]
mod tests;
