//! User-facing specifications and their classification.
//!
//! A [`Spec`] is what a caller hands to [`infer`](crate::config::infer):
//! either a typed value built in Rust or a JSON document classified by
//! [`Spec::from_json`].

use std::path::PathBuf;

use ndarray::{ArrayD, IxDyn};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::data::model::{CellValue, Image};
use crate::error::{ConfigError, Result};

/// Files matched by a glob, e.g. `{"pattern": "{id}/anat/*T1w*"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatternSpec {
    /// Overrides the base directory passed to `infer`.
    #[serde(default)]
    pub base_dir: Option<PathBuf>,
    pub pattern: String,
    /// fnmatch-style filter on relative paths.
    #[serde(default)]
    pub exclude: Option<String>,
    /// Fetch content on access instead of assuming it is on disk.
    #[serde(default, alias = "datalad")]
    pub lazy: bool,
}

impl PatternSpec {
    pub fn new(pattern: impl Into<String>) -> Self {
        PatternSpec {
            base_dir: None,
            pattern: pattern.into(),
            exclude: None,
            lazy: false,
        }
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    pub fn with_exclude(mut self, exclude: impl Into<String>) -> Self {
        self.exclude = Some(exclude.into());
        self
    }

    pub fn with_lazy(mut self, lazy: bool) -> Self {
        self.lazy = lazy;
        self
    }
}

/// A column of a table, e.g.
/// `{"file": "participants.tsv", "column": "age", "id": "participant_id"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnSpec {
    /// Overrides the base directory passed to `infer`.
    #[serde(default)]
    pub base_dir: Option<PathBuf>,
    pub file: PathBuf,
    pub column: String,
    #[serde(default, alias = "id")]
    pub id_column: Option<String>,
}

impl ColumnSpec {
    pub fn new(file: impl Into<PathBuf>, column: impl Into<String>) -> Self {
        ColumnSpec {
            base_dir: None,
            file: file.into(),
            column: column.into(),
            id_column: None,
        }
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    pub fn with_id_column(mut self, id_column: impl Into<String>) -> Self {
        self.id_column = Some(id_column.into());
        self
    }
}

/// Every shape of specification the inference engine accepts.
#[derive(Debug, Clone)]
pub enum Spec {
    /// Images already in memory.
    Images(Vec<Image>),
    /// A numeric array with a leading sample axis.
    Array(ArrayD<f64>),
    /// A flat sequence of scalars that are not all numeric.
    Cells(Vec<CellValue>),
    Pattern(PatternSpec),
    Column(ColumnSpec),
    /// One config per element, combined position-wise.
    Compose(Vec<Spec>),
}

impl From<PatternSpec> for Spec {
    fn from(spec: PatternSpec) -> Self {
        Spec::Pattern(spec)
    }
}

impl From<ColumnSpec> for Spec {
    fn from(spec: ColumnSpec) -> Self {
        Spec::Column(spec)
    }
}

impl From<ArrayD<f64>> for Spec {
    fn from(array: ArrayD<f64>) -> Self {
        Spec::Array(array)
    }
}

impl From<Vec<Image>> for Spec {
    fn from(images: Vec<Image>) -> Self {
        Spec::Images(images)
    }
}

impl Spec {
    /// Classify a JSON document.
    ///
    /// | JSON | Spec |
    /// |---|---|
    /// | array whose first element is an object | `Compose` of each element |
    /// | rectangular (nested) array of numbers | `Array` |
    /// | flat array of scalars | `Cells` |
    /// | object with `pattern` | `Pattern` |
    /// | object with `file` | `Column` |
    ///
    /// Anything else is [`ConfigError::UnsupportedSpecification`].
    pub fn from_json(value: &JsonValue) -> Result<Spec> {
        match value {
            JsonValue::Array(items) => classify_sequence(items),
            JsonValue::Object(map) => {
                if map.contains_key("pattern") {
                    serde_json::from_value(value.clone())
                        .map(Spec::Pattern)
                        .map_err(|e| ConfigError::unsupported(format!("pattern spec: {e}")))
                } else if map.contains_key("file") {
                    serde_json::from_value(value.clone())
                        .map(Spec::Column)
                        .map_err(|e| ConfigError::unsupported(format!("file spec: {e}")))
                } else {
                    let keys: Vec<&str> = map.keys().map(String::as_str).collect();
                    Err(ConfigError::unsupported(format!(
                        "mapping with keys {keys:?} has neither 'pattern' nor 'file'"
                    )))
                }
            }
            other => Err(ConfigError::unsupported(format!(
                "cannot infer a config from {}",
                json_kind(other)
            ))),
        }
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a bare number",
        JsonValue::String(_) => "a bare string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

fn classify_sequence(items: &[JsonValue]) -> Result<Spec> {
    let Some(first) = items.first() else {
        return Err(ConfigError::unsupported("cannot infer a config from an empty sequence"));
    };
    if first.is_object() {
        return items
            .iter()
            .map(Spec::from_json)
            .collect::<Result<Vec<_>>>()
            .map(Spec::Compose);
    }
    if let Some(array) = numeric_array(items) {
        return Ok(Spec::Array(array));
    }
    if items.iter().all(is_scalar) {
        return Ok(Spec::Cells(items.iter().map(json_scalar).collect()));
    }
    Err(ConfigError::InvalidArray(
        "sequence is ragged or mixes scalars with nested arrays".into(),
    ))
}

fn is_scalar(value: &JsonValue) -> bool {
    !value.is_array() && !value.is_object()
}

fn json_scalar(value: &JsonValue) -> CellValue {
    match value {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Number(n) => n
            .as_i64()
            .map(CellValue::Integer)
            .or_else(|| n.as_f64().map(CellValue::Float))
            .unwrap_or(CellValue::Null),
        _ => CellValue::Null,
    }
}

/// A rectangular array of numbers; the shape follows the first element at
/// every depth.
fn numeric_array(items: &[JsonValue]) -> Option<ArrayD<f64>> {
    let mut shape = vec![items.len()];
    let mut probe = items.first();
    while let Some(JsonValue::Array(inner)) = probe {
        shape.push(inner.len());
        probe = inner.first();
    }

    let mut data = Vec::with_capacity(shape.iter().product());
    for item in items {
        collect_numbers(item, &shape[1..], &mut data)?;
    }
    ArrayD::from_shape_vec(IxDyn(&shape), data).ok()
}

fn collect_numbers(value: &JsonValue, shape: &[usize], out: &mut Vec<f64>) -> Option<()> {
    match (value, shape.split_first()) {
        (JsonValue::Number(n), None) => {
            out.push(n.as_f64()?);
            Some(())
        }
        (JsonValue::Array(inner), Some((&len, rest))) if inner.len() == len => {
            for item in inner {
                collect_numbers(item, rest, out)?;
            }
            Some(())
        }
        _ => None,
    }
}
