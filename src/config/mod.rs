//! Configs: index-addressable value sequences with optional identifiers.
//!
//! ```text
//!   Spec ──▶ InferEngine ──▶ Config ──┐
//!                                     ├──▶ Aligner ──▶ (Config, Config)
//!   Spec ──▶ InferEngine ──▶ Config ──┘
//! ```
//!
//! Every config keeps `values` and, when present, `ids` of equal length with
//! `ids[i]` naming `values[i]`. After construction the only mutation is the
//! in-place filtering done by [`Aligner`].

mod align;
mod array;
mod column;
mod compose;
mod image;
mod infer;
mod pattern;

use std::ops::Range;
use std::sync::Arc;

pub use self::align::{align, AlignOrder, Aligner};
pub use self::array::ArrayConfig;
pub use self::column::ColumnConfig;
pub use self::compose::ComposeConfig;
pub use self::image::ImageConfig;
pub use self::infer::{infer, InferEngine};
pub use self::pattern::PatternConfig;

use crate::data::codec::{ImageCodec, RasterCodec};
use crate::data::fetch::{ContentFetcher, LocalContent};
use crate::data::model::Value;
use crate::error::{ConfigError, Result};

// ---------------------------------------------------------------------------
// Backends – collaborators used when values are materialised
// ---------------------------------------------------------------------------

/// The image codec and content fetcher a config materialises values with.
#[derive(Debug, Clone)]
pub struct Backends {
    pub codec: Arc<dyn ImageCodec>,
    pub fetcher: Arc<dyn ContentFetcher>,
}

impl Default for Backends {
    fn default() -> Self {
        Backends {
            codec: Arc::new(RasterCodec),
            fetcher: Arc::new(LocalContent),
        }
    }
}

// ---------------------------------------------------------------------------
// Config – the tagged union of concrete configs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Config {
    Image(ImageConfig),
    Array(ArrayConfig),
    Pattern(PatternConfig),
    Column(ColumnConfig),
    Compose(ComposeConfig),
}

impl Config {
    /// Short name of the concrete variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Config::Image(_) => "image",
            Config::Array(_) => "array",
            Config::Pattern(_) => "pattern",
            Config::Column(_) => "column",
            Config::Compose(_) => "compose",
        }
    }

    /// The stored value handles, without materialisation.
    pub fn values(&self) -> &[Value] {
        match self {
            Config::Image(c) => &c.values,
            Config::Array(c) => &c.values,
            Config::Pattern(c) => &c.values,
            Config::Column(c) => &c.values,
            Config::Compose(c) => &c.values,
        }
    }

    pub fn ids(&self) -> Option<&[String]> {
        let ids = match self {
            Config::Image(c) => &c.ids,
            Config::Array(c) => &c.ids,
            Config::Pattern(c) => &c.ids,
            Config::Column(c) => &c.ids,
            Config::Compose(c) => &c.ids,
        };
        ids.as_deref()
    }

    pub fn len(&self) -> usize {
        self.values().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values().is_empty()
    }

    /// Materialise the value at `index`.
    ///
    /// Pattern values are fetched (when lazy) and decoded on every call;
    /// nothing is cached.
    pub fn get(&self, index: usize) -> Result<Value> {
        let value = self.values().get(index).ok_or(ConfigError::IndexOutOfBounds {
            index,
            len: self.len(),
        })?;
        self.materialize(value)
    }

    /// Materialise a contiguous range of values.
    pub fn slice(&self, range: Range<usize>) -> Result<Vec<Value>> {
        if range.start > range.end || range.end > self.len() {
            return Err(ConfigError::IndexOutOfBounds {
                index: range.end,
                len: self.len(),
            });
        }
        self.values()[range]
            .iter()
            .map(|v| self.materialize(v))
            .collect()
    }

    /// Turn a stored handle of this config into a usable value.
    pub(crate) fn materialize(&self, value: &Value) -> Result<Value> {
        match self {
            Config::Pattern(c) => c.materialize(value),
            Config::Compose(c) => c.materialize(value),
            Config::Image(_) | Config::Array(_) | Config::Column(_) => Ok(value.clone()),
        }
    }

    pub(crate) fn records_mut(&mut self) -> (&mut Vec<Value>, &mut Option<Vec<String>>) {
        match self {
            Config::Image(c) => (&mut c.values, &mut c.ids),
            Config::Array(c) => (&mut c.values, &mut c.ids),
            Config::Pattern(c) => (&mut c.values, &mut c.ids),
            Config::Column(c) => (&mut c.values, &mut c.ids),
            Config::Compose(c) => (&mut c.values, &mut c.ids),
        }
    }

    /// Guidance shown when this config is asked for ids it does not have.
    pub(crate) fn missing_ids_hint(&self) -> String {
        match self {
            Config::Pattern(_) => "Specify `{id}` somewhere in the pattern.".to_string(),
            Config::Column(_) => "Specify \"id\": \"COL_NAME\" in the file dict.".to_string(),
            Config::Compose(c) => match c.sub_configs().first() {
                Some(first) => first.missing_ids_hint(),
                None => "Composed configs take their ids from the first config.".to_string(),
            },
            Config::Image(_) | Config::Array(_) => format!(
                "{} configs carry no ids; use a pattern or file spec with ids instead.",
                self.kind()
            ),
        }
    }
}

impl From<ImageConfig> for Config {
    fn from(c: ImageConfig) -> Self {
        Config::Image(c)
    }
}

impl From<ArrayConfig> for Config {
    fn from(c: ArrayConfig) -> Self {
        Config::Array(c)
    }
}

impl From<PatternConfig> for Config {
    fn from(c: PatternConfig) -> Self {
        Config::Pattern(c)
    }
}

impl From<ColumnConfig> for Config {
    fn from(c: ColumnConfig) -> Self {
        Config::Column(c)
    }
}

impl From<ComposeConfig> for Config {
    fn from(c: ComposeConfig) -> Self {
        Config::Compose(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    fn cells(n: i64) -> Config {
        ArrayConfig::from_cells((0..n).map(CellValue::Integer).collect()).into()
    }

    #[test]
    fn get_out_of_bounds() {
        let config = cells(3);
        assert!(matches!(
            config.get(3),
            Err(ConfigError::IndexOutOfBounds { index: 3, len: 3 })
        ));
    }

    #[test]
    fn slice_materialises_range() {
        let config = cells(5);
        let values = config.slice(1..3).unwrap();
        assert_eq!(
            values,
            [
                Value::Cell(CellValue::Integer(1)),
                Value::Cell(CellValue::Integer(2))
            ]
        );
        assert!(config.slice(4..6).is_err());
        assert!(config.slice(2..2).unwrap().is_empty());
    }

    #[test]
    fn hints_are_variant_specific() {
        assert!(cells(1).missing_ids_hint().starts_with("array configs"));
    }
}
