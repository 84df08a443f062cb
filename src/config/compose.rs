use super::Config;
use crate::data::model::Value;
use crate::error::{ConfigError, Result};

/// Position-wise tuples across several configs.
///
/// Ids come from the first sub-config only. Sibling ids are compared and a
/// disagreement is logged, but nothing is reconciled.
#[derive(Debug, Clone)]
pub struct ComposeConfig {
    sub_configs: Vec<Config>,
    pub(crate) values: Vec<Value>,
    pub(crate) ids: Option<Vec<String>>,
}

impl ComposeConfig {
    pub fn new(configs: Vec<Config>) -> Result<Self> {
        let Some(first) = configs.first() else {
            return Err(ConfigError::unsupported("cannot compose an empty list of configs"));
        };
        let expected = first.len();
        for (index, config) in configs.iter().enumerate().skip(1) {
            if config.len() != expected {
                return Err(ConfigError::ComposeLengthMismatch {
                    index,
                    expected,
                    found: config.len(),
                });
            }
        }

        let ids = first.ids().map(<[String]>::to_vec);
        for (index, config) in configs.iter().enumerate().skip(1) {
            if let (Some(ours), Some(theirs)) = (ids.as_deref(), config.ids()) {
                if ours != theirs {
                    log::warn!(
                        "composed config {index} ({}) has ids that differ from config 0; \
                         using the ids of config 0",
                        config.kind()
                    );
                }
            }
        }

        let values = (0..expected)
            .map(|i| Value::Tuple(configs.iter().map(|c| c.values()[i].clone()).collect()))
            .collect();

        Ok(ComposeConfig {
            sub_configs: configs,
            values,
            ids,
        })
    }

    pub fn sub_configs(&self) -> &[Config] {
        &self.sub_configs
    }

    /// Each tuple element is materialised by the sub-config it came from, so
    /// filtering `values` during alignment keeps access consistent.
    pub(crate) fn materialize(&self, value: &Value) -> Result<Value> {
        let Value::Tuple(items) = value else {
            return Ok(value.clone());
        };
        items
            .iter()
            .zip(&self.sub_configs)
            .map(|(item, config)| config.materialize(item))
            .collect::<Result<Vec<_>>>()
            .map(Value::Tuple)
    }
}
