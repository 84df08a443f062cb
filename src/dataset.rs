use std::path::{Path, PathBuf};

use crate::config::{Aligner, Config, InferEngine};
use crate::data::model::Value;
use crate::error::{ConfigError, Result};
use crate::spec::Spec;

// ---------------------------------------------------------------------------
// PairedDataset – an input side and a target side, aligned by id
// ---------------------------------------------------------------------------

/// Inputs and targets built from two specs and paired sample by sample.
#[derive(Debug, Clone)]
pub struct PairedDataset {
    base_dir: PathBuf,
    x: Config,
    y: Config,
}

impl PairedDataset {
    /// Build with the default engine and order-preserving alignment.
    pub fn new(base_dir: &Path, x: Spec, y: Spec) -> Result<Self> {
        Self::build(&InferEngine::default(), &Aligner::default(), base_dir, x, y)
    }

    /// Infer both sides, then align them when either carries ids.
    ///
    /// When neither side has ids the configs are paired by position, which
    /// requires equal lengths.
    pub fn build(
        engine: &InferEngine,
        aligner: &Aligner,
        base_dir: &Path,
        x: Spec,
        y: Spec,
    ) -> Result<Self> {
        let mut x = engine.infer(x, Some(base_dir))?;
        let mut y = engine.infer(y, Some(base_dir))?;

        if x.ids().is_some() || y.ids().is_some() || x.len() != y.len() {
            aligner.align_in_place(&mut x, &mut y)?;
        } else {
            log::debug!(
                "pairing {} {} values with {} values by position",
                x.len(),
                x.kind(),
                y.kind()
            );
        }

        Ok(PairedDataset {
            base_dir: base_dir.to_path_buf(),
            x,
            y,
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn x(&self) -> &Config {
        &self.x
    }

    pub fn y(&self) -> &Config {
        &self.y
    }

    /// Shared ids, when the dataset was aligned.
    pub fn ids(&self) -> Option<&[String]> {
        self.x.ids()
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Materialise sample `index` from both sides.
    pub fn get(&self, index: usize) -> Result<(Value, Value)> {
        if index >= self.len() {
            return Err(ConfigError::IndexOutOfBounds {
                index,
                len: self.len(),
            });
        }
        Ok((self.x.get(index)?, self.y.get(index)?))
    }

    /// Fetch every lazily held file on both sides up front.
    pub fn ensure_local(&self) -> Result<()> {
        for config in [&self.x, &self.y] {
            ensure_config_local(config)?;
        }
        Ok(())
    }
}

fn ensure_config_local(config: &Config) -> Result<()> {
    match config {
        Config::Pattern(p) => p.ensure_local_all(),
        Config::Compose(c) => c.sub_configs().iter().try_for_each(ensure_config_local),
        Config::Image(_) | Config::Array(_) | Config::Column(_) => Ok(()),
    }
}
