use std::path::Path;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use super::{
    ArrayConfig, Backends, ColumnConfig, ComposeConfig, Config, ImageConfig, PatternConfig,
};
use crate::data::codec::ImageCodec;
use crate::data::fetch::ContentFetcher;
use crate::error::Result;
use crate::spec::Spec;

/// Builds the concrete config matching a specification.
#[derive(Debug, Clone, Default)]
pub struct InferEngine {
    backends: Backends,
}

impl InferEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Codec used by pattern configs built from now on.
    pub fn with_codec(mut self, codec: Arc<dyn ImageCodec>) -> Self {
        self.backends.codec = codec;
        self
    }

    /// Fetcher used by lazy pattern configs built from now on.
    pub fn with_fetcher(mut self, fetcher: Arc<dyn ContentFetcher>) -> Self {
        self.backends.fetcher = fetcher;
        self
    }

    /// Build a config from `spec`.
    ///
    /// Pattern and column specs resolve relative to their own `base_dir`
    /// when set, else `base_dir`, else the current directory.
    pub fn infer(&self, spec: Spec, base_dir: Option<&Path>) -> Result<Config> {
        let config: Config = match spec {
            Spec::Images(images) => ImageConfig::new(images).into(),
            Spec::Array(array) => ArrayConfig::new(array)?.into(),
            Spec::Cells(cells) => ArrayConfig::from_cells(cells).into(),
            Spec::Pattern(pattern) => {
                let dir = pattern
                    .base_dir
                    .as_deref()
                    .or(base_dir)
                    .unwrap_or(Path::new("."));
                PatternConfig::new(dir, &pattern)?
                    .with_backends(self.backends.clone())
                    .into()
            }
            Spec::Column(column) => {
                let dir = column
                    .base_dir
                    .as_deref()
                    .or(base_dir)
                    .unwrap_or(Path::new("."));
                ColumnConfig::new(dir, &column)?.into()
            }
            Spec::Compose(specs) => {
                let configs = specs
                    .into_iter()
                    .map(|s| self.infer(s, base_dir))
                    .collect::<Result<Vec<_>>>()?;
                ComposeConfig::new(configs)?.into()
            }
        };
        Ok(config)
    }

    /// Classify a JSON specification, then build it.
    pub fn infer_json(&self, spec: &JsonValue, base_dir: Option<&Path>) -> Result<Config> {
        self.infer(Spec::from_json(spec)?, base_dir)
    }
}

/// Build a config with the default codec and fetcher.
pub fn infer(spec: impl Into<Spec>, base_dir: Option<&Path>) -> Result<Config> {
    InferEngine::default().infer(spec.into(), base_dir)
}
