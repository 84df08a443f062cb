use std::path::{Path, PathBuf};

use super::Backends;
use crate::data::glob::{GlobPattern, PathFilter};
use crate::data::model::Value;
use crate::data::template::{IdTemplate, ID_TOKEN};
use crate::error::{ConfigError, Result};
use crate::spec::PatternSpec;

/// Files under a base directory matching a glob, optionally with ids taken
/// from an `{id}` token in the pattern.
///
/// Paths are sorted lexicographically at construction; ids are extracted in
/// that same order, so `ids[i]` always names `values[i]`.
#[derive(Debug, Clone)]
pub struct PatternConfig {
    base_dir: PathBuf,
    pattern: String,
    exclude: Option<String>,
    lazy: bool,
    backends: Backends,
    pub(crate) values: Vec<Value>,
    pub(crate) ids: Option<Vec<String>>,
}

impl PatternConfig {
    pub fn new(base_dir: &Path, spec: &PatternSpec) -> Result<Self> {
        let glob_pattern = spec.pattern.replace(ID_TOKEN, "*");
        let display_pattern = base_dir.join(&glob_pattern).display().to_string();

        let mut relative = GlobPattern::new(&glob_pattern)?.resolve(base_dir);
        if let Some(exclude) = &spec.exclude {
            let filter = PathFilter::new(exclude)?;
            relative.retain(|rel| !filter.matches(rel));
        }
        if relative.is_empty() {
            return Err(ConfigError::NoFilesFound {
                pattern: display_pattern,
            });
        }

        let ids = if IdTemplate::has_token(&spec.pattern) {
            let template = IdTemplate::new(&spec.pattern)?;
            let ids = relative
                .iter()
                .map(|rel| {
                    template.extract(rel).ok_or_else(|| {
                        ConfigError::invalid_pattern(
                            &spec.pattern,
                            format!("could not extract {ID_TOKEN} from '{rel}'"),
                        )
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            Some(ids)
        } else {
            None
        };

        log::debug!(
            "pattern {display_pattern} matched {} path(s){}",
            relative.len(),
            if ids.is_some() { " with ids" } else { "" }
        );

        Ok(PatternConfig {
            base_dir: base_dir.to_path_buf(),
            pattern: display_pattern,
            exclude: spec.exclude.clone(),
            lazy: spec.lazy,
            backends: Backends::default(),
            values: relative
                .iter()
                .map(|rel| Value::Path(base_dir.join(rel)))
                .collect(),
            ids,
        })
    }

    /// Replace the codec and fetcher used when values are accessed.
    pub fn with_backends(mut self, backends: Backends) -> Self {
        self.backends = backends;
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// The resolved glob, joined to the base directory.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn exclude(&self) -> Option<&str> {
        self.exclude.as_deref()
    }

    pub fn is_lazy(&self) -> bool {
        self.lazy
    }

    /// Every path currently held, in value order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.values.iter().filter_map(Value::as_path)
    }

    /// Fetch every held path in a single call. A no-op for eager configs.
    pub fn ensure_local_all(&self) -> Result<()> {
        if !self.lazy {
            return Ok(());
        }
        let paths: Vec<PathBuf> = self.paths().map(Path::to_path_buf).collect();
        self.backends.fetcher.ensure_local(&self.base_dir, &paths)
    }

    pub(crate) fn materialize(&self, value: &Value) -> Result<Value> {
        let Value::Path(path) = value else {
            return Ok(value.clone());
        };
        if self.lazy {
            self.backends
                .fetcher
                .ensure_local(&self.base_dir, std::slice::from_ref(path))?;
        }
        self.backends.codec.decode(path).map(Value::image)
    }
}
