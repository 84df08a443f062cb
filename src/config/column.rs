use std::path::{Path, PathBuf};

use crate::data::model::Value;
use crate::data::table::read_table;
use crate::error::{ConfigError, Result};
use crate::spec::ColumnSpec;

/// One column of a table, optionally paired with an id column.
#[derive(Debug, Clone)]
pub struct ColumnConfig {
    file: PathBuf,
    column: String,
    id_column: Option<String>,
    pub(crate) values: Vec<Value>,
    pub(crate) ids: Option<Vec<String>>,
}

impl ColumnConfig {
    pub fn new(base_dir: &Path, spec: &ColumnSpec) -> Result<Self> {
        let file = base_dir.join(&spec.file);
        if !file.exists() {
            return Err(ConfigError::FileNotFound { path: file });
        }

        let table = read_table(&file)?;
        let values = table
            .column(&spec.column)?
            .iter()
            .cloned()
            .map(Value::Cell)
            .collect();
        let ids = spec
            .id_column
            .as_deref()
            .map(|id| -> Result<Vec<String>> {
                Ok(table.column_text(id)?.to_vec())
            })
            .transpose()?;

        Ok(ColumnConfig {
            file,
            column: spec.column.clone(),
            id_column: spec.id_column.clone(),
            values,
            ids,
        })
    }

    /// The resolved table path.
    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn id_column(&self) -> Option<&str> {
        self.id_column.as_deref()
    }
}
