//! Dataset configuration inference and identifier alignment.
//!
//! Turns heterogeneous specifications (in-memory images, numeric arrays,
//! glob patterns with an `{id}` token, table columns) into uniform,
//! index-addressable [`Config`]s, and reconciles an input side with a target
//! side on their common ids.
//!
//! ```no_run
//! use std::path::Path;
//! use rusty_cohort::{align, infer, ColumnSpec, PatternSpec};
//!
//! let base = Path::new("/data/ds004711");
//! let x = infer(PatternSpec::new("{id}/anat/*T1w*"), Some(base))?;
//! let y = infer(
//!     ColumnSpec::new("participants.tsv", "age").with_id_column("participant_id"),
//!     Some(base),
//! )?;
//! let (x, y) = align(x, y)?;
//! assert_eq!(x.ids(), y.ids());
//! # Ok::<(), rusty_cohort::ConfigError>(())
//! ```

pub mod config;
pub mod data;
pub mod dataset;
pub mod error;
pub mod spec;

pub use config::{
    align, infer, AlignOrder, Aligner, ArrayConfig, Backends, ColumnConfig, ComposeConfig, Config,
    ImageConfig, InferEngine, PatternConfig,
};
pub use data::model::{CellValue, Image, Value};
pub use dataset::PairedDataset;
pub use error::{ConfigError, Result, Side};
pub use spec::{ColumnSpec, PatternSpec, Spec};
