//! Data layer: value types and the collaborators configs are built from.
//!
//! Architecture:
//! ```text
//!  base_dir + pattern          participants.tsv / .csv / .json / .parquet
//!        │                              │
//!        ▼                              ▼
//!   ┌───────────┐  ┌──────────┐   ┌──────────┐
//!   │   glob    │─▶│ template │   │  table   │  rows → columns of CellValue
//!   └───────────┘  └──────────┘   └──────────┘
//!   sorted paths    {id} capture
//!        │
//!        ▼  (on access)
//!   ┌──────────┐   ┌──────────┐
//!   │  fetch   │─▶ │  codec   │  path → Image
//!   └──────────┘   └──────────┘
//! ```

pub mod codec;
pub mod fetch;
pub mod glob;
pub mod model;
pub mod table;
pub mod template;
