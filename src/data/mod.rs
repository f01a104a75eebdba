//! Raw data ingestion
//!
//! CSV files are read with polars, then converted once into a [`RawTable`]
//! whose columns carry a fixed [`ColumnKind`](crate::preprocessing::ColumnKind)
//! taken from the inferred storage type.

mod loader;
mod table;

pub use loader::{load_csv, load_table};
pub use table::{format_number, ColumnData, RawColumn, RawTable};
