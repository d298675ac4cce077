//! I/O module
//!
//! - `csv_format` - Operation, catalog and summary formats
//! - `sync_reader` - Synchronous operation reader with iterator interface
//! - `async_reader` - Asynchronous operation reader with batch interface
//! - `catalog_reader` - Catalog CSV loading

pub mod async_reader;
pub mod catalog_reader;
pub mod csv_format;
pub mod sync_reader;

pub use async_reader::AsyncReader;
pub use catalog_reader::{load_catalog, read_catalog};
pub use csv_format::{
    convert_operation_record, write_summaries_csv, write_summaries_json, CatalogCsvRecord,
    OperationCsvRecord,
};
pub use sync_reader::SyncReader;
