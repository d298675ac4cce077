//! Synchronous operation reader with iterator interface
//!
//! Streams `OperationRecord`s from a CSV file one row at a time. Conversion
//! is delegated to `csv_format`; rows that fail to parse or convert are
//! yielded as `CoinError::ParseError` carrying their line number, and
//! iteration continues with the next row.
//!
//! ```no_run
//! use coin_ledger::io::sync_reader::SyncReader;
//! use std::path::Path;
//!
//! let reader = SyncReader::new(Path::new("operations.csv")).unwrap();
//! let valid = reader.filter_map(Result::ok).count();
//! println!("{} operations", valid);
//! ```

use crate::io::csv_format::{convert_operation_record, OperationCsvRecord};
use crate::types::{CoinError, OperationRecord};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::path::Path;

#[derive(Debug)]
pub struct SyncReader {
    reader: csv::Reader<File>,
    line_num: u64,
}

impl SyncReader {
    /// Open `path` for streaming
    ///
    /// Fields are trimmed and rows may omit trailing empty columns.
    pub fn new(path: &Path) -> Result<Self, String> {
        let file = File::open(path)
            .map_err(|e| format!("Failed to open file '{}': {}", path.display(), e))?;

        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(file);

        // Header is line 1
        Ok(Self {
            reader,
            line_num: 1,
        })
    }
}

impl Iterator for SyncReader {
    type Item = Result<OperationRecord, CoinError>;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.reader.deserialize::<OperationCsvRecord>().next()?;
        self.line_num += 1;

        Some(match next {
            Ok(csv_record) => {
                convert_operation_record(csv_record).map_err(|message| CoinError::ParseError {
                    line: Some(self.line_num),
                    message,
                })
            }
            Err(e) => Err(CoinError::from(e)),
        })
    }
}
