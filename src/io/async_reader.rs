//! Asynchronous operation reader with batch interface
//!
//! ```text
//! AsyncRead -> csv-async deserializer -> read_batch(n) -> Vec<OperationRecord>
//!                                              |
//!                                     csv_format conversion
//! ```
//!
//! Malformed rows are logged and skipped; a batch only ever holds valid
//! operations.

use crate::io::csv_format::{convert_operation_record, OperationCsvRecord};
use crate::types::OperationRecord;
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;
use tracing::warn;

pub struct AsyncReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncDeserializer<R>,
    line_num: u64,
    skipped: usize,
}

impl<R: AsyncRead + Unpin + Send + 'static> AsyncReader<R> {
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self {
            csv_reader,
            line_num: 1,
            skipped: 0,
        }
    }

    /// Number of rows skipped so far because they did not parse
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Read up to `batch_size` valid operations
    ///
    /// Returns an empty vector once the input is exhausted.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<OperationRecord> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut records = self.csv_reader.deserialize::<OperationCsvRecord>();

        while batch.len() < batch_size {
            let Some(next) = records.next().await else {
                break;
            };
            self.line_num += 1;

            match next.map_err(|e| e.to_string()).and_then(convert_operation_record) {
                Ok(operation) => batch.push(operation),
                Err(message) => {
                    self.skipped += 1;
                    warn!(line = self.line_num, error = %message, "skipping malformed operation");
                }
            }
        }

        batch
    }
}
