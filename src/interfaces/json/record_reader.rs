use std::io::Read;

use crate::domain::payment::PaymentRecord;
use crate::error::Result;

/// Reads a JSON array of payment records from any `Read` source.
///
/// Hops are re-normalized after decoding, so the ordering invariant holds
/// no matter how the file was produced.
pub struct RecordReader<R: Read> {
    source: R,
}

impl<R: Read> RecordReader<R> {
    pub fn new(source: R) -> Self {
        Self { source }
    }

    pub fn records(self) -> Result<Vec<PaymentRecord>> {
        let mut records: Vec<PaymentRecord> = serde_json::from_reader(self.source)?;
        for record in &mut records {
            record.normalize_hops();
        }
        Ok(records)
    }
}
