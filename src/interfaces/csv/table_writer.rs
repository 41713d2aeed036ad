use std::io::Write;

use crate::domain::payment::PaymentRecord;
use crate::error::Result;

/// Writes the filtered results table as CSV.
///
/// Only the flat table columns are exported; hop detail stays in the JSON
/// representation.
pub struct TableWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> TableWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_rows(&mut self, rows: &[PaymentRecord]) -> Result<()> {
        self.writer.write_record([
            "id",
            "created",
            "client",
            "beneficiary",
            "direction",
            "value",
            "currency",
            "status",
            "uetr",
            "icn",
        ])?;
        for p in rows {
            self.writer.write_record([
                p.id.to_string(),
                p.created.to_rfc3339(),
                p.client.clone(),
                p.beneficiary.clone(),
                p.direction.to_string(),
                p.value.to_string(),
                p.currency.clone(),
                p.status.clone(),
                p.uetr.clone(),
                p.icn.clone(),
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
