use async_trait::async_trait;
use std::path::PathBuf;

use crate::domain::payment::PaymentRecord;
use crate::domain::ports::RecordSource;
use crate::error::Result;
use crate::interfaces::json::RecordReader;

/// Record feed backed by a JSON file.
///
/// The file is re-read on every load, so a refresh picks up whatever the
/// file currently holds.
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RecordSource for JsonFileSource {
    async fn load(&self) -> Result<Vec<PaymentRecord>> {
        let bytes = tokio::fs::read(&self.path).await?;
        RecordReader::new(bytes.as_slice()).records()
    }
}
