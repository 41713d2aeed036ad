use async_trait::async_trait;

use crate::domain::incident::Incident;
use crate::domain::payment::PaymentRecord;
use crate::error::Result;

/// Produces the full record set on demand.
///
/// Each load replaces the caller's previous snapshot wholesale; there is no
/// incremental update path. Retries and polling against whatever backs the
/// source are the source's own responsibility.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn load(&self) -> Result<Vec<PaymentRecord>>;
}

/// Live availability reading for a pipeline stage, in the range 0-100.
pub trait HealthSource: Send + Sync {
    fn health(&self, stage_id: &str) -> f64;
}

/// Produces the current incident list.
#[async_trait]
pub trait IncidentSource: Send + Sync {
    async fn incidents(&self) -> Result<Vec<Incident>>;
}

pub type RecordSourceBox = Box<dyn RecordSource>;
pub type HealthSourceBox = Box<dyn HealthSource>;
pub type IncidentSourceBox = Box<dyn IncidentSource>;
