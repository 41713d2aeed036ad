use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::domain::payment::{self, AckState, Direction, Hop, PaymentRecord, PaymentType};
use crate::domain::ports::RecordSource;
use crate::error::{PaywatchError, Result};

/// Server-side handle for a submitted query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryHandle(pub String);

/// Vendor-side state of a submitted query.
#[derive(Debug, Clone)]
pub enum QueryStatus {
    Running,
    Complete(Vec<RawEvent>),
    Failed(String),
}

/// The vendor event-query API: submit a query, then poll it to completion.
#[async_trait]
pub trait EventQueryApi: Send + Sync {
    async fn submit(&self) -> Result<QueryHandle>;
    async fn poll(&self, handle: &QueryHandle) -> Result<QueryStatus>;
}

/// Raw event attributes as the vendor returns them: epoch-millis
/// timestamps, `S_*` state codes, free-text enums. Normalization happens at
/// this boundary; nothing downstream sees this shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    pub id: u64,
    pub created_ms: i64,
    pub updated_ms: i64,
    pub direction: String,
    pub channel: String,
    pub status: String,
    pub value: Decimal,
    pub currency: String,
    pub client: String,
    pub beneficiary: String,
    pub originator: String,
    pub hops: Vec<RawHop>,
    pub payment_type: String,
    pub segmentation: String,
    pub uetr: String,
    pub icn: String,
    pub client_id: String,
    pub ack_state: String,
    pub pacs002: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawHop {
    pub stage: String,
    pub ts_ms: i64,
    pub status: String,
    #[serde(default)]
    pub note: Option<String>,
}

impl RawEvent {
    /// Validates and normalizes one vendor event into the domain shape.
    pub fn into_record(self) -> Result<PaymentRecord> {
        let direction: Direction = self.direction.parse()?;
        let payment_type: PaymentType = self.payment_type.parse()?;
        let ack_state: AckState = self.ack_state.parse()?;
        let created = from_millis(self.created_ms)?;
        let last_update = from_millis(self.updated_ms)?;

        let mut hops = self
            .hops
            .into_iter()
            .map(|h| {
                Ok(Hop {
                    stage: h.stage.trim().to_ascii_lowercase(),
                    at: from_millis(h.ts_ms)?,
                    status: payment::normalize_status(&h.status),
                    note: h.note.filter(|n| !n.is_empty()),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        payment::normalize_hops(&mut hops);

        Ok(PaymentRecord {
            id: self.id,
            created,
            last_update,
            direction,
            channel: self.channel,
            status: payment::normalize_status(&self.status),
            value: self.value,
            currency: self.currency,
            client: self.client,
            beneficiary: self.beneficiary,
            originator: self.originator,
            hops,
            payment_type,
            segmentation: self.segmentation,
            uetr: self.uetr,
            icn: self.icn,
            client_id: self.client_id,
            ack_state,
            pacs002: self.pacs002,
        })
    }
}

fn from_millis(ms: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or_else(|| PaywatchError::Validation(format!("timestamp out of range: {ms}")))
}

/// Poll loop configuration.
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(8),
        }
    }
}

/// Terminal state of one poll run.
#[derive(Debug)]
pub enum PollOutcome {
    Succeeded(Vec<PaymentRecord>),
    Failed(String),
    TimedOut { attempts: u32 },
    Cancelled,
}

/// Bounded, cancellable poll loop over an [`EventQueryApi`].
///
/// Submits one query and polls it with exponential backoff until the vendor
/// reports a terminal state, the attempt limit is exhausted, or the caller
/// cancels. Cancellation is observed at every await point.
pub struct QueryPoller<A> {
    api: A,
    config: PollConfig,
}

impl<A: EventQueryApi> QueryPoller<A> {
    pub fn new(api: A, config: PollConfig) -> Self {
        Self { api, config }
    }

    pub async fn run(&self, mut cancel: oneshot::Receiver<()>) -> PollOutcome {
        let handle = tokio::select! {
            _ = &mut cancel => return PollOutcome::Cancelled,
            submitted = self.api.submit() => match submitted {
                Ok(handle) => handle,
                Err(e) => return PollOutcome::Failed(e.to_string()),
            },
        };

        let mut backoff = self.config.initial_backoff;
        for attempt in 1..=self.config.max_attempts {
            let status = tokio::select! {
                _ = &mut cancel => return PollOutcome::Cancelled,
                polled = self.api.poll(&handle) => match polled {
                    Ok(status) => status,
                    Err(e) => return PollOutcome::Failed(e.to_string()),
                },
            };

            match status {
                QueryStatus::Complete(events) => {
                    return PollOutcome::Succeeded(normalize_events(events));
                }
                QueryStatus::Failed(reason) => return PollOutcome::Failed(reason),
                QueryStatus::Running => {
                    debug!(attempt, backoff_ms = backoff.as_millis() as u64, "query still running");
                    tokio::select! {
                        _ = &mut cancel => return PollOutcome::Cancelled,
                        _ = sleep(backoff) => {}
                    }
                    backoff = (backoff * 2).min(self.config.max_backoff);
                }
            }
        }
        PollOutcome::TimedOut {
            attempts: self.config.max_attempts,
        }
    }
}

fn normalize_events(events: Vec<RawEvent>) -> Vec<PaymentRecord> {
    events
        .into_iter()
        .filter_map(|event| {
            let id = event.id;
            match event.into_record() {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(event = id, error = %e, "dropping malformed event");
                    None
                }
            }
        })
        .collect()
}

/// Adapts the poll loop to the [`RecordSource`] port.
pub struct QueryRecordSource<A> {
    poller: QueryPoller<A>,
}

impl<A: EventQueryApi> QueryRecordSource<A> {
    pub fn new(api: A, config: PollConfig) -> Self {
        Self {
            poller: QueryPoller::new(api, config),
        }
    }
}

#[async_trait]
impl<A: EventQueryApi> RecordSource for QueryRecordSource<A> {
    async fn load(&self) -> Result<Vec<PaymentRecord>> {
        let (_cancel_tx, cancel_rx) = oneshot::channel();
        match self.poller.run(cancel_rx).await {
            PollOutcome::Succeeded(records) => Ok(records),
            PollOutcome::Failed(reason) => Err(PaywatchError::Query(reason)),
            PollOutcome::TimedOut { attempts } => Err(PaywatchError::QueryTimeout { attempts }),
            PollOutcome::Cancelled => Err(PaywatchError::Cancelled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn raw_event(id: u64) -> RawEvent {
        RawEvent {
            id,
            created_ms: 1_748_779_200_000,
            updated_ms: 1_748_779_500_000,
            direction: "Incoming".to_string(),
            channel: "SWIFT".to_string(),
            status: "S_OutTxnComplete".to_string(),
            value: dec!(150.25),
            currency: "CAD".to_string(),
            client: "Acme Corp".to_string(),
            beneficiary: "Contoso LLC".to_string(),
            originator: "Payroll".to_string(),
            hops: vec![
                RawHop {
                    stage: "PHUBIP".to_string(),
                    ts_ms: 1_748_779_260_000,
                    status: "S_WaitHostResponse".to_string(),
                    note: Some(String::new()),
                },
                RawHop {
                    stage: "mailbox".to_string(),
                    ts_ms: 1_748_779_200_000,
                    status: "Received".to_string(),
                    note: None,
                },
            ],
            payment_type: "EFT".to_string(),
            segmentation: "Retail".to_string(),
            uetr: "UETR-1".to_string(),
            icn: "ICN000000001".to_string(),
            client_id: "SC-10001".to_string(),
            ack_state: "ACK".to_string(),
            pacs002: "pacs.002 received".to_string(),
        }
    }

    #[test]
    fn test_raw_event_normalizes_codes_and_hops() {
        let record = raw_event(1).into_record().unwrap();
        assert_eq!(record.status, "Completed");
        assert_eq!(record.direction, Direction::Incoming);
        // Hops come back sorted, stage ids lowercased, empty notes dropped.
        assert_eq!(record.hops[0].stage, "mailbox");
        assert_eq!(record.hops[1].stage, "phubip");
        assert_eq!(record.hops[1].status, "Processing");
        assert_eq!(record.hops[1].note, None);
    }

    #[test]
    fn test_raw_event_rejects_unknown_direction() {
        let mut event = raw_event(1);
        event.direction = "Sideways".to_string();
        assert!(event.into_record().is_err());
    }

    #[test]
    fn test_raw_event_rejects_out_of_range_timestamp() {
        let mut event = raw_event(1);
        event.created_ms = i64::MAX;
        assert!(event.into_record().is_err());
    }

    #[test]
    fn test_malformed_events_are_dropped_not_fatal() {
        let mut bad = raw_event(2);
        bad.ack_state = "MAYBE".to_string();
        let records = normalize_events(vec![raw_event(1), bad]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, 1);
    }
}
