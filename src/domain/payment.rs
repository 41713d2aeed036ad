use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::PaywatchError;

/// Transit direction of a payment relative to the institution.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
pub enum Direction {
    Incoming,
    Outgoing,
    Internal,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Incoming => write!(f, "Incoming"),
            Self::Outgoing => write!(f, "Outgoing"),
            Self::Internal => write!(f, "Internal"),
        }
    }
}

impl FromStr for Direction {
    type Err = PaywatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            d if d.eq_ignore_ascii_case("incoming") => Ok(Self::Incoming),
            d if d.eq_ignore_ascii_case("outgoing") => Ok(Self::Outgoing),
            d if d.eq_ignore_ascii_case("internal") => Ok(Self::Internal),
            other => Err(PaywatchError::Validation(format!(
                "unknown direction: {other}"
            ))),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
pub enum PaymentType {
    #[serde(rename = "EFT")]
    Eft,
    #[serde(rename = "Wire")]
    Wire,
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eft => write!(f, "EFT"),
            Self::Wire => write!(f, "Wire"),
        }
    }
}

impl FromStr for PaymentType {
    type Err = PaywatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            t if t.eq_ignore_ascii_case("eft") => Ok(Self::Eft),
            t if t.eq_ignore_ascii_case("wire") => Ok(Self::Wire),
            other => Err(PaywatchError::Validation(format!(
                "unknown payment type: {other}"
            ))),
        }
    }
}

/// Acknowledgment state of the downstream confirmation message.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
pub enum AckState {
    #[serde(rename = "ACK")]
    Ack,
    #[serde(rename = "NACK")]
    Nack,
}

impl fmt::Display for AckState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ack => write!(f, "ACK"),
            Self::Nack => write!(f, "NACK"),
        }
    }
}

impl FromStr for AckState {
    type Err = PaywatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            a if a.eq_ignore_ascii_case("ack") => Ok(Self::Ack),
            a if a.eq_ignore_ascii_case("nack") => Ok(Self::Nack),
            other => Err(PaywatchError::Validation(format!(
                "unknown ack state: {other}"
            ))),
        }
    }
}

/// One recorded transit of a payment through a pipeline stage.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Hop {
    pub stage: String,
    pub at: DateTime<Utc>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// One payment/message instance as it appears on the dashboard.
///
/// Records are produced wholesale by a [`RecordSource`](crate::domain::ports::RecordSource)
/// on load and on each refresh; nothing mutates them in between.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub id: u64,
    pub created: DateTime<Utc>,
    pub last_update: DateTime<Utc>,
    pub direction: Direction,
    pub channel: String,
    /// Normalized display label, not the raw vendor code.
    pub status: String,
    pub value: Decimal,
    pub currency: String,
    pub client: String,
    pub beneficiary: String,
    pub originator: String,
    pub hops: Vec<Hop>,
    pub payment_type: PaymentType,
    pub segmentation: String,
    pub uetr: String,
    pub icn: String,
    pub client_id: String,
    pub ack_state: AckState,
    pub pacs002: String,
}

impl PaymentRecord {
    /// The fields the free-text query is matched against, joined with `|`.
    pub fn search_haystack(&self) -> String {
        [
            self.client.as_str(),
            self.uetr.as_str(),
            self.icn.as_str(),
            self.client_id.as_str(),
        ]
        .join("|")
    }

    /// Restores the hop invariant on this record. Sources must call this
    /// once at ingestion.
    pub fn normalize_hops(&mut self) {
        normalize_hops(&mut self.hops);
    }
}

/// Sorts hops ascending by timestamp (stable) and drops duplicates with the
/// same stage id and timestamp, keeping the first occurrence.
pub fn normalize_hops(hops: &mut Vec<Hop>) {
    hops.sort_by_key(|h| h.at);
    let mut seen = HashSet::new();
    hops.retain(|h| seen.insert((h.stage.clone(), h.at)));
}

/// Maps vendor state codes to the labels shown on the dashboard. Unknown
/// codes pass through trimmed and unchanged.
pub fn normalize_status(raw: &str) -> String {
    match raw.trim() {
        "S_OutTxnComplete" => "Completed",
        "S_WaitHostResponse" => "Processing",
        "S_InTxnHostAccepted" => "Host Accepted",
        "S_AwaitingPosting/DistributionResponse" => "Awaiting Posting/Distribution",
        "S_WaitingLVPEResponse" => "Waiting LVPE Response",
        "S_WaitingPrefundHoldResponse" => "Waiting Hold Response",
        other => other,
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, minute, 0).unwrap()
    }

    fn hop(stage: &str, minute: u32) -> Hop {
        Hop {
            stage: stage.to_string(),
            at: at(minute),
            status: "Routed".to_string(),
            note: None,
        }
    }

    #[test]
    fn test_normalize_hops_sorts_by_timestamp() {
        let mut hops = vec![hop("phubcps", 9), hop("mailbox", 0), hop("phubip", 3)];
        normalize_hops(&mut hops);
        let stages: Vec<&str> = hops.iter().map(|h| h.stage.as_str()).collect();
        assert_eq!(stages, vec!["mailbox", "phubip", "phubcps"]);
    }

    #[test]
    fn test_normalize_hops_drops_duplicates_keeping_first() {
        let mut first = hop("mailbox", 0);
        first.note = Some("original".to_string());
        let mut dup = hop("mailbox", 0);
        dup.note = Some("duplicate".to_string());
        // Same timestamp on a different stage sits between the duplicates.
        let mut hops = vec![first, hop("phubip", 0), dup, hop("phubcps", 5)];
        normalize_hops(&mut hops);
        assert_eq!(hops.len(), 3);
        assert_eq!(hops[0].note.as_deref(), Some("original"));
    }

    #[test]
    fn test_normalize_status_maps_vendor_codes() {
        assert_eq!(normalize_status("S_OutTxnComplete"), "Completed");
        assert_eq!(normalize_status(" S_WaitHostResponse "), "Processing");
        assert_eq!(
            normalize_status("S_AwaitingPosting/DistributionResponse"),
            "Awaiting Posting/Distribution"
        );
        assert_eq!(normalize_status("On Hold"), "On Hold");
    }

    #[test]
    fn test_record_deserializes_from_camel_case() {
        let json = r#"{
            "id": 7,
            "created": "2025-06-01T12:00:00Z",
            "lastUpdate": "2025-06-01T12:05:00Z",
            "direction": "Incoming",
            "channel": "SWIFT",
            "status": "Completed",
            "value": 100.50,
            "currency": "CAD",
            "client": "Acme Corp",
            "beneficiary": "Contoso LLC",
            "originator": "Payroll",
            "hops": [{"stage": "mailbox", "at": "2025-06-01T12:00:00Z", "status": "Received"}],
            "paymentType": "EFT",
            "segmentation": "Retail",
            "uetr": "UETR-001",
            "icn": "ICN000000001",
            "clientId": "SC-10007",
            "ackState": "ACK",
            "pacs002": "pacs.002 received"
        }"#;
        let record: PaymentRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.direction, Direction::Incoming);
        assert_eq!(record.payment_type, PaymentType::Eft);
        assert_eq!(record.ack_state, AckState::Ack);
        assert_eq!(record.hops[0].note, None);
    }

    #[test]
    fn test_search_haystack_joins_identifier_fields() {
        let json = r#"{
            "id": 1, "created": "2025-06-01T12:00:00Z", "lastUpdate": "2025-06-01T12:05:00Z",
            "direction": "Internal", "channel": "ISO 20022", "status": "Queued",
            "value": 1, "currency": "CAD", "client": "Globex", "beneficiary": "Wonka",
            "originator": "ERP", "hops": [], "paymentType": "Wire", "segmentation": "Retail",
            "uetr": "UETR-XYZ", "icn": "ICN123", "clientId": "SC-10001",
            "ackState": "NACK", "pacs002": "pacs.002 pending"
        }"#;
        let record: PaymentRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.search_haystack(), "Globex|UETR-XYZ|ICN123|SC-10001");
    }

    #[test]
    fn test_enum_parsing_rejects_unknown_values() {
        assert!("sideways".parse::<Direction>().is_err());
        assert!("cheque".parse::<PaymentType>().is_err());
        assert!("MAYBE".parse::<AckState>().is_err());
        assert_eq!("Wire".parse::<PaymentType>().unwrap(), PaymentType::Wire);
        assert_eq!("nack".parse::<AckState>().unwrap(), AckState::Nack);
    }
}
