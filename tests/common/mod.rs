use chrono::{DateTime, Duration, TimeZone, Utc};
use paywatch::domain::payment::{AckState, Direction, Hop, PaymentRecord, PaymentType};
use rust_decimal::Decimal;

pub fn anchor() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

pub fn hop(stage: &str, minutes: i64, status: &str) -> Hop {
    Hop {
        stage: stage.to_string(),
        at: anchor() + Duration::minutes(minutes),
        status: status.to_string(),
        note: None,
    }
}

/// A plain EFT record with a two-hop path; tests override fields as needed.
pub fn record(id: u64) -> PaymentRecord {
    PaymentRecord {
        id,
        created: anchor(),
        last_update: anchor() + Duration::minutes(5),
        direction: Direction::Incoming,
        channel: "SWIFT".to_string(),
        status: "Processing".to_string(),
        value: Decimal::new(10_000, 2),
        currency: "CAD".to_string(),
        client: "Acme Corp".to_string(),
        beneficiary: "Contoso LLC".to_string(),
        originator: "Acme Treasury".to_string(),
        hops: vec![hop("mailbox", 0, "Received"), hop("phubip", 1, "Routed")],
        payment_type: PaymentType::Eft,
        segmentation: "Retail".to_string(),
        uetr: format!("UETR-{id:06}"),
        icn: format!("ICN{id:09}"),
        client_id: format!("SC-{}", 10_000 + id),
        ack_state: AckState::Ack,
        pacs002: "pacs.002 received".to_string(),
    }
}
