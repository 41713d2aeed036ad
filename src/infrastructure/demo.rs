use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::domain::incident::{Incident, Severity};
use crate::domain::payment::{AckState, Direction, Hop, PaymentRecord, PaymentType};
use crate::domain::ports::{HealthSource, IncidentSource, RecordSource};
use crate::error::Result;

const CLIENTS: [&str; 5] = ["Acme Corp", "Globex", "Wayne Ent.", "Initech", "Stark Ind."];
const BENEFICIARIES: [&str; 5] = ["Contoso LLC", "Soylent", "Umbrella", "Wonka", "Tyrell"];
const ORIGINATORS: [&str; 5] = ["Acme Treasury", "Payroll", "ERP", "Mobile", "Branch"];
const DIRECTIONS: [Direction; 3] = [Direction::Incoming, Direction::Outgoing, Direction::Internal];
const STATUSES: [&str; 5] = ["Processing", "Completed", "On Hold", "Failed", "Queued"];
const HOP_STATUSES: [&str; 5] = ["Received", "Validated", "Routed", "Booked", "Settled"];

/// Seeded stand-in for the production record feed.
///
/// The same seed yields the same set on every load, so periodic refreshes
/// are stable and tests are reproducible. There is no module-level state;
/// every instance is an explicit construction point.
pub struct DemoRecordSource {
    seed: u64,
    count: usize,
    anchor: DateTime<Utc>,
}

impl DemoRecordSource {
    pub fn new(seed: u64, count: usize, anchor: DateTime<Utc>) -> Self {
        Self {
            seed,
            count,
            anchor,
        }
    }

    fn record(&self, rng: &mut StdRng, i: usize) -> PaymentRecord {
        let retail = rng.gen_bool(0.5);
        let path = [
            "mailbox",
            "phubip",
            if retail { "phubeft" } else { "phublvpe" },
            "phubcps",
        ];
        let created = self.anchor - Duration::hours(rng.gen_range(0..72));

        let mut at = created;
        let mut hops = Vec::with_capacity(path.len());
        for stage in path {
            hops.push(Hop {
                stage: stage.to_string(),
                at,
                status: HOP_STATUSES[rng.gen_range(0..HOP_STATUSES.len())].to_string(),
                note: rng
                    .gen_bool(0.1)
                    .then(|| "Retry due to timeout".to_string()),
            });
            at += Duration::seconds(rng.gen_range(30..120));
        }

        let cents: i64 = rng.gen_range(500_000..=25_500_000);
        let uetr = format!(
            "UETR-{}-{}",
            base36(100_000 + i as u64),
            base36(rng.gen_range(0..1_000_000))
        );

        PaymentRecord {
            id: i as u64 + 1,
            created,
            last_update: at,
            direction: DIRECTIONS[rng.gen_range(0..DIRECTIONS.len())],
            channel: if rng.gen_bool(0.5) { "SWIFT" } else { "ISO 20022" }.to_string(),
            status: STATUSES[rng.gen_range(0..STATUSES.len())].to_string(),
            value: Decimal::new(cents, 2),
            currency: "CAD".to_string(),
            client: CLIENTS[rng.gen_range(0..CLIENTS.len())].to_string(),
            beneficiary: BENEFICIARIES[rng.gen_range(0..BENEFICIARIES.len())].to_string(),
            originator: ORIGINATORS[rng.gen_range(0..ORIGINATORS.len())].to_string(),
            hops,
            payment_type: if rng.gen_bool(0.8) {
                PaymentType::Eft
            } else {
                PaymentType::Wire
            },
            segmentation: if rng.gen_bool(0.4) { "High Value" } else { "Retail" }.to_string(),
            uetr,
            icn: format!("ICN{:09}", rng.gen_range(0..1_000_000_000u64)),
            client_id: format!("SC-{}", 10_000 + i),
            ack_state: if rng.gen_bool(0.85) {
                AckState::Ack
            } else {
                AckState::Nack
            },
            pacs002: if rng.gen_bool(0.8) {
                "pacs.002 received"
            } else {
                "pacs.002 pending"
            }
            .to_string(),
        }
    }
}

#[async_trait]
impl RecordSource for DemoRecordSource {
    async fn load(&self) -> Result<Vec<PaymentRecord>> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut records: Vec<PaymentRecord> = (0..self.count)
            .map(|i| self.record(&mut rng, i))
            .collect();
        for record in &mut records {
            record.normalize_hops();
        }
        Ok(records)
    }
}

fn base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize] as char);
        n /= 36;
    }
    out.iter().rev().collect()
}

/// Fixed health readings keyed by stage id.
#[derive(Debug, Clone)]
pub struct StaticHealthSource {
    readings: HashMap<String, f64>,
    fallback: f64,
}

impl Default for StaticHealthSource {
    fn default() -> Self {
        let readings = [
            ("mailbox", 96.0),
            ("phubip", 94.0),
            ("phubeft", 91.0),
            ("phublvpe", 89.0),
            ("phubcps", 97.0),
        ]
        .into_iter()
        .map(|(id, health)| (id.to_string(), health))
        .collect();
        Self {
            readings,
            fallback: 90.0,
        }
    }
}

impl StaticHealthSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reading(mut self, stage_id: &str, health: f64) -> Self {
        self.readings.insert(stage_id.to_string(), health);
        self
    }
}

impl HealthSource for StaticHealthSource {
    fn health(&self, stage_id: &str) -> f64 {
        self.readings.get(stage_id).copied().unwrap_or(self.fallback)
    }
}

/// The canonical demo incident feed.
pub struct DemoIncidentSource {
    anchor: DateTime<Utc>,
}

impl DemoIncidentSource {
    pub fn new(anchor: DateTime<Utc>) -> Self {
        Self { anchor }
    }
}

#[async_trait]
impl IncidentSource for DemoIncidentSource {
    async fn incidents(&self) -> Result<Vec<Incident>> {
        Ok(vec![
            Incident {
                id: "INC-4310".to_string(),
                severity: Severity::High,
                title: "PHUB LVPE settlement delay".to_string(),
                stage_id: "phublvpe".to_string(),
                opened: self.anchor - Duration::minutes(35),
                status: "Investigating".to_string(),
            },
            Incident {
                id: "INC-4321".to_string(),
                severity: Severity::Medium,
                title: "EFT backlog in PHUB EFT".to_string(),
                stage_id: "phubeft".to_string(),
                opened: self.anchor - Duration::hours(2),
                status: "Mitigated".to_string(),
            },
            Incident {
                id: "AL-7802".to_string(),
                severity: Severity::Low,
                title: "Mailbox ingress latency".to_string(),
                stage_id: "mailbox".to_string(),
                opened: self.anchor - Duration::minutes(20),
                status: "Monitoring".to_string(),
            },
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn anchor() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_same_seed_yields_identical_sets() {
        let source = DemoRecordSource::new(7, 20, anchor());
        let first = source.load().await.unwrap();
        let second = source.load().await.unwrap();
        assert_eq!(first.len(), 20);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_generated_hops_follow_the_pipeline() {
        let source = DemoRecordSource::new(1, 10, anchor());
        for record in source.load().await.unwrap() {
            assert_eq!(record.hops.first().unwrap().stage, "mailbox");
            assert_eq!(record.hops.last().unwrap().stage, "phubcps");
            assert!(record.hops.windows(2).all(|w| w[0].at <= w[1].at));
            assert_eq!(record.currency, "CAD");
        }
    }

    #[test]
    fn test_health_fallback_for_unknown_stage() {
        let health = StaticHealthSource::new();
        assert_eq!(health.health("phubcps"), 97.0);
        assert_eq!(health.health("unknown"), 90.0);
        let overridden = health.with_reading("phubcps", 50.0);
        assert_eq!(overridden.health("phubcps"), 50.0);
    }

    #[test]
    fn test_base36_round_digits() {
        assert_eq!(base36(0), "0");
        assert_eq!(base36(35), "Z");
        assert_eq!(base36(36), "10");
    }
}
