use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::payment::{AckState, PaymentRecord};
use crate::domain::pipeline::Pipeline;
use crate::domain::ports::HealthSource;

/// Volume of filtered records that touched one stage.
#[derive(Debug, Serialize, PartialEq, Eq, Clone)]
pub struct StageVolume {
    pub stage: String,
    pub count: usize,
}

/// One slice of the status-mix chart.
#[derive(Debug, Serialize, PartialEq, Eq, Clone)]
pub struct StatusSlice {
    pub status: String,
    pub count: usize,
}

/// Derived view model behind the KPI tiles and charts.
#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Kpi {
    pub total: usize,
    pub total_value: Decimal,
    pub completed: usize,
    pub failed: usize,
    pub processing: usize,
    pub ack: usize,
    pub nack: usize,
    pub pacs_ok: usize,
    pub stage_volume: Vec<StageVolume>,
    pub status_mix: Vec<StatusSlice>,
    pub health_overall: f64,
}

/// Computes every dashboard statistic for an already-filtered set.
///
/// Pure and recomputed in full on each call. `health_overall` reads live
/// stage health from the collaborator and does not depend on the records.
pub fn aggregate(
    records: &[&PaymentRecord],
    pipeline: &Pipeline,
    health: &dyn HealthSource,
) -> Kpi {
    let total = records.len();
    let total_value: Decimal = records.iter().map(|p| p.value).sum();
    let completed = records.iter().filter(|p| p.status == "Completed").count();
    let failed = records.iter().filter(|p| p.status == "Failed").count();
    let processing = records
        .iter()
        .filter(|p| p.status == "Processing" || p.status == "Queued")
        .count();
    let ack = records
        .iter()
        .filter(|p| p.ack_state == AckState::Ack)
        .count();
    let nack = records
        .iter()
        .filter(|p| p.ack_state == AckState::Nack)
        .count();
    let pacs_ok = records
        .iter()
        .filter(|p| p.pacs002.contains("received"))
        .count();

    let stage_volume = pipeline
        .stages()
        .iter()
        .map(|stage| StageVolume {
            stage: stage.name.clone(),
            count: records
                .iter()
                .filter(|p| p.hops.iter().any(|h| h.stage == stage.id))
                .count(),
        })
        .collect();

    Kpi {
        total,
        total_value,
        completed,
        failed,
        processing,
        ack,
        nack,
        pacs_ok,
        stage_volume,
        status_mix: status_mix(records),
        health_overall: overall_health(pipeline, health),
    }
}

/// Status counts grouped by raw label, in first-occurrence order. Consumers
/// must not rely on any ordering beyond that.
fn status_mix(records: &[&PaymentRecord]) -> Vec<StatusSlice> {
    let mut slices: Vec<StatusSlice> = Vec::new();
    for p in records {
        match slices.iter_mut().find(|s| s.status == p.status) {
            Some(slice) => slice.count += 1,
            None => slices.push(StatusSlice {
                status: p.status.clone(),
                count: 1,
            }),
        }
    }
    slices
}

/// Mean of the configured stages' health readings, rounded to one decimal.
fn overall_health(pipeline: &Pipeline, health: &dyn HealthSource) -> f64 {
    let stages = pipeline.stages();
    if stages.is_empty() {
        return 0.0;
    }
    let sum: f64 = stages.iter().map(|s| health.health(&s.id)).sum();
    ((sum / stages.len() as f64) * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::{Direction, Hop, PaymentType};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    struct FixedHealth(f64);

    impl HealthSource for FixedHealth {
        fn health(&self, _stage_id: &str) -> f64 {
            self.0
        }
    }

    fn record(id: u64, status: &str) -> PaymentRecord {
        let at = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        PaymentRecord {
            id,
            created: at,
            last_update: at,
            direction: Direction::Incoming,
            channel: "SWIFT".to_string(),
            status: status.to_string(),
            value: dec!(10),
            currency: "CAD".to_string(),
            client: "Acme Corp".to_string(),
            beneficiary: "Contoso LLC".to_string(),
            originator: "Payroll".to_string(),
            hops: vec![Hop {
                stage: "mailbox".to_string(),
                at,
                status: "Received".to_string(),
                note: None,
            }],
            payment_type: PaymentType::Eft,
            segmentation: "Retail".to_string(),
            uetr: format!("UETR-{id}"),
            icn: format!("ICN{id:09}"),
            client_id: format!("SC-{id}"),
            ack_state: AckState::Ack,
            pacs002: "pacs.002 received".to_string(),
        }
    }

    #[test]
    fn test_status_mix_keeps_first_occurrence_order() {
        let a = record(1, "Queued");
        let b = record(2, "Completed");
        let c = record(3, "Queued");
        let refs = vec![&a, &b, &c];
        let mix = status_mix(&refs);
        assert_eq!(
            mix,
            vec![
                StatusSlice {
                    status: "Queued".to_string(),
                    count: 2
                },
                StatusSlice {
                    status: "Completed".to_string(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn test_overall_health_rounds_to_one_decimal() {
        let pipeline = Pipeline::standard();
        // 92.46 rounds up to 92.5 at one decimal.
        let kpi = aggregate(&[], &pipeline, &FixedHealth(92.46));
        assert_eq!(kpi.health_overall, 92.5);
    }

    #[test]
    fn test_empty_set_aggregates_to_zeroes() {
        let pipeline = Pipeline::standard();
        let kpi = aggregate(&[], &pipeline, &FixedHealth(90.0));
        assert_eq!(kpi.total, 0);
        assert_eq!(kpi.total_value, Decimal::ZERO);
        assert!(kpi.status_mix.is_empty());
        assert_eq!(kpi.stage_volume.len(), 5);
        assert!(kpi.stage_volume.iter().all(|v| v.count == 0));
        assert_eq!(kpi.health_overall, 90.0);
    }
}
