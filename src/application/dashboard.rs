use serde::Serialize;
use tracing::info;

use crate::application::aggregate::{self, Kpi};
use crate::application::filter;
use crate::domain::criteria::FilterCriteria;
use crate::domain::incident::Incident;
use crate::domain::payment::PaymentRecord;
use crate::domain::pipeline::{Pipeline, Stage};
use crate::domain::ports::{HealthSourceBox, IncidentSourceBox, RecordSourceBox};
use crate::error::Result;

/// Live health reading for one stage, paired for display.
#[derive(Debug, Serialize, Clone)]
pub struct StageHealth {
    pub stage: Stage,
    pub health: f64,
}

/// Everything the presentation layer needs for one render pass.
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub kpi: Kpi,
    pub rows: Vec<PaymentRecord>,
    pub incidents: Vec<Incident>,
    pub stage_health: Vec<StageHealth>,
}

/// Owns the configured sources and the current record snapshot.
///
/// `refresh` swaps the whole snapshot; `view` is a pure pass over it.
/// Nothing mutates records between refreshes, so any number of views can be
/// taken from one snapshot with identical results.
pub struct DashboardEngine {
    pipeline: Pipeline,
    records: RecordSourceBox,
    health: HealthSourceBox,
    incident_source: IncidentSourceBox,
    snapshot: Vec<PaymentRecord>,
    incidents: Vec<Incident>,
}

impl DashboardEngine {
    pub fn new(
        pipeline: Pipeline,
        records: RecordSourceBox,
        health: HealthSourceBox,
        incidents: IncidentSourceBox,
    ) -> Self {
        Self {
            pipeline,
            records,
            health,
            incident_source: incidents,
            snapshot: Vec::new(),
            incidents: Vec::new(),
        }
    }

    /// Replaces the in-memory record set and incident list wholesale.
    pub async fn refresh(&mut self) -> Result<usize> {
        let records = self.records.load().await?;
        let incidents = self.incident_source.incidents().await?;
        info!(
            records = records.len(),
            incidents = incidents.len(),
            "snapshot refreshed"
        );
        self.snapshot = records;
        self.incidents = incidents;
        Ok(self.snapshot.len())
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn snapshot(&self) -> &[PaymentRecord] {
        &self.snapshot
    }

    /// Filter + aggregate pass over the current snapshot.
    pub fn view(&self, criteria: &FilterCriteria) -> DashboardView {
        let rows = filter::filter(&self.snapshot, criteria);
        let kpi = aggregate::aggregate(&rows, &self.pipeline, self.health.as_ref());
        let stage_health = self
            .pipeline
            .stages()
            .iter()
            .map(|stage| StageHealth {
                stage: stage.clone(),
                health: self.health.health(&stage.id),
            })
            .collect();
        DashboardView {
            kpi,
            rows: rows.into_iter().cloned().collect(),
            incidents: self.incidents.clone(),
            stage_health,
        }
    }
}
