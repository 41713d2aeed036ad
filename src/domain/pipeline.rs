use serde::{Deserialize, Serialize};

/// One fixed processing application in the payment pipeline.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub id: String,
    pub name: String,
    pub tier: String,
    pub sla_ms: u64,
}

impl Stage {
    pub fn sla_minutes(&self) -> u64 {
        self.sla_ms / 60_000
    }
}

/// The ordered, static set of pipeline stages. This is configuration, not
/// derived data: aggregations iterate it in declaration order.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    /// The five production stages in flow order.
    pub fn standard() -> Self {
        let stage = |id: &str, name: &str, tier: &str, sla_ms: u64| Stage {
            id: id.to_string(),
            name: name.to_string(),
            tier: tier.to_string(),
            sla_ms,
        };
        Self {
            stages: vec![
                stage("mailbox", "Mailbox", "Edge", 120_000),
                stage("phubip", "PHUB IP", "Integration", 180_000),
                stage("phubeft", "PHUB EFT", "Retail", 300_000),
                stage("phublvpe", "PHUB LVPE", "High-Value", 300_000),
                stage("phubcps", "PHUB CPS", "Core", 300_000),
            ],
        }
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn stage(&self, id: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.id == id)
    }
}
