use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use miette::{IntoDiagnostic, Result};
use std::io;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use paywatch::application::dashboard::DashboardEngine;
use paywatch::domain::criteria::{FilterCriteria, RelativeWindow};
use paywatch::domain::payment::{Direction, PaymentType};
use paywatch::domain::pipeline::Pipeline;
use paywatch::domain::ports::{HealthSourceBox, IncidentSourceBox, RecordSourceBox};
use paywatch::infrastructure::demo::{DemoIncidentSource, DemoRecordSource, StaticHealthSource};
use paywatch::infrastructure::file::JsonFileSource;
use paywatch::interfaces::csv::TableWriter;
use paywatch::interfaces::render;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Csv,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON file with payment records. Generates demo data when omitted.
    #[arg(long)]
    records: Option<PathBuf>,

    /// Seed for the demo generator.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of demo records to generate.
    #[arg(long, default_value_t = 60)]
    count: usize,

    /// Free-text search over client name and identifiers (`*` wildcard).
    #[arg(long)]
    query: Option<String>,

    /// Exact status label, e.g. Completed.
    #[arg(long)]
    status: Option<String>,

    /// Incoming, Outgoing or Internal.
    #[arg(long)]
    direction: Option<Direction>,

    /// Stage id (e.g. phubeft); matches records that touched the stage.
    #[arg(long)]
    stage: Option<String>,

    /// EFT or Wire.
    #[arg(long)]
    payment_type: Option<PaymentType>,

    /// Minimum value, inclusive. Non-numeric text disables the bound.
    #[arg(long)]
    min_value: Option<String>,

    /// Maximum value, inclusive. Non-numeric text disables the bound.
    #[arg(long)]
    max_value: Option<String>,

    /// Trailing window on creation time: 1h, 24h or 72h.
    #[arg(long)]
    last: Option<RelativeWindow>,

    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Re-run the refresh on a fixed interval (seconds) until Ctrl-C.
    #[arg(long)]
    watch: Option<u64>,
}

impl Cli {
    fn criteria(&self, now: DateTime<Utc>) -> FilterCriteria {
        FilterCriteria {
            query: self.query.clone().unwrap_or_default(),
            status: self.status.clone(),
            direction: self.direction,
            stage: self.stage.clone(),
            payment_type: self.payment_type,
            min_value: self.min_value.clone(),
            max_value: self.max_value.clone(),
            window: self.last.map(|w| w.resolve(now)),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let now = Utc::now();

    let records: RecordSourceBox = if let Some(path) = &cli.records {
        Box::new(JsonFileSource::new(path))
    } else {
        Box::new(DemoRecordSource::new(cli.seed, cli.count, now))
    };
    let health: HealthSourceBox = Box::new(StaticHealthSource::new());
    let incidents: IncidentSourceBox = Box::new(DemoIncidentSource::new(now));

    let mut engine = DashboardEngine::new(Pipeline::standard(), records, health, incidents);
    let criteria = cli.criteria(now);

    render_once(&mut engine, &criteria, cli.format).await?;

    if let Some(seconds) = cli.watch {
        let period = std::time::Duration::from_secs(seconds.max(1));
        let mut ticker = tokio::time::interval(period);
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => break,
                _ = ticker.tick() => render_once(&mut engine, &criteria, cli.format).await?,
            }
        }
    }

    Ok(())
}

async fn render_once(
    engine: &mut DashboardEngine,
    criteria: &FilterCriteria,
    format: OutputFormat,
) -> Result<()> {
    engine.refresh().await.into_diagnostic()?;
    let view = engine.view(criteria);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Text => {
            render::write_dashboard(&mut out, &view, Utc::now()).into_diagnostic()?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &view).into_diagnostic()?;
            writeln!(out).into_diagnostic()?;
        }
        OutputFormat::Csv => {
            let mut writer = TableWriter::new(out);
            writer.write_rows(&view.rows).into_diagnostic()?;
        }
    }
    Ok(())
}
