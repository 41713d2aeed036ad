use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::io::Write;

use crate::application::dashboard::DashboardView;

const TABLE_PAGE: usize = 10;
const HEALTH_WARN_AT: f64 = 90.0;

/// Renders the dashboard view as text: KPI tiles, the pipeline strip,
/// volume and status listings, incidents, and the first page of results.
pub fn write_dashboard<W: Write>(
    w: &mut W,
    view: &DashboardView,
    now: DateTime<Utc>,
) -> std::io::Result<()> {
    let kpi = &view.kpi;
    let currency = view
        .rows
        .first()
        .map(|p| p.currency.as_str())
        .unwrap_or("CAD");

    writeln!(w, "Ecosystem health: {:.1}%", kpi.health_overall)?;
    writeln!(
        w,
        "Payments in view: {} (total value {})",
        kpi.total,
        format_money(kpi.total_value, currency)
    )?;
    writeln!(
        w,
        "Processing now: {} ({} completed, {} failed)",
        kpi.processing, kpi.completed, kpi.failed
    )?;
    writeln!(
        w,
        "ACK/NACK: {}/{}  pacs.002 received: {}",
        kpi.ack, kpi.nack, kpi.pacs_ok
    )?;

    writeln!(w)?;
    writeln!(w, "Pipeline")?;
    for sh in &view.stage_health {
        let marker = if sh.health > HEALTH_WARN_AT { "OK" } else { "WARN" };
        writeln!(
            w,
            "  {:<10} {:<12} {:>3.0}%  SLA {}m  [{}]",
            sh.stage.name,
            sh.stage.tier,
            sh.health,
            sh.stage.sla_minutes(),
            marker
        )?;
    }

    writeln!(w)?;
    writeln!(w, "Stage volume")?;
    for v in &kpi.stage_volume {
        writeln!(w, "  {:<10} {}", v.stage, v.count)?;
    }

    writeln!(w)?;
    writeln!(w, "Status mix")?;
    for s in &kpi.status_mix {
        writeln!(w, "  {:<30} {}", s.status, s.count)?;
    }

    writeln!(w)?;
    writeln!(w, "Incidents")?;
    if view.incidents.is_empty() {
        writeln!(w, "  none")?;
    }
    for x in &view.incidents {
        writeln!(
            w,
            "  [{}] {} ({}) {} opened {}",
            x.severity,
            x.title,
            x.stage_id,
            x.id,
            format_age(now - x.opened)
        )?;
    }

    writeln!(w)?;
    writeln!(w, "Results ({})", view.rows.len())?;
    for p in view.rows.iter().take(TABLE_PAGE) {
        writeln!(
            w,
            "  {}  {:<12} {:<8} {:>16}  {:<10} {}",
            p.created.format("%Y-%m-%d %H:%M"),
            p.client,
            p.direction,
            format_money(p.value, &p.currency),
            p.status,
            p.uetr
        )?;
    }
    if view.rows.len() > TABLE_PAGE {
        writeln!(w, "  ... {} more", view.rows.len() - TABLE_PAGE)?;
    }
    Ok(())
}

/// Two-decimal money with thousands grouping, e.g. `1,234,567.89 CAD`.
pub fn format_money(value: Decimal, currency: &str) -> String {
    let text = format!("{:.2}", value.round_dp(2));
    let (int_part, frac) = match text.split_once('.') {
        Some((i, f)) => (i, f),
        None => (text.as_str(), "00"),
    };
    let negative = int_part.starts_with('-');
    let digits = int_part.trim_start_matches('-');
    format!(
        "{}{}.{} {}",
        if negative { "-" } else { "" },
        group_thousands(digits),
        frac,
        currency
    )
}

fn group_thousands(digits: &str) -> String {
    let chars: Vec<char> = digits.chars().collect();
    let mut out = String::with_capacity(chars.len() + chars.len() / 3);
    for (i, c) in chars.iter().enumerate() {
        if i != 0 && (chars.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(*c);
    }
    out
}

/// Coarse age for incident rows: `just now`, `35m ago`, `2h 5m ago`.
pub fn format_age(age: Duration) -> String {
    let minutes = age.num_minutes();
    if minutes < 1 {
        return "just now".to_string();
    }
    if minutes < 60 {
        return format!("{minutes}m ago");
    }
    format!("{}h {}m ago", minutes / 60, minutes % 60)
}
