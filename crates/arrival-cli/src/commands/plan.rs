//! `arrival plan` — print the schedule without running anything.

use std::time::Duration;

use serde::Serialize;

use arrival_core::ArrivalRateConfig;
use arrival_core::config::segment_share;
use arrival_schedule::Schedule;

#[derive(Debug, Serialize)]
pub struct Plan {
    pub description: String,
    pub segment: String,
    pub expected_iterations: f64,
    pub total: usize,
    pub entries: Vec<PlanEntry>,
}

#[derive(Debug, Serialize)]
pub struct PlanEntry {
    pub iteration: u64,
    #[serde(with = "as_millis")]
    pub offset: Duration,
}

/// Offsets serialized as fractional milliseconds.
mod as_millis {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64() * 1000.0)
    }
}

/// Build the plan for `config`, keeping at most `limit` entries.
pub fn build(config: &ArrivalRateConfig, limit: Option<usize>) -> anyhow::Result<Plan> {
    let tuple = config.execution_tuple()?;
    let curve = config.rate_curve();

    let mut total = 0;
    let mut entries = Vec::new();
    for entry in Schedule::new(&curve, &tuple).entries() {
        total += 1;
        if limit.is_none_or(|limit| entries.len() < limit) {
            entries.push(PlanEntry {
                iteration: entry.iteration,
                offset: entry.offset,
            });
        }
    }

    Ok(Plan {
        description: config.description(&tuple),
        segment: tuple.to_string(),
        expected_iterations: curve.expected_iterations() * segment_share(tuple.segment()),
        total,
        entries,
    })
}

pub fn plan(config: &ArrivalRateConfig, limit: Option<usize>, format: &str) -> anyhow::Result<()> {
    let plan = build(config, limit)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        _ => {
            println!("{}", plan.description);
            println!("segment: {}", plan.segment);
            println!(
                "iterations: {} (analytic {:.1})",
                plan.total, plan.expected_iterations
            );
            for entry in &plan.entries {
                println!(
                    "  #{:<8} {:>12.3}ms",
                    entry.iteration,
                    entry.offset.as_secs_f64() * 1000.0
                );
            }
            if plan.entries.len() < plan.total {
                println!("  … {} more", plan.total - plan.entries.len());
            }
        }
    }

    Ok(())
}
