//! `arrival run` — drive the schedule against a synthetic sleep workload.

use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tracing::info;

use arrival_core::ArrivalRateConfig;
use arrival_executor::{ArrivalRateExecutor, IterationOutcome, RunStats, Sample, SleepRunner};
use arrival_pool::{BoxFuture, WorkerId};

/// What the run looked like from the sample stream.
#[derive(Debug, Default, PartialEq, Serialize)]
pub struct Summary {
    pub stats: RunStats,
    pub samples: u64,
    /// Mean delay between scheduled and actual start, in ms.
    pub mean_start_lag_ms: f64,
    pub max_start_lag_ms: f64,
    /// Mean iteration duration, in ms.
    pub mean_duration_ms: f64,
}

#[derive(Debug, Default)]
struct SampleTally {
    samples: u64,
    started: u64,
    lag_total: Duration,
    lag_max: Duration,
    duration_total: Duration,
}

impl SampleTally {
    fn record(&mut self, sample: &Sample) {
        self.samples += 1;
        if let Sample::Iteration {
            scheduled_at,
            started_at,
            duration,
            outcome,
            ..
        } = sample
        {
            let lag = started_at.saturating_sub(*scheduled_at);
            self.started += 1;
            self.lag_total += lag;
            self.lag_max = self.lag_max.max(lag);
            self.duration_total += *duration;
            if let IterationOutcome::Failed(error) = outcome {
                tracing::debug!(iteration = sample.iteration(), %error, "iteration failed");
            }
        }
    }

    fn finish(self, stats: RunStats) -> Summary {
        let per_start = |total: Duration| {
            if self.started == 0 {
                0.0
            } else {
                total.as_secs_f64() * 1000.0 / self.started as f64
            }
        };
        Summary {
            stats,
            samples: self.samples,
            mean_start_lag_ms: per_start(self.lag_total),
            max_start_lag_ms: self.lag_max.as_secs_f64() * 1000.0,
            mean_duration_ms: per_start(self.duration_total),
        }
    }
}

async fn tally(mut samples: mpsc::Receiver<Sample>) -> SampleTally {
    let mut tally = SampleTally::default();
    while let Some(sample) = samples.recv().await {
        tally.record(&sample);
    }
    tally
}

fn unit_worker(_id: WorkerId) -> BoxFuture<'static, anyhow::Result<()>> {
    Box::pin(async { Ok(()) })
}

/// Run `config` to completion, or until Ctrl-C, and summarize it.
pub async fn execute(
    config: ArrivalRateConfig,
    iteration_duration: Duration,
    shutdown: watch::Receiver<bool>,
) -> anyhow::Result<Summary> {
    let executor =
        ArrivalRateExecutor::new(config, unit_worker, SleepRunner::new(iteration_duration))?;

    let (sample_tx, sample_rx) = mpsc::channel(1024);
    let collector = tokio::spawn(tally(sample_rx));

    let stats = executor.run(shutdown, sample_tx).await?;
    let tally = collector.await?;
    Ok(tally.finish(stats))
}

pub async fn run(
    config: ArrivalRateConfig,
    iteration_duration: Duration,
    format: &str,
) -> anyhow::Result<()> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let signal = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            let _ = shutdown_tx.send(true);
        }
    });

    let summary = execute(config, iteration_duration, shutdown_rx).await;
    signal.abort();
    let summary = summary?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        _ => {
            let stats = &summary.stats;
            println!(
                "dispatched {} | completed {} | failed {} | interrupted {} | dropped {}",
                stats.dispatched, stats.completed, stats.failed, stats.interrupted, stats.dropped
            );
            println!(
                "peak workers {} | shortfall episodes {} | lost samples {}",
                stats.peak_workers, stats.shortfall_episodes, stats.lost_samples
            );
            println!(
                "start lag mean {:.3}ms, max {:.3}ms | iteration mean {:.3}ms",
                summary.mean_start_lag_ms, summary.max_start_lag_ms, summary.mean_duration_ms
            );
            if stats.shut_down {
                println!("run was interrupted");
            }
        }
    }

    Ok(())
}
