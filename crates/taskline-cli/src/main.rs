use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use taskline_core::{Pipeline, PipelineConfig, ProcessorPool, SimulatedProcessor, SimulationProfile};
use tracing_subscriber::EnvFilter;

/// Run the bounded publisher / processor-pool pipeline and report throughput.
#[derive(Debug, Parser)]
#[command(name = "taskline", version)]
struct Cli {
    /// JSON config file; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of processors (one worker each).
    #[arg(long)]
    pool_size: Option<usize>,

    /// Maximum number of buffered tasks.
    #[arg(long)]
    queue_capacity: Option<usize>,

    /// Seconds the publisher keeps producing.
    #[arg(long)]
    publish_secs: Option<f64>,

    /// Idle re-check delay in milliseconds.
    #[arg(long)]
    poll_ms: Option<u64>,

    /// Simulated work per task in milliseconds.
    #[arg(long, default_value_t = 1000)]
    work_ms: u64,

    /// Upper bound of random extra work per task in milliseconds.
    #[arg(long, default_value_t = 0)]
    jitter_ms: u64,

    /// Simulated one-time acquisition cost per processor in milliseconds.
    #[arg(long, default_value_t = 500)]
    setup_ms: u64,

    /// Print the report as JSON.
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn pipeline_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_json_file(path)?,
            None => PipelineConfig::default(),
        };
        if let Some(pool_size) = self.pool_size {
            config.pool_size = pool_size;
        }
        if let Some(queue_capacity) = self.queue_capacity {
            config.queue_capacity = queue_capacity;
        }
        if let Some(secs) = self.publish_secs {
            config.publish_duration =
                Duration::try_from_secs_f64(secs).context("--publish-secs must be a non-negative number")?;
        }
        if let Some(ms) = self.poll_ms {
            config.poll_interval = Duration::from_millis(ms);
        }
        Ok(config)
    }

    fn profile(&self) -> SimulationProfile {
        SimulationProfile {
            setup_cost: Duration::from_millis(self.setup_ms),
            work: Duration::from_millis(self.work_ms),
            jitter: Duration::from_millis(self.jitter_ms),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = cli.pipeline_config()?;
    let pipeline = Pipeline::new(config)?;
    let profile = cli.profile();

    tracing::info!(config = ?pipeline.config(), ?profile, "starting pipeline");

    let pool = ProcessorPool::build(pipeline.config().pool_size, |id| {
        SimulatedProcessor::acquire(id, profile.clone())
    })
    .await;

    let outcome = pipeline.run(pool).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome.report)?);
    } else {
        print!("{}", outcome.report);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from([
            "taskline",
            "--pool-size",
            "2",
            "--publish-secs",
            "0.5",
            "--poll-ms",
            "5",
        ]);
        let config = cli.pipeline_config().unwrap();

        assert_eq!(config.pool_size, 2);
        assert_eq!(config.queue_capacity, 1000);
        assert_eq!(config.publish_duration, Duration::from_millis(500));
        assert_eq!(config.poll_interval, Duration::from_millis(5));
    }

    #[test]
    fn negative_publish_secs_is_rejected() {
        let cli = Cli::parse_from(["taskline", "--publish-secs=-1"]);
        assert!(cli.pipeline_config().is_err());
    }

    #[test]
    fn profile_uses_millisecond_flags() {
        let cli = Cli::parse_from(["taskline", "--work-ms", "100", "--jitter-ms", "10", "--setup-ms", "0"]);
        let profile = cli.profile();

        assert_eq!(profile.work, Duration::from_millis(100));
        assert_eq!(profile.jitter, Duration::from_millis(10));
        assert!(profile.setup_cost.is_zero());
    }
}
