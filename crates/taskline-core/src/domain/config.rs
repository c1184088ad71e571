//! Configuration for a pipeline run.
//!
//! Durations travel as `publish_duration_secs` (float seconds) and
//! `poll_interval_ms` (integer milliseconds); every field is optional on the
//! wire and falls back to the defaults below.

use std::path::Path;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::errors::ConfigError;

pub const DEFAULT_POOL_SIZE: usize = 4;
pub const DEFAULT_QUEUE_CAPACITY: usize = 1000;
pub const DEFAULT_PUBLISH_DURATION: Duration = Duration::from_secs(10);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of processors, one worker each.
    pub pool_size: usize,
    /// Maximum number of buffered tasks.
    pub queue_capacity: usize,
    /// How long the publisher keeps producing.
    #[serde(rename = "publish_duration_secs", with = "secs_f64")]
    pub publish_duration: Duration,
    /// Idle re-check delay for both workers (empty queue) and publisher (full queue).
    #[serde(rename = "poll_interval_ms", with = "millis")]
    pub poll_interval: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_POOL_SIZE,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            publish_duration: DEFAULT_PUBLISH_DURATION,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl PipelineConfig {
    pub fn from_json_str(path: &Path, raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(path, &raw)
    }

    /// Reject values that would make the run meaningless or spin.
    ///
    /// A zero publish duration is allowed: it is the "nothing to do" run.
    /// One whose deadline would overflow the clock is not.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pool_size == 0 {
            return Err(ConfigError::ZeroPoolSize);
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::ZeroQueueCapacity);
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::ZeroPollInterval);
        }
        if Instant::now().checked_add(self.publish_duration).is_none() {
            return Err(ConfigError::PublishDurationTooLong(self.publish_duration));
        }
        Ok(())
    }
}

/// Cost model for `SimulatedProcessor`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationProfile {
    /// One-time acquisition cost per processor.
    #[serde(rename = "setup_cost_ms", with = "millis")]
    pub setup_cost: Duration,
    /// Base time spent on each task.
    #[serde(rename = "work_ms", with = "millis")]
    pub work: Duration,
    /// Upper bound of the random extra time added to `work`.
    #[serde(rename = "jitter_ms", with = "millis")]
    pub jitter: Duration,
}

impl Default for SimulationProfile {
    fn default() -> Self {
        Self {
            setup_cost: Duration::from_millis(500),
            work: Duration::from_secs(1),
            jitter: Duration::ZERO,
        }
    }
}

mod secs_f64 {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(D::Error::custom)
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, ser::Error};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = u64::try_from(value.as_millis()).map_err(S::Error::custom)?;
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn defaults_match_reference_run() {
        let config = PipelineConfig::default();
        assert_eq!(config.pool_size, 4);
        assert_eq!(config.queue_capacity, 1000);
        assert_eq!(config.publish_duration, Duration::from_secs(10));
        assert_eq!(config.poll_interval, Duration::from_millis(10));
        assert!(config.validate().is_ok());
    }

    #[rstest]
    #[case::zero_pool(PipelineConfig { pool_size: 0, ..Default::default() })]
    #[case::zero_capacity(PipelineConfig { queue_capacity: 0, ..Default::default() })]
    #[case::zero_poll(PipelineConfig { poll_interval: Duration::ZERO, ..Default::default() })]
    fn validate_rejects_degenerate_values(#[case] config: PipelineConfig) {
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_publish_duration_is_valid() {
        let config = PipelineConfig {
            publish_duration: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unschedulable_publish_duration_is_rejected() {
        let config = PipelineConfig {
            publish_duration: Duration::MAX,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::PublishDurationTooLong(d)) if d == Duration::MAX
        ));
    }

    #[test]
    fn huge_publish_duration_parses_but_fails_validation() {
        let raw = r#"{ "publish_duration_secs": 1e19 }"#;
        let config = PipelineConfig::from_json_str(Path::new("huge.json"), raw).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::PublishDurationTooLong(_))
        ));
    }

    #[test]
    fn parses_partial_json_with_defaults() {
        let raw = r#"{ "pool_size": 2, "publish_duration_secs": 2.5, "poll_interval_ms": 5 }"#;
        let config = PipelineConfig::from_json_str(Path::new("inline.json"), raw).unwrap();

        assert_eq!(config.pool_size, 2);
        assert_eq!(config.queue_capacity, DEFAULT_QUEUE_CAPACITY);
        assert_eq!(config.publish_duration, Duration::from_millis(2500));
        assert_eq!(config.poll_interval, Duration::from_millis(5));
    }

    #[test]
    fn negative_duration_is_a_parse_error() {
        let raw = r#"{ "publish_duration_secs": -1.0 }"#;
        let err = PipelineConfig::from_json_str(Path::new("bad.json"), raw).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = PipelineConfig::from_json_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn profile_parses_from_millis() {
        let profile: SimulationProfile =
            serde_json::from_str(r#"{ "work_ms": 100, "jitter_ms": 20 }"#).unwrap();
        assert_eq!(profile.work, Duration::from_millis(100));
        assert_eq!(profile.jitter, Duration::from_millis(20));
        assert_eq!(profile.setup_cost, SimulationProfile::default().setup_cost);
    }

    #[test]
    fn millis_that_do_not_fit_u64_fail_to_serialize() {
        let profile = SimulationProfile {
            work: Duration::MAX,
            ..Default::default()
        };
        assert!(serde_json::to_string(&profile).is_err());

        let round = serde_json::to_string(&SimulationProfile::default()).unwrap();
        assert!(round.contains(r#""work_ms":1000"#));
    }
}
