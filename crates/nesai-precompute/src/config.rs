use std::time::Duration;

use nesai_evaluator::move_evaluator::SearchDepth;
use serde::{Deserialize, Serialize};

/// Settings of a [`PrecomputeManager`](crate::PrecomputeManager).
///
/// Deserializes from JSON with every field optional:
///
/// ```
/// use std::time::Duration;
///
/// use nesai_precompute::PrecomputeConfig;
///
/// let config = PrecomputeConfig::from_json_str(r#"{"taskDeadlineMs": 250}"#).unwrap();
/// assert_eq!(config.task_deadline(), Some(Duration::from_millis(250)));
/// assert_eq!(config.startup_timeout(), Some(Duration::from_secs(30)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PrecomputeConfig {
    /// Time allowed for all workers to answer a session. `None` waits
    /// forever.
    pub task_deadline_ms: Option<u64>,
    /// Time allowed for all workers to report ready. `None` waits forever.
    pub startup_timeout_ms: Option<u64>,
    /// Search depth used by the workers, whose next piece is known.
    pub worker_depth: SearchDepth,
}

impl Default for PrecomputeConfig {
    fn default() -> Self {
        Self {
            task_deadline_ms: Some(2_000),
            startup_timeout_ms: Some(30_000),
            worker_depth: SearchDepth::KNOWN_NEXT,
        }
    }
}

impl PrecomputeConfig {
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn task_deadline(&self) -> Option<Duration> {
        self.task_deadline_ms.map(Duration::from_millis)
    }

    #[must_use]
    pub fn startup_timeout(&self) -> Option<Duration> {
        self.startup_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(
            PrecomputeConfig::from_json_str("{}").unwrap(),
            PrecomputeConfig::default()
        );
    }

    #[test]
    fn test_disable_deadline() {
        let config = PrecomputeConfig::from_json_str(
            r#"{"taskDeadlineMs": null, "workerDepth": {"searchDepth": 2, "hypotheticalSearchDepth": 0}}"#,
        )
        .unwrap();
        assert_eq!(config.task_deadline(), None);
        assert_eq!(config.worker_depth.search_depth, 2);
    }
}
