//! Run timelines as captured from the execution provider

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One event of a workflow execution.
///
/// Driver events (DOE, optimizer, converger) usually carry only a start
/// timestamp; discipline events carry either the elapsed time or an end
/// timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    /// Component name (driver name or discipline id)
    pub component: String,
    /// When the component started (drivers: when the iteration finished)
    pub start_timestamp: DateTime<Utc>,
    /// When the component finished, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_timestamp: Option<DateTime<Utc>>,
    /// Elapsed seconds, if reported directly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_spent: Option<f64>,
}

impl TimelineEvent {
    /// Event with only a start timestamp (typical for drivers).
    #[must_use]
    pub fn driver(component: impl Into<String>, start_timestamp: DateTime<Utc>) -> Self {
        Self {
            component: component.into(),
            start_timestamp,
            end_timestamp: None,
            time_spent: None,
        }
    }

    /// Event with a start timestamp and an elapsed time in seconds.
    #[must_use]
    pub fn call(
        component: impl Into<String>,
        start_timestamp: DateTime<Utc>,
        time_spent: f64,
    ) -> Self {
        Self {
            component: component.into(),
            start_timestamp,
            end_timestamp: None,
            time_spent: Some(time_spent),
        }
    }

    /// Set the end timestamp.
    #[must_use]
    pub fn with_end(mut self, end_timestamp: DateTime<Utc>) -> Self {
        self.end_timestamp = Some(end_timestamp);
        self
    }

    /// Elapsed seconds of this event.
    ///
    /// Uses `time_spent` when present, otherwise `end - start`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if neither is available, or the
    /// resulting value is negative or not finite.
    pub fn elapsed_seconds(&self) -> Result<f64> {
        let elapsed = match (self.time_spent, self.end_timestamp) {
            (Some(seconds), _) => seconds,
            (None, Some(end)) => seconds_between(self.start_timestamp, end),
            (None, None) => {
                return Err(Error::InvalidInput(format!(
                    "event of {} at {} has neither elapsed time nor end timestamp",
                    self.component, self.start_timestamp
                )))
            }
        };

        if !elapsed.is_finite() || elapsed < 0.0 {
            return Err(Error::InvalidInput(format!(
                "event of {} has invalid elapsed time {elapsed}",
                self.component
            )));
        }
        Ok(elapsed)
    }
}

/// Seconds from `start` to `end` with sub-second precision.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn seconds_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let delta = end - start;
    delta
        .num_microseconds()
        .map_or_else(|| delta.num_milliseconds() as f64 / 1e3, |us| us as f64 / 1e6)
}

/// Ordered events of one workflow execution. Immutable once captured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunTimeline {
    run_id: String,
    events: Vec<TimelineEvent>,
}

impl RunTimeline {
    /// Create a timeline for `run_id`.
    #[must_use]
    pub fn new(run_id: impl Into<String>, events: Vec<TimelineEvent>) -> Self {
        Self {
            run_id: run_id.into(),
            events,
        }
    }

    /// Parse a timeline from JSON.
    ///
    /// # Errors
    ///
    /// Returns error if the document is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Get the run ID.
    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Get the events in capture order.
    #[must_use]
    pub fn events(&self) -> &[TimelineEvent] {
        &self.events
    }

    /// Number of events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the timeline has no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Wall-clock span: latest start minus earliest start, in seconds.
    ///
    /// Returns `None` for an empty timeline.
    #[must_use]
    pub fn span_seconds(&self) -> Option<f64> {
        let first = self.events.first()?.start_timestamp;
        let (min, max) = self.events.iter().fold((first, first), |(lo, hi), e| {
            (lo.min(e.start_timestamp), hi.max(e.start_timestamp))
        });
        Some(seconds_between(min, max))
    }
}
