//! Configuration
//!
//! Scheduler tuning and root options.
//!
//! [`SchedulerConfig`] is plain data and can be loaded from JSON; missing
//! fields take their defaults. [`RootOptions`] adds the callbacks and opaque
//! settings accepted when a root is acquired.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How a unit finds its counterpart from the previous pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChildMatching {
    /// The i-th unit of a pass pairs with the i-th unit of the previous pass.
    ///
    /// Inserting or reordering siblings shifts every later pairing; stale
    /// nodes left behind by a type change are not removed.
    #[default]
    Positional,

    /// Children pair with the children of their parent's counterpart, by key
    /// when one is present and by order among unkeyed siblings otherwise.
    /// Unmatched old siblings are detached and type changes replace in place.
    Keyed,
}

/// Scheduler tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Yield once the deadline reports less than this, in microseconds.
    ///
    /// A burst always processes at least one unit, whatever the deadline says.
    pub min_remaining_us: u64,

    /// Burst length used by hosts without a native idle period, in microseconds.
    pub idle_slice_us: u64,

    /// Child matching strategy.
    pub matching: ChildMatching,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            min_remaining_us: 1_000,
            idle_slice_us: 5_000,
            matching: ChildMatching::Positional,
        }
    }
}

impl SchedulerConfig {
    /// Parse a configuration from JSON.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if the JSON is malformed or has unknown values.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Error::from)
    }

    /// Minimum time remaining required to process another unit.
    pub fn min_remaining(&self) -> Duration {
        Duration::from_micros(self.min_remaining_us)
    }

    /// Burst length for hosts that measure their own slices.
    pub fn idle_slice(&self) -> Duration {
        Duration::from_micros(self.idle_slice_us)
    }

    /// Use `matching` for child matching.
    pub fn with_matching(mut self, matching: ChildMatching) -> Self {
        self.matching = matching;
        self
    }
}

/// Callback invoked when a pass fails.
pub type ErrorHook = Arc<dyn Fn(&Error) + Send + Sync>;

/// Options accepted when a root is acquired.
#[derive(Clone, Default)]
pub struct RootOptions {
    /// Invoked with the error whenever a pass is abandoned.
    pub on_recoverable_error: Option<ErrorHook>,

    /// Reserved; stored and reported, with no effect on rendering.
    pub identifier_prefix: Option<String>,

    /// Scheduler tuning.
    pub scheduler: SchedulerConfig,
}

impl RootOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the error hook.
    pub fn on_recoverable_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Error) + Send + Sync + 'static,
    {
        self.on_recoverable_error = Some(Arc::new(hook));
        self
    }

    /// Set the identifier prefix.
    pub fn identifier_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.identifier_prefix = Some(prefix.into());
        self
    }

    /// Set the scheduler configuration.
    pub fn scheduler(mut self, config: SchedulerConfig) -> Self {
        self.scheduler = config;
        self
    }
}

impl fmt::Debug for RootOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RootOptions")
            .field("on_recoverable_error", &self.on_recoverable_error.is_some())
            .field("identifier_prefix", &self.identifier_prefix)
            .field("scheduler", &self.scheduler)
            .finish()
    }
}
