//! Engine configuration and per-call options.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// When binary predicates are evaluated through prepared geometries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreparedMode {
    /// Prepare an operand whose elements are each reused at least
    /// [`EngineConfig::prepared_reuse_threshold`] times in the output.
    #[default]
    Auto,
    /// Prepare the left operand whenever the predicate supports it.
    Always,
    /// Never prepare.
    Never,
}

/// Configuration of a [`DispatchEngine`][crate::algorithm::DispatchEngine].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum number of output elements before a batch is fanned out over the thread
    /// pool.
    pub parallel_threshold: usize,

    /// Maximum number of worker threads. `None` uses rayon's default.
    pub max_threads: Option<usize>,

    /// Minimum reuse of an operand element before it is prepared in
    /// [`PreparedMode::Auto`].
    pub prepared_reuse_threshold: usize,

    /// Maximum number of prepared geometries kept in the cache.
    pub prepared_cache_capacity: usize,

    /// Default for [`CallOptions::strict`].
    pub strict: bool,

    /// Default prepared mode for calls that do not override it.
    pub prepared_mode: PreparedMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallel_threshold: 10_000,
            max_threads: None,
            prepared_reuse_threshold: 4,
            prepared_cache_capacity: 256,
            strict: false,
            prepared_mode: PreparedMode::Auto,
        }
    }
}

impl EngineConfig {
    pub fn with_parallel_threshold(self, parallel_threshold: usize) -> Self {
        Self {
            parallel_threshold,
            ..self
        }
    }

    pub fn with_max_threads(self, max_threads: usize) -> Self {
        Self {
            max_threads: Some(max_threads),
            ..self
        }
    }

    pub fn with_prepared_reuse_threshold(self, prepared_reuse_threshold: usize) -> Self {
        Self {
            prepared_reuse_threshold,
            ..self
        }
    }

    pub fn with_prepared_cache_capacity(self, prepared_cache_capacity: usize) -> Self {
        Self {
            prepared_cache_capacity,
            ..self
        }
    }

    pub fn with_strict(self, strict: bool) -> Self {
        Self { strict, ..self }
    }

    pub fn with_prepared_mode(self, prepared_mode: PreparedMode) -> Self {
        Self {
            prepared_mode,
            ..self
        }
    }

    /// Load a configuration from JSON. Missing fields take their default value.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// The options a call gets when it does not override anything.
    pub fn call_options(&self) -> CallOptions {
        CallOptions {
            strict: self.strict,
            prepared: self.prepared_mode,
            parallel: None,
        }
    }
}

/// Per-call overrides of the engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CallOptions {
    /// Fail the whole call on the first element error instead of nulling the element.
    pub strict: bool,

    pub prepared: PreparedMode,

    /// Force (`Some(true)`) or forbid (`Some(false)`) parallel execution. `None` decides by
    /// [`EngineConfig::parallel_threshold`].
    pub parallel: Option<bool>,
}

impl CallOptions {
    /// Options for a call that fails on the first element error.
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Default::default()
        }
    }

    pub fn with_strict(self, strict: bool) -> Self {
        Self { strict, ..self }
    }

    pub fn with_prepared(self, prepared: PreparedMode) -> Self {
        Self { prepared, ..self }
    }

    pub fn with_parallel(self, parallel: bool) -> Self {
        Self {
            parallel: Some(parallel),
            ..self
        }
    }
}
