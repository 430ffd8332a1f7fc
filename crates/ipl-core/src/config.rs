//! Lint configuration and the re-validation debounce policy.
//!
//! Validation rescans the whole document, so hosts should not run it on every keystroke.
//! [`LintDebounce`] tracks the quiet period; the host drives it with its own clock and calls
//! [`validate_with`](crate::validate::validate_with) when it reports the pass as due.

use crate::error::IplError;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Default quiet period before re-validating, in milliseconds.
pub const DEFAULT_LINT_DELAY_MS: u64 = 500;

/// Host-facing lint settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LintConfig {
    /// Input inactivity required before re-validating.
    pub delay_ms: u64,
    /// Report tab characters as info diagnostics.
    pub report_tabs: bool,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_LINT_DELAY_MS,
            report_tabs: true,
        }
    }
}

impl LintConfig {
    /// Parse a config from JSON text. Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, IplError> {
        Ok(serde_json::from_str(text)?)
    }

    /// The debounce delay as a [`Duration`].
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Trailing-edge debounce for validation passes.
#[derive(Debug, Clone)]
pub struct LintDebounce {
    delay: Duration,
    pending_since: Option<Instant>,
}

impl LintDebounce {
    /// Create a debounce with the given quiet period.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending_since: None,
        }
    }

    /// Create a debounce from [`LintConfig::delay_ms`].
    pub fn from_config(config: &LintConfig) -> Self {
        Self::new(config.delay())
    }

    /// Record an edit at `now`. Restarts the quiet period.
    pub fn note_edit(&mut self, now: Instant) {
        self.pending_since = Some(now);
    }

    /// Returns `true` if an edit is pending.
    pub fn is_pending(&self) -> bool {
        self.pending_since.is_some()
    }

    /// When the pending pass becomes due, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending_since.map(|since| since + self.delay)
    }

    /// Returns `true` if a pass is pending and the quiet period has elapsed at `now`.
    pub fn is_due(&self, now: Instant) -> bool {
        self.pending_since
            .is_some_and(|since| now.saturating_duration_since(since) >= self.delay)
    }

    /// Like [`is_due`](Self::is_due), but clears the pending edit when it returns `true`.
    pub fn take_due(&mut self, now: Instant) -> bool {
        let due = self.is_due(now);
        if due {
            self.pending_since = None;
        }
        due
    }

    /// Clear any pending edit regardless of time (e.g. validating on explicit save).
    ///
    /// Returns `true` if an edit was pending.
    pub fn flush(&mut self) -> bool {
        self.pending_since.take().is_some()
    }
}

impl Default for LintDebounce {
    fn default() -> Self {
        Self::from_config(&LintConfig::default())
    }
}
