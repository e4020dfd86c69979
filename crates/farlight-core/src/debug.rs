//! Collected debug effects.
//!
//! Assertions inside the core are data, not panics: every check lands in
//! the frame's debug payload and the simulation continues (clamping or
//! renormalizing as it goes). There is no ambient clock either — the
//! timestamp on a log entry is external simulation time.

use serde::{Deserialize, Serialize};

/// Code location captured by [`src_loc!`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: &'static str,
    pub line: u32,
}

/// Capture the current file and line.
#[macro_export]
macro_rules! src_loc {
    () => {
        $crate::debug::SourceLocation {
            file: file!(),
            line: line!(),
        }
    };
}

/// One diagnostic log entry in the frame output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugLog {
    pub message: String,
    pub file: String,
    pub line: u32,
    /// External simulation time when the entry was recorded.
    pub time_years: f64,
}

/// One collected assertion check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssertionResult {
    pub passed: bool,
    pub message: String,
    pub file: String,
    pub line: u32,
}

/// Per-tick collector for logs and assertion results.
#[derive(Debug, Default)]
pub struct DebugSink {
    pub logs: Vec<DebugLog>,
    pub assertions: Vec<AssertionResult>,
    time_years: f64,
}

impl DebugSink {
    pub fn new(time_years: f64) -> Self {
        Self {
            logs: Vec::new(),
            assertions: Vec::new(),
            time_years,
        }
    }

    pub fn set_time(&mut self, time_years: f64) {
        self.time_years = time_years;
    }

    pub fn log(&mut self, loc: SourceLocation, message: impl Into<String>) {
        self.logs.push(DebugLog {
            message: message.into(),
            file: loc.file.to_string(),
            line: loc.line,
            time_years: self.time_years,
        });
    }

    /// Record an assertion. Returns the condition so callers can branch on
    /// it without re-evaluating.
    pub fn check(&mut self, loc: SourceLocation, passed: bool, message: impl Into<String>) -> bool {
        self.assertions.push(AssertionResult {
            passed,
            message: message.into(),
            file: loc.file.to_string(),
            line: loc.line,
        });
        passed
    }

    /// Record a known failure (e.g. a clamp that had to fire).
    pub fn failure(&mut self, loc: SourceLocation, message: impl Into<String>) {
        self.check(loc, false, message);
    }

    pub fn failed_count(&self) -> usize {
        self.assertions.iter().filter(|a| !a.passed).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_collects_in_order() {
        let mut sink = DebugSink::new(12.5);
        sink.log(crate::src_loc!(), "first");
        sink.log(crate::src_loc!(), "second");
        assert_eq!(sink.logs.len(), 2);
        assert_eq!(sink.logs[0].message, "first");
        assert_eq!(sink.logs[0].time_years, 12.5);
        assert!(sink.logs[0].file.ends_with("debug.rs"));
    }

    #[test]
    fn check_returns_condition() {
        let mut sink = DebugSink::new(0.0);
        assert!(sink.check(crate::src_loc!(), true, "fine"));
        assert!(!sink.check(crate::src_loc!(), false, "broken"));
        assert_eq!(sink.assertions.len(), 2);
        assert_eq!(sink.failed_count(), 1);
    }

    #[test]
    fn failure_is_a_failed_assertion() {
        let mut sink = DebugSink::new(0.0);
        sink.failure(crate::src_loc!(), "gamma clamped");
        assert_eq!(sink.failed_count(), 1);
        assert!(!sink.assertions[0].passed);
    }
}
