//! Chat trigger detection
//!
//! Scans batches of observed chat lines for trigger phrases. The chat reader
//! may hand us the same visible lines many times, so a bounded history of
//! recently accepted lines suppresses re-processing.

use std::collections::VecDeque;

/// Number of accepted lines remembered for de-duplication
pub const HISTORY_LIMIT: usize = 50;

/// Result of scanning one batch of lines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerScan {
    /// Lines seen for the first time, in observation order
    pub new_lines: Vec<String>,
    /// True if any new line contained a trigger (once per batch)
    pub fired: bool,
}

/// Detects configured trigger substrings in chat lines
#[derive(Debug, Clone)]
pub struct TriggerDetector {
    /// Trigger phrases, uppercased
    triggers: Vec<String>,
    history: VecDeque<String>,
}

impl TriggerDetector {
    pub fn new<S: AsRef<str>>(triggers: impl IntoIterator<Item = S>) -> Self {
        Self {
            triggers: normalize(triggers),
            history: VecDeque::with_capacity(HISTORY_LIMIT),
        }
    }

    pub fn triggers(&self) -> &[String] {
        &self.triggers
    }

    /// Scan a batch of observed lines.
    ///
    /// Empty lines and lines already in the history are skipped. Accepted
    /// lines enter the history; the oldest entry is evicted past
    /// [`HISTORY_LIMIT`].
    pub fn scan<S: AsRef<str>>(&mut self, lines: impl IntoIterator<Item = S>) -> TriggerScan {
        let mut scan = TriggerScan::default();

        for line in lines {
            let text = line.as_ref();
            if text.trim().is_empty() {
                continue;
            }
            if self.history.iter().any(|seen| seen == text) {
                continue;
            }

            self.history.push_back(text.to_string());
            if self.history.len() > HISTORY_LIMIT {
                self.history.pop_front();
            }
            scan.new_lines.push(text.to_string());
        }

        scan.fired = scan.new_lines.iter().any(|line| self.matches(line));
        scan
    }

    /// Check a single line against the trigger phrases
    pub fn matches(&self, line: &str) -> bool {
        let upper = line.to_uppercase();
        self.triggers.iter().any(|t| upper.contains(t.as_str()))
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

fn normalize<S: AsRef<str>>(triggers: impl IntoIterator<Item = S>) -> Vec<String> {
    triggers
        .into_iter()
        .map(|t| t.as_ref().trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .collect()
}
