//! Timer sequences
//!
//! A sequence is the ordered list of phases played when a trigger fires.
//! The built-in catalog maps each [`CombatStyle`] to one sequence.
//!
//! Sequences are validated on construction: at least one phase, every phase
//! with a non-zero duration and at least one icon. The timer engine relies
//! on this and never re-checks.

mod catalog;
mod error;

use std::time::Duration;

pub use catalog::{PhaseDef, SequenceCatalog, BUILTIN_SEQUENCES};
pub use error::SequenceError;

/// One timed segment of a countdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phase {
    /// Icons shown while this phase is current (left to right)
    pub icon_ids: Vec<String>,
    pub duration: Duration,
}

impl Phase {
    pub fn new<S: Into<String>>(icon_ids: impl IntoIterator<Item = S>, duration: Duration) -> Self {
        Self {
            icon_ids: icon_ids.into_iter().map(Into::into).collect(),
            duration,
        }
    }

    pub fn from_millis<S: Into<String>>(icon_ids: impl IntoIterator<Item = S>, ms: u64) -> Self {
        Self::new(icon_ids, Duration::from_millis(ms))
    }
}

/// An immutable, non-empty list of phases
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    name: String,
    phases: Vec<Phase>,
}

impl Sequence {
    pub fn new(name: impl Into<String>, phases: Vec<Phase>) -> Result<Self, SequenceError> {
        let name = name.into();

        if phases.is_empty() {
            return Err(SequenceError::Empty { name });
        }

        for (index, phase) in phases.iter().enumerate() {
            if phase.duration.is_zero() {
                return Err(SequenceError::ZeroDuration { name, index });
            }
            if phase.icon_ids.is_empty() {
                return Err(SequenceError::NoIcons { name, index });
            }
        }

        Ok(Self { name, phases })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    /// Always false for a constructed sequence
    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    pub fn first(&self) -> &Phase {
        &self.phases[0]
    }

    pub fn last(&self) -> &Phase {
        &self.phases[self.phases.len() - 1]
    }

    /// Sum of all phase durations
    pub fn total_duration(&self) -> Duration {
        self.phases.iter().map(|p| p.duration).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_sequence() {
        let err = Sequence::new("empty", Vec::new()).unwrap_err();
        assert!(matches!(err, SequenceError::Empty { .. }));
    }

    #[test]
    fn test_rejects_zero_duration() {
        let phases = vec![
            Phase::from_millis(["a"], 1000),
            Phase::from_millis(["b"], 0),
        ];
        let err = Sequence::new("broken", phases).unwrap_err();
        assert!(matches!(err, SequenceError::ZeroDuration { index: 1, .. }));
    }

    #[test]
    fn test_rejects_phase_without_icons() {
        let phases = vec![Phase::new(Vec::<String>::new(), Duration::from_millis(500))];
        let err = Sequence::new("blank", phases).unwrap_err();
        assert!(matches!(err, SequenceError::NoIcons { index: 0, .. }));
    }

    #[test]
    fn test_total_duration() {
        let seq = Sequence::new(
            "two",
            vec![Phase::from_millis(["a"], 1800), Phase::from_millis(["b"], 1200)],
        )
        .unwrap();
        assert_eq!(seq.total_duration(), Duration::from_millis(3000));
        assert_eq!(seq.first().icon_ids, vec!["a"]);
        assert_eq!(seq.last().icon_ids, vec!["b"]);
    }
}
